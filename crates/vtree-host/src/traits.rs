use std::fmt;
use std::hash::Hash;

use vtree_types::{Tag, Value};

use crate::error::HostResult;

/// A live, mutable host tree the reconciler writes into.
///
/// All implementations must satisfy these invariants:
/// - Node handles are stable: a handle keeps referring to the same node for
///   as long as the node exists, whether or not it is attached.
/// - Child lists are ordered and live. `child_at` and `child_count` always
///   reflect mutations made so far.
/// - Appending or inserting a node that already has a parent moves it.
/// - `remove_node` only detaches. It is a no-op on a parentless node.
/// - Property dispatch policy (attribute vs. property vs. event binding)
///   lives entirely behind `reflect_property`.
pub trait HostTree {
    /// Opaque handle to a host node.
    type Node: Clone + Eq + Hash + fmt::Debug;

    /// Allocate a new, empty, detached node for a structured tag.
    fn create_node(&mut self, tag: &Tag) -> HostResult<Self::Node>;

    /// Allocate a new, detached text node.
    fn create_text(&mut self, text: &str) -> HostResult<Self::Node>;

    /// Replace the content of a text node.
    fn set_text(&mut self, node: &Self::Node, text: &str) -> HostResult<()>;

    /// Content of a text node, or `None` if `node` is not a text node.
    fn text_content(&self, node: &Self::Node) -> Option<String>;

    /// Detach `node` from its parent, if it has one.
    fn remove_node(&mut self, node: &Self::Node) -> HostResult<()>;

    /// Apply a single named property change. `new == None` clears it.
    fn reflect_property(
        &mut self,
        node: &Self::Node,
        name: &str,
        old: Option<&Value>,
        new: Option<&Value>,
    ) -> HostResult<()>;

    /// Current live value of a property as the host sees it.
    ///
    /// Used for properties that user interaction can change out of band
    /// (`value`, `checked`). Returns `None` when unset or unknown.
    fn live_property(&self, node: &Self::Node, name: &str) -> Option<Value>;

    /// Append `child` as the last child of `parent`.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> HostResult<()>;

    /// Insert `child` into `parent` immediately before `reference`.
    fn insert_before(
        &mut self,
        parent: &Self::Node,
        child: &Self::Node,
        reference: &Self::Node,
    ) -> HostResult<()>;

    /// Number of children currently under `parent`.
    fn child_count(&self, parent: &Self::Node) -> usize;

    /// Child of `parent` at `index`, if any.
    fn child_at(&self, parent: &Self::Node, index: usize) -> Option<Self::Node>;

    /// The parent of `node`, if attached.
    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Snapshot of the children of `parent`, in order.
    ///
    /// Default implementation walks `child_at`. Backends may override.
    fn child_nodes(&self, parent: &Self::Node) -> Vec<Self::Node> {
        (0..self.child_count(parent))
            .filter_map(|i| self.child_at(parent, i))
            .collect()
    }

    /// The sibling immediately after `node` under its parent.
    ///
    /// Default implementation scans the parent's child list. Backends with
    /// sibling links should override.
    fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node> {
        let parent = self.parent(node)?;
        let count = self.child_count(&parent);
        let index = (0..count).find(|&i| self.child_at(&parent, i).as_ref() == Some(node))?;
        self.child_at(&parent, index + 1)
    }
}
