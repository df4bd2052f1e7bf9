//! Child reconciliation: match new children to old ones, reuse and reorder
//! their host nodes, and tear down whatever is left over.
//!
//! Matching is two-tier. Keyed old children go into a key index and can only
//! be claimed by a new child whose key has the same string form. Unkeyed old
//! children go into a pool scanned greedily left to right for the first
//! compatible node type.
//! Both structures are single-use: a claimed entry is gone for the rest of
//! the pass.

use std::borrow::Cow;
use std::collections::BTreeMap;

use tracing::debug;
use vtree_host::HostTree;
use vtree_types::VNode;

use crate::classify::{is_primitive, is_same_node_type, renderable};
use crate::differ::{ChildPass, Reconciler};
use crate::error::DiffResult;
use crate::remove::remove_subtree;

/// An old child paired with the host node that rendered it.
struct Candidate<'v, N> {
    vnode: &'v VNode,
    host: Option<N>,
}

/// Unkeyed old children in original order.
///
/// Slots are cleared as they are claimed. `min` is the first slot that may
/// still be occupied and `high` is one past the last, so in-order lists
/// scan in O(n) overall.
struct UnkeyedPool<'v, N> {
    slots: Vec<Option<Candidate<'v, N>>>,
    min: usize,
    high: usize,
}

impl<'v, N> UnkeyedPool<'v, N> {
    fn new() -> Self {
        Self {
            slots: Vec::new(),
            min: 0,
            high: 0,
        }
    }

    fn push(&mut self, candidate: Candidate<'v, N>) {
        self.slots.push(Some(candidate));
        self.high = self.slots.len();
    }

    fn len(&self) -> usize {
        self.slots.len()
    }

    /// Claim the first remaining candidate of the same node type as `new`.
    fn take_match(&mut self, new: &VNode) -> Option<Candidate<'v, N>> {
        let index = (self.min..self.high).find(|&j| {
            self.slots[j]
                .as_ref()
                .is_some_and(|c| is_same_node_type(c.vnode, new))
        })?;
        let taken = self.slots[index].take();
        while self.min < self.high && self.slots[self.min].is_none() {
            self.min += 1;
        }
        while self.high > self.min && self.slots[self.high - 1].is_none() {
            self.high -= 1;
        }
        taken
    }

    /// Unclaimed candidates, from the high-water mark down to `min`.
    fn drain_unclaimed(&mut self) -> impl Iterator<Item = Candidate<'v, N>> + '_ {
        let (min, high) = (self.min, self.high);
        self.min = high;
        self.slots[min..high].iter_mut().rev().filter_map(Option::take)
    }
}

impl Reconciler {
    /// Reconcile the children of `parent`.
    ///
    /// - `old_children`: the children of the previous virtual node.
    /// - `host_children`: the host children of `parent` as they were before
    ///   this call, paired index-for-index with the renderable old children.
    ///
    /// Unrenderable values (`Null`, booleans) are dropped from both lists
    /// first. On return `parent` holds exactly one host node per renderable
    /// new child, in order.
    pub fn reconcile_children<H: HostTree>(
        &self,
        host: &mut H,
        new_children: &[VNode],
        old_children: &[VNode],
        host_children: &[H::Node],
        parent: &H::Node,
    ) -> DiffResult<()> {
        let mut pending = Vec::new();
        self.reconcile_at(
            host,
            &renderable(new_children),
            &renderable(old_children),
            host_children,
            parent,
            &mut pending,
        )?;
        self.drain(host, pending.into_iter().rev().collect())
    }

    /// One level of child reconciliation. Reused structured children are
    /// queued on `pending` in order; their own children are not touched.
    pub(crate) fn reconcile_at<'v, H: HostTree>(
        &self,
        host: &mut H,
        new_children: &[&'v VNode],
        old_children: &[&'v VNode],
        host_children: &[H::Node],
        parent: &H::Node,
        pending: &mut Vec<ChildPass<'v, H::Node>>,
    ) -> DiffResult<()> {
        let mut keyed: BTreeMap<Cow<'v, str>, Candidate<'v, H::Node>> = BTreeMap::new();
        let mut pool = UnkeyedPool::new();

        for (i, &old) in old_children.iter().enumerate() {
            let candidate = Candidate {
                vnode: old,
                host: host_children.get(i).cloned(),
            };
            if let Some(key) = old.key() {
                let identity = key.identity();
                if keyed.contains_key(&*identity) {
                    debug!(%key, "duplicate key among old children; later entry left to the sweep");
                    continue;
                }
                keyed.insert(identity, candidate);
            } else if !is_blank_text(host, &candidate) {
                pool.push(candidate);
            }
        }
        let (keyed_len, pooled_len) = (keyed.len(), pool.len());

        let mut reused = 0usize;
        for (i, &new) in new_children.iter().enumerate() {
            let matched = match new.key() {
                Some(key) => keyed.remove(&*key.identity()),
                None => pool.take_match(new),
            };
            let (old, existing) = match &matched {
                Some(c) => (Some(c.vnode), c.host.as_ref()),
                None => (None, None),
            };
            if existing.is_some() {
                reused += 1;
            }

            let node = self.idiff(host, new, parent, old, existing, pending)?;
            place(host, parent, &node, i)?;
        }

        let mut removed = 0usize;
        for candidate in keyed.into_values() {
            if let Some(node) = candidate.host {
                remove_subtree(host, &node)?;
                removed += 1;
            }
        }
        for candidate in pool.drain_unclaimed() {
            if let Some(node) = candidate.host {
                remove_subtree(host, &node)?;
                removed += 1;
            }
        }
        // Anything still attached past the new children was never paired
        // with an old child (blank text, duplicate keys, stray host nodes).
        let count = host.child_count(parent);
        for index in (new_children.len()..count).rev() {
            if let Some(stray) = host.child_at(parent, index) {
                remove_subtree(host, &stray)?;
                removed += 1;
            }
        }

        debug!(
            new = new_children.len(),
            old = old_children.len(),
            keyed = keyed_len,
            pooled = pooled_len,
            reused,
            removed,
            "reconciled children"
        );
        Ok(())
    }
}

/// A primitive old child rendered as whitespace-only text never enters the
/// pool.
fn is_blank_text<H: HostTree>(host: &H, candidate: &Candidate<'_, H::Node>) -> bool {
    if !is_primitive(candidate.vnode) {
        return false;
    }
    candidate
        .host
        .as_ref()
        .and_then(|node| host.text_content(node))
        .is_some_and(|text| text.trim().is_empty())
}

/// Move `node` to position `index` under `parent` unless it is already there.
fn place<H: HostTree>(
    host: &mut H,
    parent: &H::Node,
    node: &H::Node,
    index: usize,
) -> DiffResult<()> {
    let Some(current) = host.child_at(parent, index) else {
        host.append_child(parent, node)?;
        return Ok(());
    };
    if current == *node {
        return Ok(());
    }
    if host.next_sibling(&current).as_ref() == Some(node) {
        // Dropping the stale node slides ours into place without a move.
        host.remove_node(&current)?;
    } else {
        host.insert_before(parent, node, &current)?;
    }
    Ok(())
}

/// Reconcile children with the default configuration. See
/// [`Reconciler::reconcile_children`].
pub fn reconcile_children<H: HostTree>(
    host: &mut H,
    new_children: &[VNode],
    old_children: &[VNode],
    host_children: &[H::Node],
    parent: &H::Node,
) -> DiffResult<()> {
    Reconciler::default().reconcile_children(host, new_children, old_children, host_children, parent)
}
