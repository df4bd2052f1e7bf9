use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use vtree_types::{Props, Tag, Value};

use crate::error::{HostError, HostResult};
use crate::mutation::{Mutation, MutationStats};
use crate::traits::HostTree;

/// Handle to a node of a [`MemoryHost`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId(#{})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug)]
enum NodeKind {
    Root,
    Element { tag: Tag, props: Props },
    Text(String),
}

#[derive(Clone, Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed host tree.
///
/// Intended for tests, tooling and embedding. Nodes are never freed: a
/// removed node stays addressable (detached) so callers can check identity
/// after a reconciliation. Every mutation made through [`HostTree`] is
/// recorded in a journal.
#[derive(Default)]
pub struct MemoryHost {
    nodes: Vec<NodeData>,
    journal: Vec<Mutation>,
    rejected: BTreeSet<String>,
}

impl MemoryHost {
    /// Create an empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a detached container to render into. Not journaled.
    pub fn create_root(&mut self) -> NodeId {
        self.alloc(NodeKind::Root)
    }

    /// Total number of nodes ever allocated.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no node has been allocated.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All mutations recorded so far.
    pub fn journal(&self) -> &[Mutation] {
        &self.journal
    }

    /// Drain the journal.
    pub fn take_journal(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.journal)
    }

    /// Forget recorded mutations.
    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    /// Per-kind counts over the current journal.
    pub fn stats(&self) -> MutationStats {
        MutationStats::from_journal(&self.journal)
    }

    /// Make every later reflection of `name` fail with
    /// [`HostError::PropertyRejected`].
    pub fn reject_property(&mut self, name: impl Into<String>) {
        self.rejected.insert(name.into());
    }

    /// Change a property out of band, as user interaction would. Not
    /// journaled.
    pub fn set_live_property(&mut self, node: NodeId, name: &str, value: Value) -> HostResult<()> {
        let props = self.props_mut(node)?;
        props.insert(name.to_owned(), value);
        Ok(())
    }

    /// The tag of a structured node.
    pub fn tag(&self, node: NodeId) -> Option<&Tag> {
        match &self.nodes.get(node.index())?.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// The stored property map of a structured node.
    pub fn props(&self, node: NodeId) -> Option<&Props> {
        match &self.nodes.get(node.index())?.kind {
            NodeKind::Element { props, .. } => Some(props),
            _ => None,
        }
    }

    /// Children of `node` as a slice.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.index())
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Render a subtree as HTML-like markup.
    ///
    /// Attributes are emitted in name order. String values are written
    /// as-is, other JSON values in compact form. A root renders as the
    /// concatenation of its children.
    pub fn to_markup(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_markup(node, &mut out);
        out
    }

    fn write_markup(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.nodes.get(node.index()) else {
            return;
        };
        match &data.kind {
            NodeKind::Text(text) => out.push_str(&escape(text)),
            NodeKind::Root => {
                for child in &data.children {
                    self.write_markup(*child, out);
                }
            }
            NodeKind::Element { tag, props } => {
                out.push('<');
                out.push_str(&tag.to_string());
                for (name, value) in props {
                    let rendered = match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    out.push_str(&format!(" {name}=\"{}\"", escape(&rendered)));
                }
                out.push('>');
                for child in &data.children {
                    self.write_markup(*child, out);
                }
                out.push_str(&format!("</{tag}>"));
            }
        }
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn data(&self, node: NodeId) -> HostResult<&NodeData> {
        self.nodes
            .get(node.index())
            .ok_or_else(|| HostError::NodeNotFound(node.to_string()))
    }

    fn data_mut(&mut self, node: NodeId) -> HostResult<&mut NodeData> {
        self.nodes
            .get_mut(node.index())
            .ok_or_else(|| HostError::NodeNotFound(node.to_string()))
    }

    fn props_mut(&mut self, node: NodeId) -> HostResult<&mut Props> {
        match &mut self.data_mut(node)?.kind {
            NodeKind::Element { props, .. } => Ok(props),
            _ => Err(HostError::NotAnElement(node.to_string())),
        }
    }

    /// Validate that `child` may be placed under `parent`.
    fn check_placement(&self, parent: NodeId, child: NodeId) -> HostResult<()> {
        if matches!(self.data(parent)?.kind, NodeKind::Text(_)) {
            return Err(HostError::NotAContainer(parent.to_string()));
        }
        self.data(child)?;
        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == child {
                return Err(HostError::HierarchyCycle {
                    node: child.to_string(),
                    parent: parent.to_string(),
                });
            }
            cursor = self.nodes[current.index()].parent;
        }
        Ok(())
    }

    /// Unlink `node` from its parent without journaling.
    fn unlink(&mut self, node: NodeId) -> HostResult<Option<NodeId>> {
        let Some(parent) = self.data(node)?.parent else {
            return Ok(None);
        };
        self.nodes[parent.index()].children.retain(|c| *c != node);
        self.nodes[node.index()].parent = None;
        Ok(Some(parent))
    }
}

impl HostTree for MemoryHost {
    type Node = NodeId;

    fn create_node(&mut self, tag: &Tag) -> HostResult<NodeId> {
        let node = self.alloc(NodeKind::Element {
            tag: tag.clone(),
            props: Props::new(),
        });
        self.journal.push(Mutation::CreateNode {
            node,
            tag: tag.clone(),
        });
        Ok(node)
    }

    fn create_text(&mut self, text: &str) -> HostResult<NodeId> {
        let node = self.alloc(NodeKind::Text(text.to_owned()));
        self.journal.push(Mutation::CreateText {
            node,
            text: text.to_owned(),
        });
        Ok(node)
    }

    fn set_text(&mut self, node: &NodeId, text: &str) -> HostResult<()> {
        match &mut self.data_mut(*node)?.kind {
            NodeKind::Text(content) => {
                *content = text.to_owned();
            }
            _ => return Err(HostError::NotAText(node.to_string())),
        }
        self.journal.push(Mutation::SetText {
            node: *node,
            text: text.to_owned(),
        });
        Ok(())
    }

    fn text_content(&self, node: &NodeId) -> Option<String> {
        match &self.nodes.get(node.index())?.kind {
            NodeKind::Text(content) => Some(content.clone()),
            _ => None,
        }
    }

    fn remove_node(&mut self, node: &NodeId) -> HostResult<()> {
        if let Some(parent) = self.unlink(*node)? {
            self.journal.push(Mutation::Remove {
                node: *node,
                parent,
            });
        }
        Ok(())
    }

    fn reflect_property(
        &mut self,
        node: &NodeId,
        name: &str,
        _old: Option<&Value>,
        new: Option<&Value>,
    ) -> HostResult<()> {
        if self.rejected.contains(name) {
            return Err(HostError::PropertyRejected {
                name: name.to_owned(),
                reason: "rejected by host".into(),
            });
        }
        let props = self.props_mut(*node)?;
        let entry = match new {
            Some(value) => {
                props.insert(name.to_owned(), value.clone());
                Mutation::SetProperty {
                    node: *node,
                    name: name.to_owned(),
                    value: value.clone(),
                }
            }
            None => {
                props.remove(name);
                Mutation::RemoveProperty {
                    node: *node,
                    name: name.to_owned(),
                }
            }
        };
        self.journal.push(entry);
        Ok(())
    }

    fn live_property(&self, node: &NodeId, name: &str) -> Option<Value> {
        self.props(*node)?.get(name).cloned()
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> HostResult<()> {
        self.check_placement(*parent, *child)?;
        self.unlink(*child)?;
        self.nodes[parent.index()].children.push(*child);
        self.nodes[child.index()].parent = Some(*parent);
        self.journal.push(Mutation::Append {
            parent: *parent,
            child: *child,
        });
        Ok(())
    }

    fn insert_before(&mut self, parent: &NodeId, child: &NodeId, reference: &NodeId) -> HostResult<()> {
        self.check_placement(*parent, *child)?;
        if self.data(*reference)?.parent != Some(*parent) {
            return Err(HostError::NotAChild {
                node: reference.to_string(),
                parent: parent.to_string(),
            });
        }
        if child == reference {
            return Ok(());
        }
        self.unlink(*child)?;
        let siblings = &mut self.nodes[parent.index()].children;
        let at = siblings
            .iter()
            .position(|c| c == reference)
            .unwrap_or(siblings.len());
        siblings.insert(at, *child);
        self.nodes[child.index()].parent = Some(*parent);
        self.journal.push(Mutation::InsertBefore {
            parent: *parent,
            child: *child,
            reference: *reference,
        });
        Ok(())
    }

    fn child_count(&self, parent: &NodeId) -> usize {
        self.children(*parent).len()
    }

    fn child_at(&self, parent: &NodeId, index: usize) -> Option<NodeId> {
        self.children(*parent).get(index).copied()
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes.get(node.index())?.parent
    }

    fn child_nodes(&self, parent: &NodeId) -> Vec<NodeId> {
        self.children(*parent).to_vec()
    }

    fn next_sibling(&self, node: &NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|c| c == node)?;
        siblings.get(index + 1).copied()
    }
}

impl fmt::Debug for MemoryHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryHost")
            .field("node_count", &self.nodes.len())
            .field("journal_len", &self.journal.len())
            .finish()
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
