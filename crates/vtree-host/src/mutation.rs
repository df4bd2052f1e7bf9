//! Journal entries recorded by the in-memory host.

use std::fmt;

use serde::{Deserialize, Serialize};
use vtree_types::{Tag, Value};

use crate::memory::NodeId;

/// One observable mutation of a [`MemoryHost`](crate::MemoryHost).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    /// A structured node was allocated.
    CreateNode { node: NodeId, tag: Tag },
    /// A text node was allocated.
    CreateText { node: NodeId, text: String },
    /// A text node's content was replaced.
    SetText { node: NodeId, text: String },
    /// A property was set.
    SetProperty {
        node: NodeId,
        name: String,
        value: Value,
    },
    /// A property was cleared.
    RemoveProperty { node: NodeId, name: String },
    /// A node was appended to a parent (possibly moving it).
    Append { parent: NodeId, child: NodeId },
    /// A node was inserted before a sibling (possibly moving it).
    InsertBefore {
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    },
    /// A node was detached from its parent.
    Remove { node: NodeId, parent: NodeId },
}

impl Mutation {
    /// Whether this entry allocated a node.
    pub fn is_creation(&self) -> bool {
        matches!(self, Mutation::CreateNode { .. } | Mutation::CreateText { .. })
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::CreateNode { node, tag } => write!(f, "create {node} <{tag}>"),
            Mutation::CreateText { node, text } => write!(f, "create {node} text {text:?}"),
            Mutation::SetText { node, text } => write!(f, "text {node} = {text:?}"),
            Mutation::SetProperty { node, name, value } => write!(f, "set {node}.{name} = {value}"),
            Mutation::RemoveProperty { node, name } => write!(f, "unset {node}.{name}"),
            Mutation::Append { parent, child } => write!(f, "append {child} -> {parent}"),
            Mutation::InsertBefore {
                parent,
                child,
                reference,
            } => write!(f, "insert {child} -> {parent} before {reference}"),
            Mutation::Remove { node, parent } => write!(f, "remove {node} from {parent}"),
        }
    }
}

/// Per-kind counts over a mutation journal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationStats {
    pub created: usize,
    pub text_updates: usize,
    pub properties_set: usize,
    pub properties_removed: usize,
    pub placements: usize,
    pub removals: usize,
}

impl MutationStats {
    /// Tally a journal.
    pub fn from_journal(journal: &[Mutation]) -> Self {
        let mut stats = Self::default();
        for entry in journal {
            match entry {
                Mutation::CreateNode { .. } | Mutation::CreateText { .. } => stats.created += 1,
                Mutation::SetText { .. } => stats.text_updates += 1,
                Mutation::SetProperty { .. } => stats.properties_set += 1,
                Mutation::RemoveProperty { .. } => stats.properties_removed += 1,
                Mutation::Append { .. } | Mutation::InsertBefore { .. } => stats.placements += 1,
                Mutation::Remove { .. } => stats.removals += 1,
            }
        }
        stats
    }

    /// Total number of mutations.
    pub fn total(&self) -> usize {
        self.created
            + self.text_updates
            + self.properties_set
            + self.properties_removed
            + self.placements
            + self.removals
    }
}
