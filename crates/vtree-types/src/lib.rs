//! Virtual-tree data model for vtree.
//!
//! A virtual tree is the declarative description of a UI tree for one render
//! pass. The reconciler in `vtree-diff` consumes two of them (the previous and
//! the next) and brings a live host tree in line with the next one.
//!
//! # Key Types
//!
//! - [`VNode`]: A virtual-tree value: primitive or structured
//! - [`VElement`]: Structured node with tag, key, props, and children
//! - [`Tag`]: Node-type identity (element name or component marker)
//! - [`Key`]: Explicit child identity across renders
//! - [`Props`]: Property map (`BTreeMap<String, serde_json::Value>`)

pub mod error;
pub mod node;
pub mod tag;

pub use error::TypeError;
pub use node::{Props, VElement, VNode};
pub use tag::{Key, Tag};

/// Re-exported so callers can build property values without a direct
/// `serde_json` dependency.
pub use serde_json::Value;
