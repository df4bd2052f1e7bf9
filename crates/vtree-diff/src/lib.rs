//! Reconciliation engine for vtree.
//!
//! Given a new virtual tree, the previous virtual tree, and the host node the
//! previous tree produced, the engine applies the smallest practical set of
//! mutations to the host tree so it represents the new virtual tree. Node
//! identity is decided by explicit keys where given and by node type and
//! position otherwise; host nodes are moved and reused rather than rebuilt.
//!
//! Every call is synchronous and leaves the host tree consistent before it
//! returns. Nothing recurses on the call stack: subtree creation, teardown
//! and child reconciliation all run from explicit worklists, so tree depth
//! is limited only by memory.
//!
//! # Key Types
//!
//! - [`Reconciler`] -- Entry point; owns a [`ReconcileConfig`]
//! - [`Patch`] -- The three mutation intents (replace, text, property)
//! - [`DiffError`] / [`DiffResult`] -- Failures, including host errors passed through
//!
//! # Components
//!
//! - [`classify`] -- primitive / skip / same-type predicates
//! - [`differ`] -- per-node comparison and property diff
//! - [`reconcile`] -- keyed and positional child matching
//! - [`patch`] -- the only code that mutates the host
//! - [`remove`] -- children-first subtree teardown

pub mod classify;
pub mod config;
pub mod differ;
pub mod error;
pub mod patch;
pub mod reconcile;
pub mod remove;

pub use classify::{is_primitive, is_same_node_type, should_render};
pub use config::ReconcileConfig;
pub use differ::{diff, Reconciler};
pub use error::{DiffError, DiffResult};
pub use patch::Patch;
pub use reconcile::reconcile_children;
pub use remove::remove_subtree;
