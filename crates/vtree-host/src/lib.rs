//! Host adapter contract for the vtree reconciler.
//!
//! The reconciler never touches a concrete document model. It drives a host
//! tree through the narrow [`HostTree`] trait: allocate nodes, set text,
//! reflect properties, and arrange children.
//!
//! # Backends
//!
//! - [`MemoryHost`] -- arena-backed tree with a mutation journal, for tests,
//!   tooling, and embedding
//!
//! # Design Rules
//!
//! 1. Handles are stable for the lifetime of the host.
//! 2. Child lists are live: reads always reflect earlier mutations.
//! 3. Placement moves: attaching an attached node detaches it first.
//! 4. Removal only detaches; it never fails on an orphan.
//! 5. Adapter failures are returned, never swallowed.

pub mod error;
pub mod memory;
pub mod mutation;
pub mod traits;

pub use error::{HostError, HostResult};
pub use memory::{MemoryHost, NodeId};
pub use mutation::{Mutation, MutationStats};
pub use traits::HostTree;
