//! Error types for the reconciliation engine.

use vtree_host::HostError;

/// Errors that can occur while reconciling a host tree.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// The host adapter failed. Carried through unchanged.
    #[error(transparent)]
    Host(#[from] HostError),

    /// The reconciler configuration could not be parsed.
    #[error("invalid reconciler configuration: {0}")]
    Config(String),
}

/// Convenience alias for reconciliation results.
pub type DiffResult<T> = Result<T, DiffError>;
