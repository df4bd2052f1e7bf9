use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid virtual tree: {0}")]
    Parse(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
