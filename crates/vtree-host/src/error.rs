/// Errors raised by a host adapter.
///
/// Node handles are rendered into the message with their `Debug` form so the
/// error type stays independent of any one adapter's handle type.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The handle does not refer to a live node of this host.
    #[error("host node not found: {0}")]
    NodeNotFound(String),

    /// A text operation was attempted on a non-text node.
    #[error("host node {0} is not a text node")]
    NotAText(String),

    /// A property operation was attempted on a node without properties.
    #[error("host node {0} is not an element")]
    NotAnElement(String),

    /// A child operation was attempted on a node that cannot hold children.
    #[error("host node {0} cannot contain children")]
    NotAContainer(String),

    /// The reference node of an insertion is not a child of the parent.
    #[error("host node {node} is not a child of {parent}")]
    NotAChild { node: String, parent: String },

    /// The insertion would make a node its own ancestor.
    #[error("inserting {node} under {parent} would create a cycle")]
    HierarchyCycle { node: String, parent: String },

    /// The host refused to reflect a property.
    #[error("property {name:?} rejected: {reason}")]
    PropertyRejected { name: String, reason: String },

    /// A failure from a foreign host backend, carried unmodified.
    #[error(transparent)]
    Backend(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Result alias for host operations.
pub type HostResult<T> = Result<T, HostError>;
