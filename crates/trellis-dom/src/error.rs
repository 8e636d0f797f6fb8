//! Error types for DOM backends

use crate::dom::NodeId;
use thiserror::Error;

/// Failure reported by a [`Dom`](crate::Dom) backend.
///
/// Patch application treats vanished nodes as no-ops before ever reaching
/// the backend, so these surface only for genuine backend faults or for
/// calls that name a node the backend never handed out.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The node id is not known to the backend
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    /// `child` is not a direct child of `parent`
    #[error("Node {child} is not a child of {parent}")]
    NotAChild {
        /// Expected parent
        parent: NodeId,
        /// Node that was looked up
        child: NodeId,
    },

    /// The operation would produce an invalid tree (text parent, cycle)
    #[error("Hierarchy request error: {0}")]
    Hierarchy(String),

    /// Error raised by the underlying document implementation
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;
