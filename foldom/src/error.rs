//! Document error types.

use thiserror::Error;

use crate::node::NodeId;

/// Errors raised by the host document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// The selector could not be parsed.
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
    /// The node handle does not belong to this document.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    /// A height value could not be parsed.
    #[error("invalid height value '{0}'")]
    InvalidHeight(String),
}

pub type Result<T> = std::result::Result<T, DomError>;
