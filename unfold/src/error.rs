//! Engine error types.

use foldom::{DomError, NodeId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The document rejected an operation (bad selector, foreign node).
    #[error(transparent)]
    Dom(#[from] DomError),
    /// A selector-driven call matched nothing.
    #[error("selector '{selector}' matched no elements")]
    NoMatchingElements { selector: String },
    /// The element has no layout box, so its height cannot be measured.
    #[error("{0} is not rendered")]
    NotRendered(NodeId),
    /// Configuration could not be deserialized.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
