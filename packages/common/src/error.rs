use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by a host-tree binding
///
/// The reconciler never inspects these beyond propagating them: a failing
/// binding call is a contract violation between the caller and the host.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostError {
    #[error("Unknown host node: {0}")]
    UnknownNode(String),

    #[error("Host node is not an element: {0}")]
    NotAnElement(String),

    #[error("Host node is not a text node: {0}")]
    NotAText(String),

    #[error("Node {child} is not a child of {parent}")]
    NotAChild { child: String, parent: String },

    #[error("Inserting {child} under {parent} would create a cycle")]
    Cycle { child: String, parent: String },

    #[error("Host error: {0}")]
    Generic(String),
}

impl From<String> for HostError {
    fn from(s: String) -> Self {
        HostError::Generic(s)
    }
}

impl From<&str> for HostError {
    fn from(s: &str) -> Self {
        HostError::Generic(s.to_string())
    }
}
