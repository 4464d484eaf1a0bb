//! Error types for Boardgate.

use std::fmt::{self, Display, Formatter};

/// Errors returned by Boardgate operations.
///
/// The rule engine itself never fails; these cover the shell around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardgateError {
    /// An unexpected IO or serialization error occurred.
    Io(String),
    /// Configuration loading or validation failed.
    Configuration(String),
    /// Issue operation failed.
    IssueOperation(String),
    /// A move was denied by the workflow.
    InvalidTransition(String),
    /// A workflow editing operation was rejected.
    WorkflowEdit(String),
}

impl Display for BoardgateError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            BoardgateError::Io(message) => write!(formatter, "{message}"),
            BoardgateError::Configuration(message) => write!(formatter, "{message}"),
            BoardgateError::IssueOperation(message) => write!(formatter, "{message}"),
            BoardgateError::InvalidTransition(message) => write!(formatter, "{message}"),
            BoardgateError::WorkflowEdit(message) => write!(formatter, "{message}"),
        }
    }
}

impl std::error::Error for BoardgateError {}
