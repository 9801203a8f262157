//! Error types for the flow engine

use thiserror::Error;

/// Result type alias using FlowError
pub type Result<T> = std::result::Result<T, FlowError>;

/// Errors that can occur in the flow engine
#[derive(Debug, Error)]
pub enum FlowError {
    /// Node execution failed
    #[error("Node execution failed: {0}")]
    ExecutionFailed(String),

    /// Node configuration is malformed
    #[error("Invalid node configuration: {0}")]
    InvalidConfig(String),

    /// Missing required configuration field
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FlowError {
    /// Create an execution failed error with a message
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::ExecutionFailed(msg.into())
    }
}
