//! Error types for the EC2 module.

use thiserror::Error;

/// Result type alias for EC2 operations.
pub type Ec2Result<T> = Result<T, Ec2Error>;

/// Errors that can occur while talking to the EC2 control plane.
#[derive(Error, Debug)]
pub enum Ec2Error {
    #[error("AWS CLI not available: {0}")]
    CliNotAvailable(String),

    #[error("EC2 {operation} failed (exit code {code}): {stderr}")]
    CommandFailed {
        operation: String,
        code: i32,
        stderr: String,
    },

    #[error("Malformed EC2 {operation} response: {message}")]
    MalformedResponse { operation: String, message: String },

    #[error("EC2 API error: {0}")]
    Api(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Ec2Error {
    pub(crate) fn malformed(operation: &str, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            operation: operation.to_string(),
            message: message.into(),
        }
    }
}
