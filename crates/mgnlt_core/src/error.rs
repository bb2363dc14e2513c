//! Error types for the core workflow.

use std::path::PathBuf;
use thiserror::Error;

use mgnlt_ec2::Ec2Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while snapshotting or deploying launch templates.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Provider error: {0}")]
    Provider(#[from] Ec2Error),

    #[error("Launch template {template_id} has no \"Name\" tag in its first tag specification")]
    MissingNameTag { template_id: String },

    #[error("Launch template {0} has no versions")]
    NoVersions(String),

    #[error("Launch template {0} has no default version")]
    NoDefaultVersion(String),

    #[error("Malformed launch template {template_id}: {message}")]
    MalformedTemplate { template_id: String, message: String },

    #[error("Invalid edit file {path}: {message}")]
    InvalidEdit { path: PathBuf, message: String },

    #[error("Invalid snapshot name {0:?}")]
    InvalidSnapshotName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    pub(crate) fn malformed(template_id: &str, message: impl Into<String>) -> Self {
        Self::MalformedTemplate {
            template_id: template_id.to_string(),
            message: message.into(),
        }
    }
}
