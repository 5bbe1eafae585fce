//! Validation error shared by submission-time checks.

use thiserror::Error;

/// A request was rejected before any job was enqueued.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}
