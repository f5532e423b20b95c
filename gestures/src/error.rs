//! Error types shared by the matcher, the sequence validator and config parsing.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, GestureError>;

/// Errors reported by gesture matching and sequence gating.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GestureError {
    /// A template's point count disagrees with the pose being matched or stored.
    #[error("gesture '{template}' has {expected} tracked points, pose has {actual}")]
    TrackedPointCountMismatch {
        template: String,
        expected: usize,
        actual: usize,
    },

    /// A required collaborator or parameter is missing or out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An s-expression config could not be read.
    #[error("config parse error: {0}")]
    ConfigParse(String),
}

impl GestureError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::ConfigParse(message.into())
    }
}
