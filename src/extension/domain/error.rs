//! Errors raised by extension code.

use std::sync::Arc;
use thiserror::Error;

/// Failure reported by an extension factory or instance.
#[derive(Debug, Clone, Error)]
pub enum ExtensionError {
    /// The factory rejected its constructor arguments.
    #[error("invalid extension arguments: {0}")]
    InvalidArguments(String),

    /// The extension ran and failed.
    #[error("extension failed: {0}")]
    Failed(Arc<dyn std::error::Error + Send + Sync>),
}

impl ExtensionError {
    /// Creates an argument error with the given detail.
    pub fn invalid_arguments(detail: impl Into<String>) -> Self {
        Self::InvalidArguments(detail.into())
    }

    /// Wraps an error raised while the extension ran.
    pub fn failed(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Failed(Arc::new(err))
    }
}
