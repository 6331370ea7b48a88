//! Storage error type.

use thiserror::Error;

/// Errors a storage backend can report.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store failed to complete an operation.
    #[error("storage backend error: {message}")]
    Backend {
        /// Description of the failure.
        message: String,
    },
}

impl StoreError {
    /// Build a backend error from any displayable cause.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
