//! Validation error type for inbound payloads.

use thiserror::Error;

/// A payload failed schema-level validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required string field was empty.
    #[error("field '{field}' must not be empty")]
    Empty {
        /// Wire name of the offending field.
        field: &'static str,
    },

    /// A string field exceeded its maximum length.
    #[error("field '{field}' exceeds maximum length ({len} > {max})")]
    TooLong {
        /// Wire name of the offending field.
        field: &'static str,
        /// Actual length in bytes.
        len: usize,
        /// Allowed maximum in bytes.
        max: usize,
    },
}

impl ValidationError {
    /// Wire name of the field that failed.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Empty { field } | Self::TooLong { field, .. } => field,
        }
    }
}
