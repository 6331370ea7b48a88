//! Input validation helpers.

use crate::errors::ValidationError;

/// Reject an empty string.
pub fn require_non_empty(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(())
}

/// Reject a string longer than `max_len` bytes.
pub fn validate_max_length(
    value: &str,
    field: &'static str,
    max_len: usize,
) -> Result<(), ValidationError> {
    if value.len() > max_len {
        return Err(ValidationError::TooLong {
            field,
            len: value.len(),
            max: max_len,
        });
    }
    Ok(())
}
