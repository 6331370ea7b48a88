//! Decoding and rejection of inbound chat frames.

use solace_core::{ClientFrame, ValidationError};
use thiserror::Error;

/// Why an inbound frame was dropped.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Binary frame that is not UTF-8 text.
    #[error("binary frame is not valid UTF-8")]
    NotUtf8,
    /// Not JSON, unknown `type`, or missing/mistyped fields.
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
    /// Well-formed but fails message validation.
    #[error("invalid frame: {0}")]
    Invalid(#[from] ValidationError),
}

impl FrameError {
    /// Short label for the rejection metric.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NotUtf8 => "not_utf8",
            Self::Malformed(_) => "malformed",
            Self::Invalid(_) => "invalid",
        }
    }
}

/// Decode a text frame.
pub fn decode_text(text: &str) -> Result<ClientFrame, FrameError> {
    Ok(serde_json::from_str(text)?)
}

/// Decode a binary frame carrying UTF-8 JSON.
pub fn decode_binary(data: &[u8]) -> Result<ClientFrame, FrameError> {
    let text = std::str::from_utf8(data).map_err(|_| FrameError::NotUtf8)?;
    decode_text(text)
}
