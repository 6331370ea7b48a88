//! Client error types.

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Errors returned by [`ChatClient`](crate::ChatClient).
#[derive(Debug, Error)]
pub enum ClientError {
    /// The WebSocket handshake failed.
    #[error("failed to connect to {url}: {source}")]
    Connect {
        /// Target URL.
        url: String,
        /// Underlying failure.
        #[source]
        source: Box<tungstenite::Error>,
    },
    /// No open socket (closed, reconnecting, or disconnected).
    #[error("not connected")]
    NotConnected,
    /// A frame could not be encoded.
    #[error("failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_error_names_url() {
        let err = ClientError::Connect {
            url: "ws://nowhere/ws".into(),
            source: Box::new(tungstenite::Error::ConnectionClosed),
        };
        assert!(err.to_string().starts_with("failed to connect to ws://nowhere/ws"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
