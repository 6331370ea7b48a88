//! REST error responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use solace_store::StoreError;
use thiserror::Error;
use tracing::{debug, error};

/// A failed REST request. Every variant renders as `{"message": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Body failed to parse or validate (400).
    #[error("{message}")]
    InvalidPayload {
        /// Client-facing message.
        message: &'static str,
    },
    /// Unknown id (404).
    #[error("{message}")]
    NotFound {
        /// Client-facing message.
        message: &'static str,
    },
    /// Storage failure (500).
    #[error("{message}")]
    Internal {
        /// Client-facing message.
        message: &'static str,
        /// Logged, never sent.
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    /// Map a body rejection to a 400 carrying `message`.
    pub fn invalid(message: &'static str) -> impl FnOnce(JsonRejection) -> Self {
        move |rejection| {
            debug!(error = %rejection, "{message}");
            Self::InvalidPayload { message }
        }
    }

    /// Map a storage error to a 500 carrying `message`.
    pub fn internal(message: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Internal { message, source }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidPayload { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal { message, source } = &self {
            error!(error = %source, "{message}");
        }
        let status = self.status();
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}
