//! Error types for the practice-deck server.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors from calls to the provider token and API endpoints.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-2xx status.
    #[error("{context} failed ({status}): {message}")]
    Upstream {
        /// What was being requested
        context: &'static str,
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Provider answered 2xx with a body we could not decode.
    #[error("Invalid response from {context}: {source}")]
    InvalidResponse {
        /// What was being requested
        context: &'static str,
        /// Decode error
        #[source]
        source: serde_json::Error,
    },

    /// Provider has no client credentials.
    #[error("{0} OAuth is not configured.")]
    NotConfigured(&'static str),

    /// Request carries no usable session cookies.
    #[error("Not authorized with {0}.")]
    MissingSession(&'static str),
}

impl ClientError {
    /// Create an upstream status error.
    #[must_use]
    pub fn upstream(context: &'static str, status: u16, message: impl Into<String>) -> Self {
        Self::Upstream { context, status, message: message.into() }
    }

    /// Upstream status code, if this error came from a provider response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Error returned to the browser as a JSON body.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// Error from a provider call
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Invalid query or path parameters
    #[error("Invalid input for '{field}': {message}")]
    Validation {
        /// Offending parameter
        field: &'static str,
        /// What is wrong with it
        message: String,
    },
}

impl ApiError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation { field, message: message.into() }
    }

    /// HTTP status this error is reported with.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Client(ClientError::NotConfigured(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Client(ClientError::MissingSession(_)) => StatusCode::UNAUTHORIZED,
            Self::Client(ClientError::Upstream { status: 404, .. }) => StatusCode::NOT_FOUND,
            Self::Client(_) => StatusCode::BAD_GATEWAY,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for handler operations.
pub type ApiResult<T> = Result<T, ApiError>;
