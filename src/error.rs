//! Error types for the proxy
//!
//! Provides unified error handling using thiserror. Every variant maps to a
//! JSON error body so handlers can simply propagate with `?`.

use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Proxy Error Enum ==
/// Unified error type for the proxy.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// No route matched the request
    #[error("endpoint not found")]
    RouteNotFound,

    /// Upstream answered but had nothing to reshape
    #[error("{0}")]
    NoData(String),

    /// Invalid query or path supplied by the client
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Upstream answered with a non-success status
    #[error("{message}")]
    UpstreamStatus { status: u16, message: String },

    /// Upstream answered with a body that is not JSON
    #[error("Invalid upstream payload: {0}")]
    InvalidUpstreamPayload(String),

    /// Upstream could not be reached (connect failure, timeout)
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    /// HTTP status this error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::RouteNotFound | ProxyError::NoData(_) => StatusCode::NOT_FOUND,
            ProxyError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::UpstreamStatus { .. } | ProxyError::InvalidUpstreamPayload(_) => {
                StatusCode::BAD_GATEWAY
            }
            ProxyError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == Query Rejection ==
/// Malformed query strings get the same JSON 400 body as any other bad input.
impl From<QueryRejection> for ProxyError {
    fn from(rejection: QueryRejection) -> Self {
        ProxyError::BadRequest(rejection.body_text())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            ProxyError::RouteNotFound => json!({
                "error": "endpoint not found",
                "hint": "GET / for available routes"
            }),
            ProxyError::UpstreamStatus { status, message } => json!({
                "error": message,
                "status": status
            }),
            ProxyError::UpstreamUnavailable(detail) => json!({
                "error": "Upstream unavailable",
                "detail": detail
            }),
            ProxyError::Internal(detail) => json!({
                "error": "internal server error",
                "detail": detail
            }),
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the proxy.
pub type Result<T> = std::result::Result<T, ProxyError>;
