//! Core error type for the Mediq pipeline engine.
//!
//! `CoreError` is used throughout the core domain (catalog, pipeline,
//! backend, facade). When the `axum` feature is enabled, it also implements
//! `IntoResponse` so it can be used directly as an axum handler error type.

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Empty or whitespace-only analysis input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unknown role, task, or capability name.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The inference backend failed an invocation (HTTP error, transport
    /// failure, malformed response body).
    #[error("Backend invocation failed: {0}")]
    Backend(String),

    /// A pipeline run exceeded its caller-supplied time budget.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// A task references an upstream that does not precede it.
    #[error("Cyclic pipeline: {0}")]
    Cyclic(String),

    /// Catalog backing store could not be read or parsed.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Process configuration problem (missing API key, bad setting).
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;

// ---------------------------------------------------------------------------
// axum integration (opt-in via feature flag)
// ---------------------------------------------------------------------------

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for CoreError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let (status, message) = match &self {
            CoreError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            CoreError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            CoreError::Backend(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            CoreError::Timeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg.clone()),
            CoreError::Cyclic(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            CoreError::Catalog(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            CoreError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}
