use axum::{http::StatusCode, response::IntoResponse};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Application error type shared by all three services.
///
/// Each variant maps to exactly one HTTP status so that handlers can
/// propagate errors with `?` and rely on `IntoResponse` for the reply.
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Client Input Errors =====
    #[error("validation error: {0}")]
    Validation(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ===== Authentication Errors =====
    #[error("authentication error: {0}")]
    Auth(String),

    // ===== Lookup Errors =====
    #[error("not found: {0}")]
    NotFound(String),

    // ===== Backend & Downstream Errors =====
    #[error("downstream error: {0}")]
    Downstream(String),

    #[error("cache error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("message channel error: {0}")]
    Kafka(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    // ===== Startup Errors =====
    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Downstream(_)
            | AppError::Redis(_)
            | AppError::Kafka(_)
            | AppError::Http(_)
            | AppError::Config(_)
            | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-facing error message (without backend details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => format!("validation error: {}", msg),
            AppError::Json(e) => format!("could not decode body: {}", e),
            AppError::Auth(msg) => format!("authentication failed: {}", msg),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Downstream(msg) => msg.clone(),
            AppError::Redis(_) => "cache backend error".to_string(),
            AppError::Kafka(_) => "message channel error".to_string(),
            AppError::Http(_) => "downstream service error".to_string(),
            AppError::Config(msg) => format!("configuration error: {}", msg),
            AppError::Io(_) => "internal server error".to_string(),
        }
    }

    /// Get error code for programmatic error handling
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) | AppError::Json(_) => "VALIDATION_ERROR",
            AppError::Auth(_) => "AUTH_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Downstream(_) | AppError::Http(_) => "DOWNSTREAM_ERROR",
            AppError::Redis(_) => "CACHE_ERROR",
            AppError::Kafka(_) => "CHANNEL_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Io(_) => "IO_ERROR",
        }
    }

    /// Log this error with appropriate level and context
    pub fn log(&self) {
        let status = self.status_code();
        let code = self.error_code();

        if status.is_server_error() {
            tracing::error!(
                error = %self,
                error_code = %code,
                status = %status.as_u16(),
                "server error occurred"
            );
        } else if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(
                error = %self,
                error_code = %code,
                "authentication failed"
            );
        } else {
            tracing::debug!(
                error = %self,
                error_code = %code,
                "client error occurred"
            );
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        self.log();

        let status = self.status_code();
        let body = json!({
            "error": self.user_message(),
            "error_code": self.error_code(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

// ============================================================================
// Helper functions for creating common errors
// ============================================================================

impl AppError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        AppError::Auth(msg.into())
    }

    /// Create a not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    /// Create a downstream error
    pub fn downstream(msg: impl Into<String>) -> Self {
        AppError::Downstream(msg.into())
    }
}
