//! # WasteWatch Error Handling
//!
//! This crate provides the unified error type shared by WasteWatch services.
//! It uses `thiserror` for the error definitions and converts cleanly into
//! `anyhow::Error` for binaries.
//!
//! ## Features
//!
//! - **Service-wide Variants**: configuration, IO, serialization, training and
//!   availability failures in one enum
//! - **Error Categorization**: helpers to tell client errors from transient ones
//! - **HTTP Integration**: with the `axum` feature, errors render as JSON responses
//!
//! ## Usage
//!
//! ```rust
//! use wastewatch_error::{WasteError, Result};
//!
//! fn operation() -> Result<String> {
//!     Err(WasteError::Training("no rows".to_string()))
//! }
//!
//! use anyhow::Context;
//!
//! fn app_code() -> anyhow::Result<()> {
//!     let _value = operation().context("failed to train models");
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for WasteWatch services.
#[derive(Error, Debug)]
pub enum WasteError {
    /// Configuration-related errors (invalid values, unreadable settings)
    #[error("configuration error: {0}")]
    Config(String),

    /// IO errors (reading training data files, binding sockets)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid input validation errors
    #[error("invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    /// The service cannot answer yet (models still loading, no usable data)
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// A conflicting operation is already running
    #[error("conflict: {0}")]
    Conflict(String),

    /// Model training errors
    #[error("training error: {0}")]
    Training(String),

    /// Internal errors (bugs, unexpected states, etc.)
    #[error("internal error: {0}")]
    Internal(String),
}

/// Type alias for Results using WasteError
pub type Result<T> = std::result::Result<T, WasteError>;

impl From<serde_json::Error> for WasteError {
    fn from(err: serde_json::Error) -> Self {
        WasteError::Serialization(err.to_string())
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for WasteError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        use axum::Json;

        let (status, error_type) = match &self {
            WasteError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, "invalid_input"),
            WasteError::Config(_) => (StatusCode::BAD_REQUEST, "config_error"),
            WasteError::Serialization(_) => (StatusCode::BAD_REQUEST, "serialization_error"),
            WasteError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            WasteError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
            WasteError::Training(_) => (StatusCode::SERVICE_UNAVAILABLE, "training_error"),
            WasteError::Io(_) | WasteError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        let body = Json(serde_json::json!({
            "error": error_type,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

impl WasteError {
    /// Determines if this error is worth retrying later.
    ///
    /// Unavailability, conflicts with a running training pass and IO
    /// failures clear up on their own; bad input does not.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            WasteError::Unavailable(_) | WasteError::Conflict(_) | WasteError::Io(_)
        )
    }

    /// Determines if this error is a client error (4xx-equivalent).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            WasteError::Config(_)
                | WasteError::InvalidInput { .. }
                | WasteError::Serialization(_)
        )
    }

    // ==========================================
    // Convenience constructors
    // ==========================================

    /// Creates an invalid input error
    #[must_use]
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        WasteError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a configuration error
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        WasteError::Config(msg.into())
    }

    /// Creates an unavailable error
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        WasteError::Unavailable(msg.into())
    }

    /// Creates a conflict error
    #[must_use]
    pub fn conflict(msg: impl Into<String>) -> Self {
        WasteError::Conflict(msg.into())
    }

    /// Creates a training error
    #[must_use]
    pub fn training(msg: impl Into<String>) -> Self {
        WasteError::Training(msg.into())
    }

    /// Creates an internal error
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        WasteError::Internal(msg.into())
    }
}
