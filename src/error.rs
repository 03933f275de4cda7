//! Error handling for the engine

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::api::responses::ErrorResponse;

/// Broad error class, used by callers to decide whether a failure is
/// user-facing or an internal alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed caller input (date keys, run keys, ranges, party sizes).
    Validation,
    /// A model object does not match its declared `type` discriminator.
    InvalidModel,
    /// Stored configuration is well-formed per field but logically invalid.
    Configuration,
}

/// Engine error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid date key '{0}': expected YYYY-MM-DD")]
    InvalidDateKey(String),

    #[error("invalid time '{0}': expected HH:MM (24-hour)")]
    InvalidTime(String),

    #[error("invalid tour run key '{0}': expected tourId|YYYY-MM-DD|HH:MM")]
    InvalidTourRunKey(String),

    #[error("invalid date range: {from} is after {to}")]
    InvalidDateRange { from: String, to: String },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid {declared_type} model: field '{field}' {reason}")]
    InvalidModel {
        declared_type: String,
        field: String,
        reason: String,
    },

    #[error("configuration error: {message}")]
    Configuration {
        message: String,
        errors: Vec<String>,
    },
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::InvalidDateKey(_)
            | EngineError::InvalidTime(_)
            | EngineError::InvalidTourRunKey(_)
            | EngineError::InvalidDateRange { .. }
            | EngineError::Validation(_) => ErrorKind::Validation,
            EngineError::InvalidModel { .. } => ErrorKind::InvalidModel,
            EngineError::Configuration { .. } => ErrorKind::Configuration,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::InvalidModel => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            EngineError::InvalidDateKey(_) => "invalid_date_key",
            EngineError::InvalidTime(_) => "invalid_time",
            EngineError::InvalidTourRunKey(_) => "invalid_tour_run_key",
            EngineError::InvalidDateRange { .. } => "invalid_date_range",
            EngineError::Validation(_) => "validation_error",
            EngineError::InvalidModel { .. } => "invalid_model",
            EngineError::Configuration { .. } => "configuration_error",
        }
    }

    pub(crate) fn invalid_model(
        declared_type: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        EngineError::InvalidModel {
            declared_type: declared_type.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Single-cause configuration error.
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        let message = message.into();
        EngineError::Configuration {
            errors: vec![message.clone()],
            message,
        }
    }
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let details = match &self {
            EngineError::InvalidModel {
                declared_type,
                field,
                ..
            } => Some(json!({ "declared_type": declared_type, "field": field })),
            EngineError::Configuration { errors, .. } => Some(json!(errors)),
            _ => None,
        };

        // Broken stored configuration needs an operator, not the caller
        if status.is_server_error() {
            tracing::error!(error = %self, details = ?details, "configuration error");
        }

        let body = ErrorResponse {
            error_type: self.error_type().to_string(),
            message: self.to_string(),
            details,
        };
        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
