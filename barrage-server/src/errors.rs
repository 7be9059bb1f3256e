//! REST error type and its HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use barrage_core::{TaskError, ValidationError};
use barrage_interfaces::StoreError;
use barrage_metrics::MetricsError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RestError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Validation error: {message}")]
    Validation { message: String },
}

pub type RestResult<T> = Result<T, RestError>;

impl RestError {
    pub fn not_found(resource: &str, id: &str) -> Self {
        RestError::NotFound(format!("{} with ID '{}' not found", resource, id))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RestError::NotFound(_) => StatusCode::NOT_FOUND,
            RestError::BadRequest(_) | RestError::Validation { .. } => StatusCode::BAD_REQUEST,
            RestError::Conflict(_) => StatusCode::CONFLICT,
            RestError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            RestError::NotFound(_) => "NOT_FOUND",
            RestError::BadRequest(_) => "BAD_REQUEST",
            RestError::Conflict(_) => "CONFLICT",
            RestError::InternalError(_) => "INTERNAL_ERROR",
            RestError::Validation { .. } => "VALIDATION_ERROR",
        }
    }

    fn message(&self) -> String {
        match self {
            RestError::NotFound(msg)
            | RestError::BadRequest(msg)
            | RestError::Conflict(msg)
            | RestError::InternalError(msg) => msg.clone(),
            RestError::Validation { message } => message.clone(),
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.message(),
                "status": status.as_u16()
            }
        });
        (status, Json(body)).into_response()
    }
}

impl From<TaskError> for RestError {
    fn from(err: TaskError) -> Self {
        match &err {
            TaskError::NotFound(id) => RestError::not_found("Attack", id.as_str()),
            TaskError::InvalidStateTransition { .. } => RestError::Conflict(err.to_string()),
        }
    }
}

impl From<ValidationError> for RestError {
    fn from(err: ValidationError) -> Self {
        RestError::Validation {
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for RestError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => RestError::not_found("Report", id.as_str()),
            other => RestError::InternalError(other.to_string()),
        }
    }
}

impl From<MetricsError> for RestError {
    fn from(err: MetricsError) -> Self {
        RestError::InternalError(err.to_string())
    }
}
