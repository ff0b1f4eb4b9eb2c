//! Error types for enrich-server
//!
//! Validation errors are raised before any store or network call and map to
//! 400. Store failures, including a missing record, map to 500. Every error
//! body has the shape `{"error": "<message>"}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors surfaced by the record service and HTTP handlers
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Numeric query parameter that does not parse as an integer
    #[error("invalid value for parameter '{name}': {value}")]
    InvalidParameter { name: String, value: String },

    /// Query parameter outside the filter allow-list
    #[error("invalid query param: {0}")]
    UnknownParameter(String),

    /// Payload field outside the person field allow-list
    #[error("invalid field: {0}")]
    InvalidField(String),

    /// Payload field present with the wrong JSON type
    #[error("type mismatch in field '{0}'")]
    TypeMismatch(String),

    /// Required creation field absent from the payload
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Update payload with nothing left to assign
    #[error("no fields to update")]
    EmptyUpdate,

    /// Request body is not a JSON object
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// Non-numeric `:id` path segment
    #[error("invalid id: {0}")]
    InvalidId(String),

    /// No person with this id
    #[error("person not found: {0}")]
    NotFound(i64),

    /// Persistence failure
    #[error(transparent)]
    Store(#[from] enrich_common::Error),
}

/// Convenience Result type for service operations
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

impl ServiceError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidParameter { .. }
            | ServiceError::UnknownParameter(_)
            | ServiceError::InvalidField(_)
            | ServiceError::TypeMismatch(_)
            | ServiceError::MissingField(_)
            | ServiceError::EmptyUpdate
            | ServiceError::InvalidBody(_)
            | ServiceError::InvalidId(_) => StatusCode::BAD_REQUEST,
            // Missing records are reported as server errors, matching the
            // status mapping existing clients observe.
            ServiceError::NotFound(_) | ServiceError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
