//! HTTP error type and its JSON rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::llm::LlmError;

#[derive(Debug, Error)]
pub enum HttpError {
    /// Bad request (missing or malformed input).
    #[error("{0}")]
    BadRequest(String),

    /// Request body failed validation; every problem is listed.
    #[error("Validation error")]
    Validation(Vec<String>),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found")]
    NotFound,

    #[error("Payload too large")]
    PayloadTooLarge,

    /// An upstream dependency (the LLM) could not serve the request.
    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<String>>,
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::BadRequest(_) | HttpError::Validation(_) => StatusCode::BAD_REQUEST,
            HttpError::Unauthorized => StatusCode::UNAUTHORIZED,
            HttpError::NotFound => StatusCode::NOT_FOUND,
            HttpError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            HttpError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            HttpError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        }

        let error = self.to_string();
        let details = match self {
            HttpError::Validation(details) => Some(details),
            _ => None,
        };

        (status, axum::Json(ErrorBody { error, details })).into_response()
    }
}

impl From<anyhow::Error> for HttpError {
    fn from(err: anyhow::Error) -> Self {
        HttpError::Internal(format!("{err:#}"))
    }
}

impl From<LlmError> for HttpError {
    fn from(err: LlmError) -> Self {
        HttpError::ServiceUnavailable(err.to_string())
    }
}
