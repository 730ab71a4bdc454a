//! Failure kinds for a single navigation request.
//!
//! Every request ends in exactly one `Action` or exactly one `NavError`.
//! Nothing here is retried.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NavError {
    /// Bad goal, unsupported image type or empty image. Raised before the
    /// model is contacted.
    #[error("{0}")]
    InvalidRequest(String),

    /// The request body exceeded the configured upload limit.
    #[error("{0}")]
    PayloadTooLarge(String),

    /// The model replied, but the reply could not be reduced to a valid action.
    #[error("LLM response invalid: {0}")]
    MalformedOutput(String),

    /// Transport, auth, quota or provider-side failure.
    #[error("LLM request failed: {0:#}")]
    Upstream(anyhow::Error),
}

pub type NavResult<T> = Result<T, NavError>;

impl NavError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Map an extractor rejection, keeping 413 for oversized bodies.
    pub fn rejected(status: StatusCode, message: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(message)
        } else {
            Self::InvalidRequest(message)
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedOutput(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            NavError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            NavError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            NavError::MalformedOutput(_) => StatusCode::INTERNAL_SERVER_ERROR,
            NavError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for NavError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            NavError::InvalidRequest(message) | NavError::PayloadTooLarge(message) => {
                json!(message)
            }
            NavError::MalformedOutput(message) => json!({
                "error": "LLM response invalid",
                "message": message,
            }),
            NavError::Upstream(err) => json!({
                "error": "LLM request failed",
                "message": format!("{err:#}"),
            }),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
