//! Request-level error taxonomy and its HTTP mapping.
//!
//! Domain errors convert in via `#[from]`; the `IntoResponse` impl is
//! the single place status codes are decided. Bodies mirror the
//! `{"detail": ...}` shape clients already parse.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::llm::{LlmError, PromptError};
use crate::ppt::PptError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("checksum verification failed, file may be corrupted")]
    ChecksumMismatch,

    #[error("{0}")]
    BadRequest(String),

    #[error("no presentation found at {0}; upload one first")]
    NoPresentation(String),

    #[error("slide number {index} is out of range; the presentation has {count} slides")]
    SlideOutOfRange { index: usize, count: usize },

    #[error("no shape named {0:?} on the slide")]
    ShapeNotFound(String),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Ppt(#[from] PptError),

    #[error("failed to save the processed presentation: {0}")]
    Save(#[source] std::io::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::ChecksumMismatch
            | ApiError::BadRequest(_)
            | ApiError::SlideOutOfRange { .. }
            | ApiError::ShapeNotFound(_) => StatusCode::BAD_REQUEST,
            ApiError::NoPresentation(_) => StatusCode::NOT_FOUND,
            ApiError::Llm(_) => StatusCode::BAD_GATEWAY,
            ApiError::Prompt(_) | ApiError::Ppt(_) | ApiError::Save(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.to_string();
        if status.is_server_error() {
            log::error!("[HTTP] {} — {}", status, detail);
        } else {
            log::warn!("[HTTP] {} — {}", status, detail);
        }
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
