use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::domains::analyzer::{ValidationError, ANALYSIS_FAILED_MESSAGE};

/// Errors returned by the JSON API. Messages are safe to show to visitors.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Session not found")]
    SessionNotFound,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("An analysis is already running")]
    Busy,

    #[error("{}", ANALYSIS_FAILED_MESSAGE)]
    AnalysisFailed,

    #[error("Session was closed")]
    SessionClosed,

    #[error("There is no analysis to copy")]
    NothingToCopy,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::SessionNotFound => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Busy | ApiError::NothingToCopy => StatusCode::CONFLICT,
            ApiError::AnalysisFailed => StatusCode::BAD_GATEWAY,
            ApiError::SessionClosed => StatusCode::GONE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
