use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::error::ApiError;
use crate::common::SessionId;
use crate::domains::analyzer::{SubmitOutcome, WidgetView};
use crate::kernel::CapturedClipboard;
use crate::server::app::AppState;
use crate::server::sessions::Session;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: SessionId,
    pub view: WidgetView,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyResponse {
    /// Text for the browser to place on the clipboard
    pub text: String,
    pub view: WidgetView,
}

async fn find_session(state: &AppState, id: &str) -> Result<Arc<Session>, ApiError> {
    let id: SessionId = id.parse().map_err(|_| ApiError::SessionNotFound)?;
    state
        .sessions
        .get(&id)
        .await
        .ok_or(ApiError::SessionNotFound)
}

/// POST /api/sessions
pub async fn create_session(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<SessionResponse>) {
    let session = state.sessions.create().await;
    info!(session_id = %session.id, "Visitor session created");

    (
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id: session.id,
            view: session.widget.view().await,
        }),
    )
}

/// GET /api/sessions/:id
pub async fn get_session(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WidgetView>, ApiError> {
    let session = find_session(&state, &id).await?;
    Ok(Json(session.widget.view().await))
}

/// POST /api/sessions/:id/analyze
pub async fn analyze(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<WidgetView>, ApiError> {
    let session = find_session(&state, &id).await?;
    let widget = &session.widget;

    match widget
        .submit_with(request.business_name, request.location)
        .await
    {
        SubmitOutcome::Completed(_) => Ok(Json(widget.view().await)),
        SubmitOutcome::Rejected(e) => Err(e.into()),
        SubmitOutcome::Busy => Err(ApiError::Busy),
        SubmitOutcome::Failed => Err(ApiError::AnalysisFailed),
        SubmitOutcome::Cancelled => Err(ApiError::SessionClosed),
    }
}

/// POST /api/sessions/:id/copy
pub async fn copy_result(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CopyResponse>, ApiError> {
    let session = find_session(&state, &id).await?;
    let clipboard = CapturedClipboard::new();

    if !session.widget.copy_result(&clipboard).await {
        return Err(ApiError::NothingToCopy);
    }

    let text = clipboard.into_text().ok_or(ApiError::NothingToCopy)?;
    Ok(Json(CopyResponse {
        text,
        view: session.widget.view().await,
    }))
}

/// DELETE /api/sessions/:id
pub async fn delete_session(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: SessionId = id.parse().map_err(|_| ApiError::SessionNotFound)?;
    if state.sessions.remove(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::SessionNotFound)
    }
}
