//! Admin review endpoints. All routes here sit behind `require_admin`.

use axum::extract::{Path, State};
use axum::Json;
use reelgate_core::UploadResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::HttpAppError;
use crate::state::AppState;

/// How many reviewed uploads the queue view shows.
const PROCESSED_LIMIT: i64 = 50;

#[derive(Debug, Serialize)]
pub struct ReviewQueue {
    pub pending: Vec<UploadResponse>,
    pub processed: Vec<UploadResponse>,
}

/// GET /api/v0/admin/uploads
pub async fn review_queue(
    State(state): State<AppState>,
) -> Result<Json<ReviewQueue>, HttpAppError> {
    let pending = state.uploads.list_pending().await?;
    let processed = state.uploads.list_processed(PROCESSED_LIMIT).await?;

    Ok(Json(ReviewQueue {
        pending: pending.into_iter().map(Into::into).collect(),
        processed: processed.into_iter().map(Into::into).collect(),
    }))
}

/// POST /api/v0/admin/uploads/{id}/approve
pub async fn approve_upload(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let upload = state.review.approve(id).await?;
    Ok(Json(upload.into()))
}

#[derive(Debug, Default, Deserialize)]
pub struct DenyRequest {
    pub notes: Option<String>,
}

/// POST /api/v0/admin/uploads/{id}/deny
pub async fn deny_upload(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<DenyRequest>>,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let notes = body.and_then(|Json(req)| req.notes);
    let upload = state.review.deny(id, notes).await?;
    Ok(Json(upload.into()))
}
