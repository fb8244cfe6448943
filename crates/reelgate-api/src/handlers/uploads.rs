//! Public upload endpoints.

use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use reelgate_core::{AppError, UploadResponse};
use uuid::Uuid;

use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::{extract_upload_form, uploader_identity};

/// POST /api/v0/uploads
///
/// Multipart form with a `file` field and a `media_type` field
/// ("movie" or "series").
pub async fn submit_upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let (data, filename, media_type) = extract_upload_form(multipart).await?;
    let uploader = uploader_identity(&headers);

    let upload = state
        .review
        .submit(&filename, media_type, &uploader, &data)
        .await?;

    Ok((StatusCode::CREATED, Json(UploadResponse::from(upload))))
}

/// GET /api/v0/uploads/{id}
pub async fn get_upload(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let upload = state
        .uploads
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Upload {} not found", id)))?;

    Ok(Json(upload.into()))
}

/// GET /api/v0/my-uploads
///
/// History for the caller, keyed by the same identity headers the submit
/// endpoint records.
pub async fn my_uploads(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<UploadResponse>>, HttpAppError> {
    let uploader = uploader_identity(&headers);
    let uploads = state.uploads.list_by_uploader(&uploader).await?;

    Ok(Json(uploads.into_iter().map(Into::into).collect()))
}
