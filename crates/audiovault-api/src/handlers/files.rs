use crate::auth::models::UserContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::{IngestedFile, UploadRequest};
use crate::state::AppState;
use crate::utils::upload::sanitize_filename;
use audiovault_core::models::{AudioCategory, AudioFileOut};
use audiovault_core::AppError;
use axum::{
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
    Json,
};
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::io::StreamReader;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Form fields may also be passed as query parameters.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct UploadQuery {
    pub description: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DetailResponse {
    pub detail: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlaybackResponse {
    /// Time-limited URL the audio can be streamed from
    pub file_path: String,
}

struct ReceivedFile {
    file: IngestedFile,
    filename: String,
    content_type: String,
}

fn multipart_error(e: impl std::fmt::Display) -> AppError {
    AppError::BadRequest(format!("Failed to read multipart data: {}", e))
}

#[utoipa::path(
    post,
    path = "/files/upload",
    tag = "files",
    params(UploadQuery),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Upload accepted, materialization pending", body = AudioFileOut),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 409, description = "Duplicate content or description", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Content type not allowed", body = ErrorResponse),
        (status = 503, description = "Upload queue full", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, query, multipart),
    fields(user_id = %user.user_id, operation = "upload_audio")
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let service = &state.media.upload_service;
    let mut description = query.description;
    let mut category = query.category;
    let mut received: Option<ReceivedFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "description" => description = Some(field.text().await.map_err(multipart_error)?),
            "category" => category = Some(field.text().await.map_err(multipart_error)?),
            "file" => {
                if received.is_some() {
                    return Err(AppError::BadRequest(
                        "Only one file may be uploaded per request".to_string(),
                    )
                    .into());
                }
                let filename = sanitize_filename(field.file_name().unwrap_or_default());
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();

                let reader = std::pin::pin!(StreamReader::new(
                    field.map_err(std::io::Error::other)
                ));
                let file = service.receive(&content_type, &filename, reader).await?;
                received = Some(ReceivedFile {
                    file,
                    filename,
                    content_type,
                });
            }
            _ => {}
        }
    }

    // Dropping `received` on any early return below removes the scratch file.
    let received =
        received.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;
    let description = description
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput("Description is required".to_string()))?;
    let category = category
        .ok_or_else(|| AppError::InvalidInput("Category is required".to_string()))?
        .parse::<AudioCategory>()
        .map_err(AppError::InvalidInput)?;

    let record = service
        .submit(UploadRequest {
            user_id: user.user_id,
            description,
            category,
            filename: received.filename,
            content_type: received.content_type,
            file: received.file,
        })
        .await?;

    Ok(Json(AudioFileOut::from(record)))
}

#[utoipa::path(
    get,
    path = "/files/upload-status/{id}",
    tag = "files",
    params(("id" = Uuid, Path, description = "Upload record ID")),
    responses(
        (status = 200, description = "Current record state", body = AudioFileOut),
        (status = 404, description = "Upload record not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %user.user_id, upload_id = %id, operation = "upload_status"))]
pub async fn upload_status(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let record = state
        .db
        .uploads
        .get_for_user(user.user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Upload record not found".to_string()))?;

    Ok(Json(AudioFileOut::from(record)))
}

#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    responses(
        (status = 200, description = "Caller's audio files, newest first", body = Vec<AudioFileOut>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %user.user_id, operation = "list_files"))]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    user: UserContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let records = state.db.uploads.list_for_user(user.user_id).await?;
    let files: Vec<AudioFileOut> = records.into_iter().map(AudioFileOut::from).collect();
    Ok(Json(files))
}

#[utoipa::path(
    delete,
    path = "/files/{id}",
    tag = "files",
    params(("id" = Uuid, Path, description = "Audio file ID")),
    responses(
        (status = 200, description = "Audio file deleted", body = DetailResponse),
        (status = 404, description = "Audio file not found or not authorized", body = ErrorResponse),
        (status = 500, description = "Storage deletion failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %user.user_id, upload_id = %id, operation = "delete_file"))]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let record = state
        .db
        .uploads
        .get_for_user(user.user_id, id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("Audio file not found or not authorized".to_string())
        })?;

    if let Some(key) = record.storage_key.as_deref() {
        state.media.storage.delete(key).await?;
    }

    if !state.db.uploads.delete_for_user(user.user_id, id).await? {
        return Err(
            AppError::NotFound("Audio file not found or not authorized".to_string()).into(),
        );
    }

    tracing::info!(upload_id = %id, "Audio file deleted");
    Ok(Json(DetailResponse {
        detail: "Audio file deleted".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/files/{id}/playback",
    tag = "files",
    params(("id" = Uuid, Path, description = "Audio file ID")),
    responses(
        (status = 200, description = "Pre-signed playback URL", body = PlaybackResponse),
        (status = 404, description = "Audio file not found or not authorized", body = ErrorResponse),
        (status = 409, description = "Upload has not completed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %user.user_id, upload_id = %id, operation = "playback"))]
pub async fn playback_file(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let record = state
        .db
        .uploads
        .get_for_user(user.user_id, id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("Audio file not found or not authorized".to_string())
        })?;

    let key = match (record.is_completed(), record.storage_key.as_deref()) {
        (true, Some(key)) => key,
        _ => {
            return Err(AppError::Conflict(format!(
                "Audio file is not available for playback (status: {})",
                record.upload_status
            ))
            .into())
        }
    };

    let url = state
        .media
        .storage
        .presigned_get_url(key, state.media.playback_url_ttl)
        .await?;

    Ok(Json(PlaybackResponse { file_path: url }))
}
