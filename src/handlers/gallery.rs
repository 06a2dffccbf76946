use axum::{
    Json,
    extract::{Multipart, State},
};
use chrono::Utc;

use crate::{
    AppState,
    attachments::{UploadKind, secure_filename, unique_filename, validate_upload},
    error::ApiError,
    models::{
        DeleteGalleryPhotoRequest, GalleryPhoto, GalleryUploadResponse, MessageResponse,
        NewGalleryPhoto, NewReport, ReportsUploadResponse,
    },
};

/// upload_photos
///
/// [Admin Route] Multipart upload into the site-wide gallery. Screening and
/// skip semantics match the album upload; metadata is persisted alongside the
/// stored bytes.
#[utoipa::path(
    post,
    path = "/admin/upload-photos",
    responses(
        (status = 200, description = "Stored photos", body = GalleryUploadResponse),
        (status = 400, description = "No valid photos in the batch")
    )
)]
pub async fn upload_photos(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<GalleryUploadResponse>, ApiError> {
    let mut photo_list = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::Validation("No photos provided".to_string()))?
    {
        if field.name().unwrap_or_default() != "photos" {
            continue;
        }
        let Some(original) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|_| ApiError::Validation("No photos provided".to_string()))?;

        if validate_upload(&original, &content_type, bytes.len(), UploadKind::Image).is_err() {
            tracing::debug!("skipping rejected upload {}", original);
            continue;
        }
        let Some(secured) = secure_filename(&original) else {
            continue;
        };

        let stored = state
            .storage
            .store(&unique_filename(&secured), &bytes, &content_type)
            .await
            .map_err(|e| ApiError::Upstream(e.to_string()))?;

        photo_list.push(NewGalleryPhoto {
            filename: stored.public_id,
            url: stored.url,
            original_name: secured,
            uploaded_at: Utc::now(),
            mime_type: content_type,
        });
    }

    if photo_list.is_empty() {
        return Err(ApiError::Validation(
            "No valid photos uploaded".to_string(),
        ));
    }

    let photos = state.repo.add_gallery_photos(photo_list).await?;

    Ok(Json(GalleryUploadResponse {
        message: format!("Successfully uploaded {} photos", photos.len()),
        photos,
    }))
}

/// get_photos
///
/// [Public Route] All gallery photos, newest first.
#[utoipa::path(
    get,
    path = "/admin/get-photos",
    responses((status = 200, description = "Gallery photos", body = [GalleryPhoto]))
)]
pub async fn get_photos(
    State(state): State<AppState>,
) -> Result<Json<Vec<GalleryPhoto>>, ApiError> {
    Ok(Json(state.repo.list_gallery_photos().await?))
}

/// delete_photo
///
/// [Admin Route] Removes a gallery photo by stored filename: metadata first,
/// then the bytes best-effort.
#[utoipa::path(
    delete,
    path = "/admin/delete-photo",
    request_body = DeleteGalleryPhotoRequest,
    responses(
        (status = 200, description = "Photo deleted", body = MessageResponse),
        (status = 404, description = "Unknown filename")
    )
)]
pub async fn delete_photo(
    State(state): State<AppState>,
    Json(payload): Json<DeleteGalleryPhotoRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let filename = payload
        .filename
        .filter(|f| !f.is_empty())
        .ok_or_else(|| ApiError::Validation("Filename required".to_string()))?;

    let photo = state
        .repo
        .remove_gallery_photo(&filename)
        .await?
        .ok_or_else(|| ApiError::NotFound("Photo not found".to_string()))?;

    if let Err(e) = state.storage.remove(&photo.filename).await {
        tracing::warn!("failed to remove stored object {}: {}", photo.filename, e);
    }

    Ok(Json(MessageResponse {
        message: "Photo deleted successfully".to_string(),
    }))
}

/// upload_reports
///
/// [Admin Route] Multipart document upload. The stored references are
/// returned to the client, which attaches them to an activity on creation;
/// nothing is persisted here.
#[utoipa::path(
    post,
    path = "/admin/upload-reports",
    responses(
        (status = 200, description = "Stored reports", body = ReportsUploadResponse),
        (status = 400, description = "No valid reports in the batch")
    )
)]
pub async fn upload_reports(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ReportsUploadResponse>, ApiError> {
    let mut report_list = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::Validation("No reports provided".to_string()))?
    {
        if field.name().unwrap_or_default() != "reports" {
            continue;
        }
        let Some(original) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|_| ApiError::Validation("No reports provided".to_string()))?;

        if validate_upload(&original, &content_type, bytes.len(), UploadKind::Document).is_err() {
            tracing::debug!("skipping rejected upload {}", original);
            continue;
        }
        let Some(secured) = secure_filename(&original) else {
            continue;
        };

        let stored = state
            .storage
            .store(&unique_filename(&secured), &bytes, &content_type)
            .await
            .map_err(|e| ApiError::Upstream(e.to_string()))?;

        report_list.push(NewReport {
            url: stored.url,
            public_id: stored.public_id,
            original_name: original,
            uploaded_at: Some(Utc::now()),
            mime_type: content_type,
        });
    }

    if report_list.is_empty() {
        return Err(ApiError::Validation(
            "No valid reports uploaded".to_string(),
        ));
    }

    Ok(Json(ReportsUploadResponse {
        message: format!("Successfully uploaded {} reports", report_list.len()),
        reports: report_list,
    }))
}
