use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use uuid::Uuid;

use crate::{
    AppState,
    attachments::{UploadKind, secure_filename, unique_filename, validate_upload},
    error::ApiError,
    models::{
        AlbumsResponse, CreateAlbumRequest, MessageResponse, NewPhoto, UploadPhotosResponse,
    },
    storage::remove_all,
};

/// get_albums
///
/// [Public Route] Album names plus a name-to-photos map, the shape the
/// gallery page renders from.
#[utoipa::path(
    get,
    path = "/api/albums",
    responses((status = 200, description = "Albums with photos", body = AlbumsResponse))
)]
pub async fn get_albums(State(state): State<AppState>) -> Result<Json<AlbumsResponse>, ApiError> {
    let albums = state.repo.list_albums().await?;
    let mut response = AlbumsResponse::default();
    for album in albums {
        response.albums.push(album.name.clone());
        response.photos.insert(album.name, album.photos);
    }
    Ok(Json(response))
}

/// create_album
///
/// [Public Route] Creates an empty album. Album names are unique.
#[utoipa::path(
    post,
    path = "/api/albums",
    request_body = CreateAlbumRequest,
    responses(
        (status = 200, description = "Album created", body = MessageResponse),
        (status = 400, description = "Duplicate name")
    )
)]
pub async fn create_album(
    State(state): State<AppState>,
    Json(payload): Json<CreateAlbumRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let name = payload
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::Validation("Album name is required".to_string()))?;

    if state.repo.get_album(&name).await?.is_some() {
        return Err(ApiError::Conflict("Album already exists".to_string()));
    }
    state.repo.create_album(&name).await?;

    Ok(Json(MessageResponse {
        message: "Album created".to_string(),
    }))
}

/// delete_album
///
/// [Public Route] Deletes an album and every photo it owns. The stored bytes
/// are removed best-effort first; a storage failure is logged and never
/// blocks removal of the album record.
#[utoipa::path(
    delete,
    path = "/api/albums/{name}",
    params(("name" = String, Path, description = "Album name")),
    responses(
        (status = 200, description = "Album deleted", body = MessageResponse),
        (status = 404, description = "Unknown album")
    )
)]
pub async fn delete_album(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let album = state
        .repo
        .get_album(&name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Album not found".to_string()))?;

    let identifiers: Vec<String> = album.photos.iter().map(|p| p.filename.clone()).collect();
    let outcome = remove_all(state.storage.as_ref(), identifiers).await;
    if !outcome.is_clean() {
        tracing::warn!(
            "album {} deleted with {} orphaned stored objects: {:?}",
            album.name,
            outcome.failed.len(),
            outcome.failed
        );
    }

    state.repo.delete_album(album.id).await?;

    Ok(Json(MessageResponse {
        message: "Album deleted".to_string(),
    }))
}

/// upload_photos
///
/// [Public Route] Multipart photo upload into an album. Files failing the
/// extension/MIME/size screen are skipped silently; the response reports only
/// the stored photos. A batch with no valid file at all is a 400.
#[utoipa::path(
    post,
    path = "/api/albums/{name}/photos",
    params(("name" = String, Path, description = "Album name")),
    responses(
        (status = 200, description = "Stored photos", body = UploadPhotosResponse),
        (status = 400, description = "No valid photos in the batch"),
        (status = 404, description = "Unknown album")
    )
)]
pub async fn upload_photos(
    State(state): State<AppState>,
    Path(name): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<UploadPhotosResponse>, ApiError> {
    let album = state
        .repo
        .get_album(&name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Album not found".to_string()))?;

    let mut photo_list = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::Validation("No photos uploaded".to_string()))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        if field_name != "photos" && field_name != "photo" {
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
            .map_err(|_| ApiError::Validation("No photos uploaded".to_string()))?;

        // Invalid files are skipped, not fatal: the batch succeeds if any
        // file survives the screen.
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

        photo_list.push(NewPhoto {
            filename: stored.public_id,
            url: stored.url,
            original_name: Some(original),
        });
    }

    if photo_list.is_empty() {
        return Err(ApiError::Validation(
            "No valid photos provided".to_string(),
        ));
    }

    let uploaded_photos = state.repo.add_album_photos(album.id, photo_list).await?;

    Ok(Json(UploadPhotosResponse {
        message: "Photos uploaded".to_string(),
        uploaded_photos,
    }))
}

/// delete_photo
///
/// [Public Route] Removes one photo by its stable id. The conditional delete
/// pulls the matching element wherever it currently sits in the sequence, so
/// concurrent removals cannot strike the wrong photo.
#[utoipa::path(
    delete,
    path = "/api/albums/{name}/photos/{photo_id}",
    params(
        ("name" = String, Path, description = "Album name"),
        ("photo_id" = Uuid, Path, description = "Photo ID")
    ),
    responses(
        (status = 200, description = "Photo deleted", body = MessageResponse),
        (status = 404, description = "Unknown album or photo")
    )
)]
pub async fn delete_photo(
    State(state): State<AppState>,
    Path((name, photo_id)): Path<(String, Uuid)>,
) -> Result<Json<MessageResponse>, ApiError> {
    let album = state
        .repo
        .get_album(&name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Album not found".to_string()))?;

    let photo = state
        .repo
        .remove_album_photo(album.id, photo_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Photo not found".to_string()))?;

    if let Err(e) = state.storage.remove(&photo.filename).await {
        tracing::warn!("failed to remove stored object {}: {}", photo.filename, e);
    }

    Ok(Json(MessageResponse {
        message: "Photo deleted".to_string(),
    }))
}
