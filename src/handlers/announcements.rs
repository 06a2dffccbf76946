use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    error::ApiError,
    models::{
        AddAnnouncementRequest, Announcement, DeleteAnnouncementRequest, MessageResponse,
        UpdateAnnouncementRequest,
    },
};

/// add_announcement
///
/// [Admin Route] Publishes a new announcement.
#[utoipa::path(
    post,
    path = "/admin/add-announcement",
    request_body = AddAnnouncementRequest,
    responses((status = 201, description = "Announcement added", body = MessageResponse))
)]
pub async fn add_announcement(
    State(state): State<AppState>,
    Json(payload): Json<AddAnnouncementRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let name = payload
        .activity_name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::Validation("ActivityName is required".to_string()))?;
    let text = payload
        .activity_description
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ApiError::Validation("ActivityDescription is required".to_string()))?;

    state.repo.create_announcement(&name, &text).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Announcement added".to_string(),
        }),
    ))
}

/// update_announcement
///
/// [Admin Route] Renames/rewrites an announcement. The record is located by
/// its previous name, so the old name must be resolved before the new one
/// overwrites it.
#[utoipa::path(
    put,
    path = "/admin/update-announcement",
    request_body = UpdateAnnouncementRequest,
    responses(
        (status = 200, description = "Announcement updated", body = MessageResponse),
        (status = 404, description = "No announcement with that name")
    )
)]
pub async fn update_announcement(
    State(state): State<AppState>,
    Json(payload): Json<UpdateAnnouncementRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let old_name = payload
        .old_name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::Validation("oldName is required".to_string()))?;
    let new_name = payload
        .new_name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::Validation("newName is required".to_string()))?;
    let new_text = payload.new_text.unwrap_or_default();

    let updated = state
        .repo
        .update_announcement(&old_name, &new_name, &new_text)
        .await?;
    if updated == 0 {
        return Err(ApiError::NotFound(
            "No announcement updated. Check name.".to_string(),
        ));
    }

    Ok(Json(MessageResponse {
        message: "Announcement updated".to_string(),
    }))
}

/// delete_announcement
///
/// [Admin Route] Removes an announcement by name.
#[utoipa::path(
    delete,
    path = "/admin/delete-announcement",
    request_body = DeleteAnnouncementRequest,
    responses(
        (status = 200, description = "Announcement deleted", body = MessageResponse),
        (status = 404, description = "No announcement with that name")
    )
)]
pub async fn delete_announcement(
    State(state): State<AppState>,
    Json(payload): Json<DeleteAnnouncementRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let name = payload
        .activity
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::Validation("Activity is required".to_string()))?;

    let deleted = state.repo.delete_announcement(&name).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound(
            "No announcement deleted. Check name.".to_string(),
        ));
    }

    Ok(Json(MessageResponse {
        message: "Announcement deleted".to_string(),
    }))
}

/// get_announcements
///
/// [Public Route] Lists all announcements.
#[utoipa::path(
    get,
    path = "/admin/get-announcements",
    responses((status = 200, description = "All announcements", body = [Announcement]))
)]
pub async fn get_announcements(
    State(state): State<AppState>,
) -> Result<Json<Vec<Announcement>>, ApiError> {
    Ok(Json(state.repo.list_announcements().await?))
}
