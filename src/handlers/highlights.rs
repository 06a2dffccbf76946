use axum::{Json, extract::State};
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiError,
    models::{
        AddHighlightRequest, DeleteHighlightRequest, Highlight, MessageResponse,
        UpdateHighlightRequest,
    },
};

/// get_highlights
///
/// [Public Route] Lists the trending highlights.
#[utoipa::path(
    get,
    path = "/admin/get-trending",
    responses((status = 200, description = "All highlights", body = [Highlight]))
)]
pub async fn get_highlights(
    State(state): State<AppState>,
) -> Result<Json<Vec<Highlight>>, ApiError> {
    Ok(Json(state.repo.list_highlights().await?))
}

/// add_highlight
///
/// [Admin Route] Publishes a new trending highlight.
#[utoipa::path(
    post,
    path = "/admin/add-trending",
    request_body = AddHighlightRequest,
    responses((status = 200, description = "Highlight added", body = MessageResponse))
)]
pub async fn add_highlight(
    State(state): State<AppState>,
    Json(payload): Json<AddHighlightRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let title = payload
        .title
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Validation("title is required".to_string()))?;
    let description = payload
        .description
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ApiError::Validation("description is required".to_string()))?;

    state.repo.create_highlight(&title, &description).await?;

    Ok(Json(MessageResponse {
        message: "Highlight added".to_string(),
    }))
}

/// update_highlight
///
/// [Admin Route] Rewrites a highlight located by its previous title. When the
/// exact title matches nothing, the repository retries with an anchored
/// case-insensitive match, so a client that lowercased the title still finds
/// the record.
#[utoipa::path(
    put,
    path = "/admin/update-trending",
    request_body = UpdateHighlightRequest,
    responses(
        (status = 200, description = "Highlight updated", body = MessageResponse),
        (status = 404, description = "No highlight with that title")
    )
)]
pub async fn update_highlight(
    State(state): State<AppState>,
    Json(payload): Json<UpdateHighlightRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let old_title = payload
        .old_title
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Validation("oldTitle is required".to_string()))?;
    let new_title = payload
        .new_title
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Validation("newTitle is required".to_string()))?;
    let new_description = payload.new_description.unwrap_or_default();

    let updated = state
        .repo
        .update_highlight(&old_title, &new_title, &new_description)
        .await?;
    if updated == 0 {
        return Err(ApiError::NotFound(
            "No highlight updated. Check old title .".to_string(),
        ));
    }

    Ok(Json(MessageResponse {
        message: "Highlight updated".to_string(),
    }))
}

/// delete_highlight
///
/// [Admin Route] Deletes a highlight. An explicit id takes precedence (legacy
/// clients captured it); otherwise the title path applies, with the same
/// case-insensitive fallback as updates.
#[utoipa::path(
    delete,
    path = "/admin/delete-trending",
    request_body = DeleteHighlightRequest,
    responses(
        (status = 200, description = "Highlight deleted", body = MessageResponse),
        (status = 404, description = "Nothing matched")
    )
)]
pub async fn delete_highlight(
    State(state): State<AppState>,
    Json(payload): Json<DeleteHighlightRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if let Some(id) = payload.id.filter(|id| !id.is_empty()) {
        let id = Uuid::parse_str(&id)
            .map_err(|_| ApiError::Validation("Invalid id format".to_string()))?;
        let deleted = state.repo.delete_highlight_by_id(id).await?;
        if deleted == 0 {
            return Err(ApiError::NotFound(
                "No highlight deleted. Check id.".to_string(),
            ));
        }
        return Ok(Json(MessageResponse {
            message: "Highlight deleted".to_string(),
        }));
    }

    let title = payload
        .title
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Validation("id or title is required".to_string()))?;

    let deleted = state.repo.delete_highlight_by_title(&title).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound(
            "No highlight deleted. Check title .".to_string(),
        ));
    }

    Ok(Json(MessageResponse {
        message: "Highlight deleted".to_string(),
    }))
}

/// delete_highlight_by_id
///
/// [Admin Route] Explicit id-only deletion endpoint.
#[utoipa::path(
    delete,
    path = "/admin/delete-trending-by-id",
    request_body = DeleteHighlightRequest,
    responses(
        (status = 200, description = "Highlight deleted", body = MessageResponse),
        (status = 400, description = "Missing or malformed id"),
        (status = 404, description = "Nothing matched")
    )
)]
pub async fn delete_highlight_by_id(
    State(state): State<AppState>,
    Json(payload): Json<DeleteHighlightRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = payload
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::Validation("id is required".to_string()))?;
    let id =
        Uuid::parse_str(&id).map_err(|_| ApiError::Validation("Invalid id format".to_string()))?;

    let deleted = state.repo.delete_highlight_by_id(id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound(
            "No highlight deleted. Check id.".to_string(),
        ));
    }

    Ok(Json(MessageResponse {
        message: "Highlight deleted".to_string(),
    }))
}
