use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    AppState,
    attachments::secure_filename,
    error::ApiError,
    models::{
        Activity, ActivityPatch, AddActivityRequest, DeleteActivityRequest, NewActivity,
        UpdateActivityRequest,
    },
    storage::remove_all,
    validation::{ValidationError, validate_activity},
};

/// Activity listings default to the three most recent when capped.
const DEFAULT_LATEST_LIMIT: i64 = 3;

/// LatestParams
#[derive(Deserialize, utoipa::IntoParams)]
pub struct LatestParams {
    pub limit: Option<i64>,
}

/// DownloadParams
///
/// Query parameters for the report-download proxy.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct DownloadParams {
    pub url: Option<String>,
    pub filename: Option<String>,
}

/// get_activities
///
/// [Public Route] All activities, most recent date first.
#[utoipa::path(
    get,
    path = "/api/activities",
    responses((status = 200, description = "All activities", body = [Activity]))
)]
pub async fn get_activities(State(state): State<AppState>) -> Result<Json<Vec<Activity>>, ApiError> {
    Ok(Json(state.repo.list_activities().await?))
}

/// get_latest_activities
///
/// [Public Route] The ordered listing capped at `limit` (default 3).
#[utoipa::path(
    get,
    path = "/api/activities/latest",
    params(LatestParams),
    responses((status = 200, description = "Latest activities", body = [Activity]))
)]
pub async fn get_latest_activities(
    State(state): State<AppState>,
    Query(params): Query<LatestParams>,
) -> Result<Json<Vec<Activity>>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_LATEST_LIMIT).max(0);
    Ok(Json(state.repo.latest_activities(limit).await?))
}

/// get_activity
///
/// [Public Route] A single activity by its stable id.
#[utoipa::path(
    get,
    path = "/api/activities/{id}",
    params(("id" = Uuid, Path, description = "Activity ID")),
    responses(
        (status = 200, description = "Found", body = Activity),
        (status = 404, description = "Unknown id")
    )
)]
pub async fn get_activity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Activity>, ApiError> {
    state
        .repo
        .get_activity(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Activity not found".to_string()))
}

/// create_activity
///
/// [Admin Route] Creates an activity. The raw payload goes through the
/// validation layer first (required fields in order, then domain checks), so
/// the error messages match what the frontend expects; only then is it
/// deserialized into the typed request.
#[utoipa::path(
    post,
    path = "/admin/add-activity",
    request_body = AddActivityRequest,
    responses(
        (status = 201, description = "Activity created"),
        (status = 400, description = "Validation failure")
    )
)]
pub async fn create_activity(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    validate_activity(&payload)?;

    let request: AddActivityRequest = serde_json::from_value(payload)
        .map_err(|_| ApiError::Validation("Invalid request data".to_string()))?;

    let date = NaiveDate::parse_from_str(&request.date, "%Y-%m-%d")
        .map_err(|_| ApiError::from(ValidationError::InvalidDate))?;

    let activity = state
        .repo
        .create_activity(NewActivity {
            title: request.title,
            description: request.description,
            date,
            location: request
                .location
                .unwrap_or_else(|| "SSN Campus".to_string()),
            status: request.status.unwrap_or_else(|| "upcoming".to_string()),
            photos: request.photos.unwrap_or_default(),
            reports: request.reports.unwrap_or_default(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Activity added successfully",
            "activity_id": activity.id,
            "activity": activity,
        })),
    ))
}

/// update_activity
///
/// [Admin Route] Partial update. The title is the primary address; the id
/// path exists for legacy clients and is tried only when no title was
/// supplied.
#[utoipa::path(
    put,
    path = "/admin/update-activity",
    request_body = UpdateActivityRequest,
    responses(
        (status = 200, description = "Activity updated"),
        (status = 404, description = "Nothing matched"),
        (status = 400, description = "Neither oldTitle nor id supplied")
    )
)]
pub async fn update_activity(
    State(state): State<AppState>,
    Json(payload): Json<UpdateActivityRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut patch = ActivityPatch {
        title: payload.new_title.filter(|t| !t.is_empty()),
        description: payload.new_description.filter(|d| !d.is_empty()),
        date: None,
        location: payload.new_location.filter(|l| !l.is_empty()),
        status: payload.new_status.filter(|s| !s.is_empty()),
    };
    if let Some(new_date) = payload.new_date.filter(|d| !d.is_empty()) {
        let date = NaiveDate::parse_from_str(&new_date, "%Y-%m-%d")
            .map_err(|_| ApiError::from(ValidationError::InvalidDate))?;
        patch.date = Some(date);
    }

    if let Some(old_title) = payload.old_title.filter(|t| !t.is_empty()) {
        let updated = state
            .repo
            .update_activity_by_title(&old_title, patch)
            .await?;
        if updated == 0 {
            return Err(ApiError::NotFound(
                "No activity found with that title".to_string(),
            ));
        }
        return Ok(Json(json!({"message": "Activity updated successfully"})));
    }

    // Legacy id path, only when no title was supplied.
    if let Some(id) = payload.id.filter(|id| !id.is_empty()) {
        let id = Uuid::parse_str(&id)
            .map_err(|_| ApiError::Validation("Invalid id format".to_string()))?;
        let updated = state.repo.update_activity_by_id(id, patch).await?;
        if updated == 0 {
            return Err(ApiError::NotFound(
                "No activity updated. Check ID.".to_string(),
            ));
        }
        return Ok(Json(json!({"message": "Activity updated"})));
    }

    Err(ApiError::Validation(
        "Provide either oldTitle or id to update activity".to_string(),
    ))
}

/// delete_activity
///
/// [Admin Route] Deletes an activity and its owned attachments. The stored
/// bytes are removed best-effort before the record goes; storage failures are
/// logged and never block the delete.
#[utoipa::path(
    delete,
    path = "/admin/delete-activity",
    request_body = DeleteActivityRequest,
    responses(
        (status = 200, description = "Activity deleted"),
        (status = 404, description = "Nothing matched"),
        (status = 400, description = "Neither title nor id supplied")
    )
)]
pub async fn delete_activity(
    State(state): State<AppState>,
    Json(payload): Json<DeleteActivityRequest>,
) -> Result<Json<Value>, ApiError> {
    let (activity, message) = if let Some(title) = payload.title.filter(|t| !t.is_empty()) {
        let activity = state
            .repo
            .find_activity_by_title(&title)
            .await?
            .ok_or_else(|| ApiError::NotFound("No activity found with that title".to_string()))?;
        (activity, "Activity deleted successfully")
    } else if let Some(id) = payload.id.filter(|id| !id.is_empty()) {
        let id = Uuid::parse_str(&id)
            .map_err(|_| ApiError::Validation("Invalid id format".to_string()))?;
        let activity = state
            .repo
            .get_activity(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("No activity deleted. Check ID.".to_string()))?;
        (activity, "Activity deleted")
    } else {
        return Err(ApiError::Validation(
            "Provide either title or id to delete activity".to_string(),
        ));
    };

    let identifiers: Vec<String> = activity
        .photos
        .iter()
        .map(|p| p.filename.clone())
        .chain(activity.reports.iter().map(|r| r.public_id.clone()))
        .collect();
    let outcome = remove_all(state.storage.as_ref(), identifiers).await;
    if !outcome.is_clean() {
        tracing::warn!(
            "activity {} deleted with {} orphaned stored objects: {:?}",
            activity.id,
            outcome.failed.len(),
            outcome.failed
        );
    }

    state.repo.delete_activity(activity.id).await?;

    Ok(Json(json!({"message": message})))
}

/// admin_get_activities
///
/// [Admin Route] The moderation view of the activity list.
#[utoipa::path(
    get,
    path = "/admin/get-activities",
    responses((status = 200, description = "All activities", body = [Activity]))
)]
pub async fn admin_get_activities(
    State(state): State<AppState>,
) -> Result<Json<Vec<Activity>>, ApiError> {
    Ok(Json(state.repo.list_activities().await?))
}

/// clear_activities
///
/// [Admin Route] Maintenance endpoint: deletes every activity, removing the
/// owned attachments from storage first.
#[utoipa::path(
    delete,
    path = "/admin/clear-activities",
    responses((status = 200, description = "All activities deleted"))
)]
pub async fn clear_activities(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let activities = state.repo.list_activities().await?;
    let identifiers: Vec<String> = activities
        .iter()
        .flat_map(|a| {
            a.photos
                .iter()
                .map(|p| p.filename.clone())
                .chain(a.reports.iter().map(|r| r.public_id.clone()))
                .collect::<Vec<_>>()
        })
        .collect();
    let outcome = remove_all(state.storage.as_ref(), identifiers).await;
    if !outcome.is_clean() {
        tracing::warn!(
            "clear-activities left {} orphaned stored objects: {:?}",
            outcome.failed.len(),
            outcome.failed
        );
    }

    let deleted = state.repo.clear_activities().await?;

    Ok(Json(json!({
        "message": "All activities deleted",
        "deletedCount": deleted,
    })))
}

/// download_report
///
/// [Admin Route] Fetches a stored report from its URL and relays it with an
/// attachment disposition, so the browser downloads instead of navigating.
#[utoipa::path(
    get,
    path = "/api/download-report",
    params(DownloadParams),
    responses(
        (status = 200, description = "File bytes"),
        (status = 400, description = "Missing url or filename")
    )
)]
pub async fn download_report(
    Query(params): Query<DownloadParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(url), Some(filename)) = (params.url, params.filename) else {
        return Err(ApiError::Validation("Invalid request".to_string()));
    };

    let response = reqwest::get(&url)
        .await
        .map_err(|e| ApiError::Upstream(format!("report fetch failed: {}", e)))?;
    if !response.status().is_success() {
        return Err(ApiError::Upstream(format!(
            "report fetch answered {}",
            response.status()
        )));
    }

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
        .to_string();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ApiError::Upstream(format!("report fetch failed: {}", e)))?;

    let safe_name = secure_filename(&filename).unwrap_or_else(|| "report".to_string());
    let disposition = format!("attachment; filename=\"{}\"", safe_name);

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
