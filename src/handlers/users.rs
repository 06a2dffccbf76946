use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    error::ApiError,
    models::{
        AddUserRequest, DeleteUserRequest, MessageResponse, NewUser, UpdateUserRequest,
        UserUpdate, UserView, roles,
    },
    validation::{validate_email, validate_password, validate_role, validate_vertical},
};

/// add_user
///
/// [Admin Route] Creates an account. Only the salted hash of the password is
/// stored. A `verticalhead` cannot be created without a vertical.
#[utoipa::path(
    post,
    path = "/admin/add-user",
    request_body = AddUserRequest,
    responses(
        (status = 201, description = "User created", body = MessageResponse),
        (status = 400, description = "Invalid fields or duplicate email")
    )
)]
pub async fn add_user(
    State(state): State<AppState>,
    Json(payload): Json<AddUserRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let (Some(email), Some(password), Some(role)) =
        (payload.email, payload.password, payload.role)
    else {
        return Err(ApiError::Validation("Missing required fields.".to_string()));
    };
    if email.is_empty() || password.is_empty() || role.is_empty() {
        return Err(ApiError::Validation("Missing required fields.".to_string()));
    }

    validate_email(&email)?;
    validate_password(&password)?;
    validate_role(&role)?;

    // The vertical-head invariant: the vertical is required for that role and
    // ignored for every other.
    let vertical = if role == roles::VERTICAL_HEAD {
        let vertical = payload.vertical.filter(|v| !v.is_empty()).ok_or_else(|| {
            ApiError::Validation("Vertical name is required for vertical head.".to_string())
        })?;
        validate_vertical(&vertical)?;
        Some(vertical)
    } else {
        None
    };

    if state.repo.find_user_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict("User already exists".to_string()));
    }

    let password_hash = bcrypt::hash(&password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::Upstream(format!("password hashing failed: {}", e)))?;

    state
        .repo
        .create_user(NewUser {
            email: email.clone(),
            password_hash,
            role,
            vertical,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!("User {} added", email),
        }),
    ))
}

/// update_user
///
/// [Admin Route] Partial update addressed by the user's current email.
/// A role transition into `verticalhead` requires a vertical; a transition
/// out of it clears the stored vertical.
#[utoipa::path(
    put,
    path = "/admin/update-user",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = MessageResponse),
        (status = 404, description = "Unknown email")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let existing_email = payload
        .existing_email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::Validation("existingEmail is required".to_string()))?;

    if state
        .repo
        .find_user_by_email(&existing_email)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    let mut patch = UserUpdate::default();

    if let Some(new_email) = payload.new_email.filter(|e| !e.is_empty()) {
        validate_email(&new_email)?;
        patch.email = Some(new_email);
    }
    if let Some(new_password) = payload.new_password.filter(|p| !p.is_empty()) {
        validate_password(&new_password)?;
        let hash = bcrypt::hash(&new_password, bcrypt::DEFAULT_COST)
            .map_err(|e| ApiError::Upstream(format!("password hashing failed: {}", e)))?;
        patch.password_hash = Some(hash);
    }
    if let Some(new_role) = payload.new_role.filter(|r| !r.is_empty()) {
        validate_role(&new_role)?;
        if new_role == roles::VERTICAL_HEAD {
            let new_vertical = payload
                .new_vertical
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    ApiError::Validation(
                        "Vertical name is required for vertical head.".to_string(),
                    )
                })?;
            validate_vertical(&new_vertical)?;
            patch.vertical = Some(Some(new_vertical));
        } else {
            // No longer a vertical head: drop the stale vertical.
            patch.vertical = Some(None);
        }
        patch.role = Some(new_role);
    }

    state.repo.update_user(&existing_email, patch).await?;

    Ok(Json(MessageResponse {
        message: "User updated".to_string(),
    }))
}

/// delete_user
///
/// [Admin Route] Removes an account by email.
#[utoipa::path(
    delete,
    path = "/admin/delete-user",
    request_body = DeleteUserRequest,
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 404, description = "Unknown email")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Json(payload): Json<DeleteUserRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email = payload
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::Validation("email is required".to_string()))?;

    let deleted = state.repo.delete_user(&email).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(Json(MessageResponse {
        message: "User deleted".to_string(),
    }))
}

/// get_users
///
/// [Admin Route] Lists all accounts. The projection excludes the password
/// hash and reset token.
#[utoipa::path(
    get,
    path = "/admin/get-users",
    responses((status = 200, description = "All users", body = [UserView]))
)]
pub async fn get_users(State(state): State<AppState>) -> Result<Json<Vec<UserView>>, ApiError> {
    Ok(Json(state.repo.list_users().await?))
}
