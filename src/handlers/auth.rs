use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    AppState,
    auth::{dashboard_route, issue_token},
    error::ApiError,
    models::{
        CheckUserResponse, ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse,
        ResetPasswordRequest, roles,
    },
    validation::{sanitize, validate_email, validate_password},
};

/// CheckUserParams
///
/// Query parameters for GET /auth/check-user.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct CheckUserParams {
    pub email: Option<String>,
}

/// login
///
/// [Public Route] Verifies credentials and issues a session token.
///
/// Role rules: admins land on the admin dashboard; vertical heads must name
/// their vertical (checked case-insensitively against the stored one) and get
/// the per-vertical dashboard; every other role is refused.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Wrong vertical or role")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;

    let email = sanitize(&payload.email, 254);
    let vertical = payload.vertical.as_deref().map(|v| sanitize(v, 50));

    let user = state
        .repo
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let password_ok =
        bcrypt::verify(&payload.password, &user.password_hash).unwrap_or(false);
    if !password_ok {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let dashboard = match user.role.as_str() {
        roles::ADMIN => "/admin-dashboard".to_string(),
        roles::VERTICAL_HEAD => {
            let stored = user.vertical.clone().unwrap_or_default();
            let supplied = vertical.unwrap_or_default();
            if supplied.is_empty() || !supplied.eq_ignore_ascii_case(&stored) {
                return Err(ApiError::Forbidden(format!(
                    "Invalid vertical. You belong to {}",
                    stored
                )));
            }
            dashboard_route(roles::VERTICAL_HEAD, Some(&stored)).ok_or_else(|| {
                ApiError::Forbidden("No dashboard configured for your vertical".to_string())
            })?
        }
        _ => {
            return Err(ApiError::Forbidden(
                "You are not authorized to login".to_string(),
            ));
        }
    };

    let access_token = issue_token(&state.config, &user.email, &user.role, user.vertical.as_deref())?;

    Ok(Json(LoginResponse {
        access_token,
        role: user.role,
        vertical: user.vertical.unwrap_or_default(),
        dashboard,
    }))
}

/// check_user
///
/// [Public Route] Looks up the role and vertical for an email so the frontend
/// can pre-select the right login form.
#[utoipa::path(
    get,
    path = "/auth/check-user",
    params(CheckUserParams),
    responses(
        (status = 200, description = "Role and vertical", body = CheckUserResponse),
        (status = 404, description = "Unknown email")
    )
)]
pub async fn check_user(
    State(state): State<AppState>,
    Query(params): Query<CheckUserParams>,
) -> Result<Json<CheckUserResponse>, ApiError> {
    let email = params
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::Validation("Email not provided".to_string()))?;

    let user = state
        .repo
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(CheckUserResponse {
        role: user.role,
        vertical: user.vertical.unwrap_or_default(),
    }))
}

/// forgot_password
///
/// [Public Route] Stores a one-time reset token on the account and emails the
/// reset link. Delivery failure is logged but the response stays 200 so the
/// endpoint does not reveal whether mail went out.
#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset link sent", body = MessageResponse),
        (status = 404, description = "Unknown email")
    )
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = state
        .repo
        .find_user_by_email(&payload.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let reset_token = Uuid::new_v4().to_string();
    state.repo.set_reset_token(&user.email, &reset_token).await?;

    let reset_link = format!(
        "{}/reset-password/{}",
        state.config.frontend_base_url.trim_end_matches('/'),
        reset_token
    );
    let body = format!("Click this link to reset your password: {}", reset_link);

    if let Err(e) = state
        .mailer
        .send(&user.email, "Password Reset Request", &body)
        .await
    {
        tracing::warn!("failed to send reset email to {}: {}", user.email, e);
    }

    Ok(Json(MessageResponse {
        message: "Password reset link sent to your email".to_string(),
    }))
}

/// reset_password
///
/// [Public Route] Consumes a reset token: validates the new password, stores
/// its hash, and clears the token in the same statement (one-time use).
#[utoipa::path(
    post,
    path = "/auth/reset-password/{token}",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "Invalid or expired token")
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validate_password(&payload.password)?;

    let password_hash = bcrypt::hash(&payload.password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::Upstream(format!("password hashing failed: {}", e)))?;

    let updated = state.repo.reset_password(&token, &password_hash).await?;
    if updated == 0 {
        return Err(ApiError::Validation(
            "Invalid or expired token".to_string(),
        ));
    }

    Ok(Json(MessageResponse {
        message: "Password updated successfully".to_string(),
    }))
}
