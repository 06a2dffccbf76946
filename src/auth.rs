use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{config::AppConfig, error::ApiError};

/// Session tokens live for 24 hours; expiry is always validated on decode.
const TOKEN_TTL_HOURS: i64 = 24;

/// Claims
///
/// The payload signed into every session JWT. The token is self-contained:
/// the role and vertical claims are all the authorization gate needs, so no
/// database round-trip happens per request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's email (the natural key used across the admin API).
    pub sub: String,
    /// Role claim driving the access-control gate.
    pub role: String,
    /// The vertical a verticalhead is scoped to; absent for other roles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical: Option<String>,
    /// Issued At timestamp.
    pub iat: usize,
    /// Expiration timestamp. Tokens past this instant are rejected.
    pub exp: usize,
}

/// issue_token
///
/// Signs a session token for a successfully authenticated user.
pub fn issue_token(
    config: &AppConfig,
    email: &str,
    role: &str,
    vertical: Option<&str>,
) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        sub: email.to_string(),
        role: role.to_string(),
        vertical: vertical.map(str::to_string),
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::Upstream(format!("token signing failed: {}", e)))
}

/// decode_token
///
/// Validates signature and expiry, returning the embedded claims.
pub fn decode_token(config: &AppConfig, token: &str) -> Result<Claims, ApiError> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))
}

/// AuthUser
///
/// The resolved identity of an authenticated request, extracted from the
/// Bearer token. Handlers and the admin gate consume this struct for all
/// authorization decisions.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
    pub role: String,
    pub vertical: Option<String>,
}

/// AuthUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making AuthUser usable as a
/// function argument in any protected handler or middleware. Rejects with
/// 401 Unauthorized when the header is missing, malformed, or the token
/// fails signature/expiry validation.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

        let claims = decode_token(&config, token)?;

        Ok(AuthUser {
            email: claims.sub,
            role: claims.role,
            vertical: claims.vertical,
        })
    }
}

/// dashboard_route
///
/// Maps a role (and, for vertical heads, the vertical) to the frontend route
/// the client should navigate to after login. Unknown verticals have no
/// dashboard and the caller must refuse the login.
pub fn dashboard_route(role: &str, vertical: Option<&str>) -> Option<String> {
    match role {
        crate::models::roles::ADMIN => Some("/admin-dashboard".to_string()),
        crate::models::roles::VERTICAL_HEAD => {
            let vertical = vertical?.to_lowercase();
            match vertical.as_str() {
                "photography" | "events" | "social" => {
                    Some(format!("/vertical-dashboard/{}", vertical))
                }
                _ => None,
            }
        }
        _ => None,
    }
}
