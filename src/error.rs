use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::validation::ValidationError;

/// ApiError
///
/// The application-wide error type. Every handler returns `Result<_, ApiError>`,
/// and the `IntoResponse` implementation below is the single place where failures
/// become HTTP responses. Validation and authorization failures carry their message
/// to the client; backend failures (database, storage, mail) are logged with full
/// detail internally and surface only a generic message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or missing input; the client must correct and retry.
    #[error("{0}")]
    Validation(String),

    /// The addressed resource or key does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A unique key (email, album name) already exists.
    #[error("{0}")]
    Conflict(String),

    /// Missing, malformed, or expired credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated, but not allowed to perform the operation.
    #[error("{0}")]
    Forbidden(String),

    /// An upload rejected by the extension/MIME/size checks.
    #[error("{0}")]
    UnsupportedMedia(String),

    /// Database failure. Detail stays in the logs.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A collaborator (storage backend, mail relay, remote fetch) failed.
    #[error("upstream failure: {0}")]
    Upstream(String),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

/// ErrorBody
///
/// The uniform JSON error payload: a single short message under the `error` key.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            // Duplicates answer 400 rather than 409: the frontend treats every
            // client-correctable failure uniformly.
            ApiError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            ApiError::UnsupportedMedia(msg) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, msg.clone()),
            ApiError::Database(err) => {
                // A unique-constraint race slipping past the handler's existence
                // check is still a duplicate, not a server fault.
                if let sqlx::Error::Database(db_err) = err {
                    if db_err.code().as_deref() == Some("23505") {
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(ErrorBody {
                                error: "Duplicate entry".to_string(),
                            }),
                        )
                            .into_response();
                    }
                }
                tracing::error!("database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Upstream(detail) => {
                tracing::error!("upstream failure: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
