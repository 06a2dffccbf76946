use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod attachments;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod mailer;
pub mod models;
pub mod repository;
pub mod storage;
pub mod validation;

// Module for routing segregation (Public, Admin).
pub mod routes;
use auth::AuthUser;
use error::ApiError;
use routes::{admin, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the application entry point.
pub use config::AppConfig;
pub use mailer::{MailerState, MockMailer, SmtpMailer, UnconfiguredMailer};
pub use repository::{MemoryRepository, PostgresRepository, RepositoryState};
pub use storage::{LocalStorage, MockStorageService, S3StorageClient, StorageState};

// Uploads may reach the uniform 50 MiB per-file cap; leave room for
// multipart framing on top of it.
const MAX_REQUEST_BYTES: usize = attachments::MAX_UPLOAD_BYTES + 1024 * 1024;

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation (Swagger JSON) for the portal.
/// It aggregates all API paths and data schemas decorated with the
/// `#[utoipa::path]` and `#[derive(utoipa::ToSchema)]` macros. The resulting
/// JSON is served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::login, handlers::auth::check_user,
        handlers::auth::forgot_password, handlers::auth::reset_password,
        handlers::users::add_user, handlers::users::update_user,
        handlers::users::delete_user, handlers::users::get_users,
        handlers::announcements::add_announcement, handlers::announcements::update_announcement,
        handlers::announcements::delete_announcement, handlers::announcements::get_announcements,
        handlers::highlights::get_highlights, handlers::highlights::add_highlight,
        handlers::highlights::update_highlight, handlers::highlights::delete_highlight,
        handlers::highlights::delete_highlight_by_id,
        handlers::activities::get_activities, handlers::activities::get_latest_activities,
        handlers::activities::get_activity, handlers::activities::create_activity,
        handlers::activities::update_activity, handlers::activities::delete_activity,
        handlers::activities::admin_get_activities, handlers::activities::clear_activities,
        handlers::activities::download_report,
        handlers::albums::get_albums, handlers::albums::create_album,
        handlers::albums::delete_album, handlers::albums::upload_photos,
        handlers::albums::delete_photo,
        handlers::gallery::upload_photos, handlers::gallery::get_photos,
        handlers::gallery::delete_photo, handlers::gallery::upload_reports,
        handlers::contact::send_contact_message,
    ),
    components(
        schemas(
            models::UserView, models::Announcement, models::Highlight, models::Activity,
            models::PhotoRef, models::ReportRef, models::Album, models::GalleryPhoto,
            models::NewPhoto, models::NewReport,
            models::LoginRequest, models::LoginResponse, models::CheckUserResponse,
            models::ForgotPasswordRequest, models::ResetPasswordRequest,
            models::AddUserRequest, models::UpdateUserRequest, models::DeleteUserRequest,
            models::AddAnnouncementRequest, models::UpdateAnnouncementRequest,
            models::DeleteAnnouncementRequest,
            models::AddHighlightRequest, models::UpdateHighlightRequest,
            models::DeleteHighlightRequest,
            models::AddActivityRequest, models::UpdateActivityRequest,
            models::DeleteActivityRequest,
            models::CreateAlbumRequest, models::DeleteGalleryPhotoRequest,
            models::MessageResponse, models::AlbumsResponse, models::UploadPhotosResponse,
            models::GalleryUploadResponse, models::ReportsUploadResponse,
        )
    ),
    tags(
        (name = "nss-portal", description = "NSS Volunteering Club Portal API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe, immutable container holding all application
/// services and configuration, shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: abstracts database access.
    pub repo: RepositoryState,
    /// Storage Layer: abstracts where uploaded bytes live.
    pub storage: StorageState,
    /// Mail Layer: reset links and contact-form forwarding.
    pub mailer: MailerState,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These let extractors and middleware selectively pull components from the
// shared AppState without depending on the whole container.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for MailerState {
    fn from_ref(app_state: &AppState) -> MailerState {
        app_state.mailer.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// admin_gate
///
/// The capability-checking wrapper composed onto every mutating route. The
/// `AuthUser` extractor rejects missing/expired tokens with 401 before this
/// body runs; a valid token without the `admin` role claim is answered 403
/// without ever invoking the wrapped handler.
async fn admin_gate(
    auth_user: AuthUser,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if auth_user.role != models::roles::ADMIN {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }
    Ok(next.run(request).await)
}

/// create_router
///
/// Assembles the application's entire routing structure, applies global and
/// scoped middleware, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes: no middleware applied.
        .merge(public::public_routes())
        // Admin reads consumed by the public site, same /admin prefix, no gate.
        .nest("/admin", admin::admin_public_routes())
        // Admin writes: the gate middleware rejects non-admin tokens before
        // any handler runs.
        .nest(
            "/admin",
            admin::admin_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), admin_gate)),
        )
        // The activity API is dual-surfaced: public reads, admin-gated write
        // on the same path. The gate wraps only the POST method.
        .route(
            "/api/activities",
            get(handlers::activities::get_activities).merge(
                post(handlers::activities::create_activity)
                    .route_layer(middleware::from_fn_with_state(state.clone(), admin_gate)),
            ),
        )
        // Report download proxy, admin-gated.
        .route(
            "/api/download-report",
            get(handlers::activities::download_report)
                .route_layer(middleware::from_fn_with_state(state.clone(), admin_gate)),
        )
        // Static serving of locally stored uploads. ServeDir never resolves
        // outside its root, which keeps crafted filenames contained.
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        // Multipart bodies may carry files up to the upload cap.
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        // Apply the unified state to all routes.
        .with_state(state);

    // 3. Observability and Correlation Layers (applied outermost)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID generation: a unique UUID per incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request tracing: wraps the request/response lifecycle in
                // a span carrying the request id.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID propagation back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS layer.
        .layer(cors)
}

/// trace_span_logger
///
/// Customizes span creation for `TraceLayer`: the `x-request-id` header (when
/// present) is included in the structured logging metadata alongside the HTTP
/// method and URI, so every log line for a request is correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
