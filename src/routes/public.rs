use crate::{AppState, handlers};
use axum::{
    Json, Router,
    routing::{delete, get, post},
};
use serde_json::json;

/// Public Router Module
///
/// Endpoints reachable without a token: the auth gateway, every read surface,
/// the album endpoints the gallery page drives, and the contact form.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /
        // Service banner with the route families, handy for smoke checks.
        .route("/", get(service_info))
        // GET /health
        // Unauthenticated liveness probe for monitors and load balancers.
        .route("/health", get(|| async { "ok" }))
        // --- Auth Gateway ---
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/check-user", get(handlers::auth::check_user))
        .route("/auth/forgot-password", post(handlers::auth::forgot_password))
        .route(
            "/auth/reset-password/{token}",
            post(handlers::auth::reset_password),
        )
        // --- Activity Reads ---
        // Listings are ordered by date, most recent first; /latest caps at 3.
        // (GET /api/activities itself is registered in create_router, where
        // its admin-gated POST sibling is attached to the same path.)
        .route(
            "/api/activities/latest",
            get(handlers::activities::get_latest_activities),
        )
        .route(
            "/api/activities/{id}",
            get(handlers::activities::get_activity),
        )
        // --- Albums ---
        .route(
            "/api/albums",
            get(handlers::albums::get_albums).post(handlers::albums::create_album),
        )
        .route("/api/albums/{name}", delete(handlers::albums::delete_album))
        .route(
            "/api/albums/{name}/photos",
            post(handlers::albums::upload_photos),
        )
        .route(
            "/api/albums/{name}/photos/{photo_id}",
            delete(handlers::albums::delete_photo),
        )
        // --- Contact Form ---
        .route("/contact", post(handlers::contact::send_contact_message))
}

/// service_info
///
/// The root banner mirroring what operators expect to see when probing the API.
async fn service_info() -> Json<serde_json::Value> {
    Json(json!({
        "message": "NSS Portal API Server",
        "status": "running",
        "version": "1.0.0",
        "endpoints": {
            "admin": "/admin/*",
            "api": "/api/*",
            "auth": "/auth/*",
            "uploads": "/uploads/*"
        }
    }))
}
