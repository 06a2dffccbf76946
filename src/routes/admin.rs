use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, post, put},
};

/// Admin Router Module
///
/// The mutating surface of the portal. Every route returned by `admin_routes`
/// must be wrapped in the admin gate middleware by the caller; the read-only
/// routes in `admin_public_routes` live under the same `/admin` prefix for
/// frontend compatibility but take no token.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // --- User CRUD ---
        .route("/add-user", post(handlers::users::add_user))
        .route("/update-user", put(handlers::users::update_user))
        .route("/delete-user", delete(handlers::users::delete_user))
        .route("/get-users", get(handlers::users::get_users))
        // --- Announcements ---
        .route(
            "/add-announcement",
            post(handlers::announcements::add_announcement),
        )
        .route(
            "/update-announcement",
            put(handlers::announcements::update_announcement),
        )
        .route(
            "/delete-announcement",
            delete(handlers::announcements::delete_announcement),
        )
        // --- Trending Highlights ---
        .route("/add-trending", post(handlers::highlights::add_highlight))
        .route(
            "/update-trending",
            put(handlers::highlights::update_highlight),
        )
        .route(
            "/delete-trending",
            delete(handlers::highlights::delete_highlight),
        )
        .route(
            "/delete-trending-by-id",
            delete(handlers::highlights::delete_highlight_by_id),
        )
        // --- Activities ---
        .route("/add-activity", post(handlers::activities::create_activity))
        .route(
            "/update-activity",
            put(handlers::activities::update_activity),
        )
        .route(
            "/delete-activity",
            delete(handlers::activities::delete_activity),
        )
        .route(
            "/get-activities",
            get(handlers::activities::admin_get_activities),
        )
        // Maintenance: wipe the activity collection.
        .route(
            "/clear-activities",
            delete(handlers::activities::clear_activities),
        )
        // --- Gallery & Reports ---
        .route("/upload-photos", post(handlers::gallery::upload_photos))
        .route("/delete-photo", delete(handlers::gallery::delete_photo))
        .route("/upload-reports", post(handlers::gallery::upload_reports))
}

/// Read-only endpoints under the /admin prefix that the public site consumes
/// (the frontend fetches announcements and highlights without a session).
pub fn admin_public_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/get-announcements",
            get(handlers::announcements::get_announcements),
        )
        .route("/get-trending", get(handlers::highlights::get_highlights))
        .route("/get-photos", get(handlers::gallery::get_photos))
}
