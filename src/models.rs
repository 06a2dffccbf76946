use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Role Constants ---

/// The role-based access control vocabulary. Stored as plain text in the
/// `users.role` column and inside JWT claims.
pub mod roles {
    pub const ADMIN: &str = "admin";
    pub const VERTICAL_HEAD: &str = "verticalhead";
    pub const VOLUNTEER: &str = "volunteer";
}

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// The canonical account record from the `users` table. This struct carries the
/// password hash and reset token, so it is internal-only: it is never serialized
/// into a response. `UserView` is the client-facing projection.
///
/// Invariant: `vertical` is present iff `role = 'verticalhead'`.
#[derive(Debug, Clone, FromRow, Default)]
pub struct User {
    pub id: Uuid,
    // The natural key used for lookups throughout the admin API.
    pub email: String,
    // Salted bcrypt hash. Plaintext is never stored or logged.
    pub password_hash: String,
    pub role: String,
    pub vertical: Option<String>,
    // One-time token set by the forgot-password flow, cleared on use.
    pub reset_token: Option<String>,
}

/// UserView
///
/// The safe projection of a User returned by the admin listing: no password
/// hash, no reset token.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub vertical: Option<String>,
}

/// Announcement
///
/// A club announcement from the `announcements` table. The frontend addresses
/// these by `activityName`, so renames locate the record by its previous name.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Announcement {
    pub id: Uuid,
    pub activity_name: String,
    pub activity_description: String,
}

/// Highlight
///
/// A short "trending" item, same shape as an Announcement but a separate
/// collection with case-insensitive title fallback on lookup.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Highlight {
    pub id: Uuid,
    pub title: String,
    pub description: String,
}

/// PhotoRef
///
/// One stored photo owned by an Album or Activity. The `id` is the stable
/// handle used for removal; `filename` doubles as the storage identifier.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct PhotoRef {
    pub id: Uuid,
    pub filename: String,
    pub url: String,
    pub original_name: Option<String>,
}

/// ReportRef
///
/// A document attachment owned by an Activity. `public_id` is the storage
/// identifier used for deletion.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct ReportRef {
    pub id: Uuid,
    pub url: String,
    pub public_id: String,
    pub original_name: String,
    #[ts(type = "string")]
    pub uploaded_at: DateTime<Utc>,
    pub mime_type: String,
}

/// Activity
///
/// A service activity from the `activities` table, assembled with its owned
/// photo and report sequences. Listings are ordered by date, most recent first.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Activity {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[ts(type = "string")]
    pub date: NaiveDate,
    pub location: String,
    pub status: String,
    // Loaded from `activity_photos` / `activity_reports`, not from this row.
    #[sqlx(skip)]
    pub photos: Vec<PhotoRef>,
    #[sqlx(skip)]
    pub reports: Vec<ReportRef>,
}

/// Album
///
/// A named photo album with its ordered photo sequence.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Album {
    pub id: Uuid,
    pub name: String,
    #[sqlx(skip)]
    pub photos: Vec<PhotoRef>,
}

/// GalleryPhoto
///
/// A photo in the site-wide gallery (not owned by an album or activity).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct GalleryPhoto {
    pub id: Uuid,
    pub filename: String,
    pub url: String,
    pub original_name: String,
    #[ts(type = "string")]
    pub uploaded_at: DateTime<Utc>,
    pub mime_type: String,
}

// --- Repository Input Types ---

/// NewUser
///
/// Insert payload for the users table. The hash is produced by the handler;
/// the repository never sees a plaintext password.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub vertical: Option<String>,
}

/// UserUpdate
///
/// Partial update for a user located by email. The nested Option on
/// `vertical` distinguishes "leave alone" (None) from "clear" (Some(None))
/// from "set" (Some(Some(v))), which is how the vertical-head invariant is
/// maintained on role transitions.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<String>,
    pub vertical: Option<Option<String>>,
}

/// NewPhoto
///
/// A stored photo about to be attached to an owner (album, activity).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct NewPhoto {
    pub filename: String,
    pub url: String,
    pub original_name: Option<String>,
}

/// NewReport
///
/// A stored document about to be attached to an activity.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct NewReport {
    pub url: String,
    pub public_id: String,
    pub original_name: String,
    #[ts(type = "string")]
    pub uploaded_at: Option<DateTime<Utc>>,
    pub mime_type: String,
}

/// NewActivity
///
/// Insert payload for the activities table with its attachment sequences.
#[derive(Debug, Clone, Default)]
pub struct NewActivity {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub location: String,
    pub status: String,
    pub photos: Vec<NewPhoto>,
    pub reports: Vec<NewReport>,
}

/// ActivityPatch
///
/// Partial update for an activity located by title (or id, for legacy
/// clients). Only Some fields are written.
#[derive(Debug, Clone, Default)]
pub struct ActivityPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    pub status: Option<String>,
}

/// NewGalleryPhoto
#[derive(Debug, Clone, Default)]
pub struct NewGalleryPhoto {
    pub filename: String,
    pub url: String,
    pub original_name: String,
    pub uploaded_at: DateTime<Utc>,
    pub mime_type: String,
}

// --- Request Payloads (Input Schemas) ---

/// LoginRequest
///
/// Credentials for POST /auth/login. Vertical heads must also name their
/// vertical, which is checked case-insensitively against the stored one.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub vertical: Option<String>,
}

/// ForgotPasswordRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// ResetPasswordRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ResetPasswordRequest {
    pub password: String,
}

/// AddUserRequest
///
/// Admin payload for creating an account. `vertical` is required when (and
/// only meaningful when) the role is `verticalhead`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AddUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub vertical: Option<String>,
}

/// UpdateUserRequest
///
/// Admin payload for partially updating a user addressed by their current
/// email. Field names follow the frontend's camelCase convention.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateUserRequest {
    pub existing_email: Option<String>,
    pub new_email: Option<String>,
    pub new_password: Option<String>,
    pub new_role: Option<String>,
    pub new_vertical: Option<String>,
}

/// DeleteUserRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct DeleteUserRequest {
    pub email: Option<String>,
}

/// AddAnnouncementRequest
///
/// The frontend sends announcement fields in PascalCase.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AddAnnouncementRequest {
    #[serde(rename = "ActivityName")]
    pub activity_name: Option<String>,
    #[serde(rename = "ActivityDescription")]
    pub activity_description: Option<String>,
}

/// UpdateAnnouncementRequest
///
/// Announcements are addressed by name, so the update carries the previous
/// name alongside the replacement fields.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateAnnouncementRequest {
    pub old_name: Option<String>,
    pub new_name: Option<String>,
    pub new_text: Option<String>,
}

/// DeleteAnnouncementRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct DeleteAnnouncementRequest {
    #[serde(rename = "Activity")]
    pub activity: Option<String>,
}

/// AddHighlightRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AddHighlightRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// UpdateHighlightRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateHighlightRequest {
    pub old_title: Option<String>,
    pub new_title: Option<String>,
    pub new_description: Option<String>,
}

/// DeleteHighlightRequest
///
/// Deletion prefers the stable id when a client supplies one; the title path
/// (with case-insensitive fallback) remains for the current frontend.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct DeleteHighlightRequest {
    pub id: Option<String>,
    pub title: Option<String>,
}

/// AddActivityRequest
///
/// Typed shape of the activity-creation body, deserialized after the raw
/// payload passes `validate_activity`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AddActivityRequest {
    pub title: String,
    pub description: String,
    // Calendar date in YYYY-MM-DD form; parsed after validation.
    pub date: String,
    pub location: Option<String>,
    pub status: Option<String>,
    pub photos: Option<Vec<NewPhoto>>,
    pub reports: Option<Vec<NewReport>>,
}

/// UpdateActivityRequest
///
/// Title-addressed partial update; `id` is the legacy fallback used only when
/// no title was supplied.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateActivityRequest {
    pub old_title: Option<String>,
    pub id: Option<String>,
    pub new_title: Option<String>,
    pub new_description: Option<String>,
    pub new_date: Option<String>,
    pub new_location: Option<String>,
    pub new_status: Option<String>,
}

/// DeleteActivityRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct DeleteActivityRequest {
    pub title: Option<String>,
    pub id: Option<String>,
}

/// CreateAlbumRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateAlbumRequest {
    pub name: Option<String>,
}

/// DeleteGalleryPhotoRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct DeleteGalleryPhotoRequest {
    pub filename: Option<String>,
}

// --- Response Schemas (Output) ---

/// LoginResponse
///
/// Successful login: the signed token plus the dashboard route the client
/// should navigate to for this role/vertical.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginResponse {
    pub access_token: String,
    pub role: String,
    pub vertical: String,
    pub dashboard: String,
}

/// CheckUserResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CheckUserResponse {
    pub role: String,
    pub vertical: String,
}

/// MessageResponse
///
/// The uniform `{"message": ...}` success body.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

/// AlbumsResponse
///
/// The gallery page's shape: album names in order plus a name-to-photos map.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AlbumsResponse {
    pub albums: Vec<String>,
    pub photos: BTreeMap<String, Vec<PhotoRef>>,
}

/// UploadPhotosResponse
///
/// Album upload result: only files that passed screening and were stored are
/// reported; skipped files are omitted.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UploadPhotosResponse {
    pub message: String,
    pub uploaded_photos: Vec<PhotoRef>,
}

/// GalleryUploadResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct GalleryUploadResponse {
    pub message: String,
    pub photos: Vec<GalleryPhoto>,
}

/// ReportsUploadResponse
///
/// The stored-but-unattached report references handed back to the client for
/// inclusion in a subsequent activity creation.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ReportsUploadResponse {
    pub message: String,
    pub reports: Vec<NewReport>,
}
