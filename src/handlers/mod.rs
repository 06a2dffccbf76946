/// Handler Module Index
///
/// One module per resource, each holding the thin controllers that translate
/// HTTP requests into repository/storage/mailer calls. Authorization for the
/// admin surface is applied at the router layer, not here.
pub mod activities;
pub mod albums;
pub mod announcements;
pub mod auth;
pub mod contact;
pub mod gallery;
pub mod highlights;
pub mod users;
