use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::{
    AppState,
    error::ApiError,
    validation::{sanitize, validate_contact},
};

/// send_contact_message
///
/// [Public Route] Validates and sanitizes a contact-form submission, then
/// forwards it to the configured recipient through the mail collaborator.
/// Unlike the reset-link flow, a delivery failure here is surfaced: sending
/// the message is the endpoint's entire job.
#[utoipa::path(
    post,
    path = "/contact",
    responses(
        (status = 200, description = "Message forwarded"),
        (status = 400, description = "Validation failure"),
        (status = 500, description = "Mail delivery failed")
    )
)]
pub async fn send_contact_message(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    validate_contact(&payload)?;

    let name = sanitize(payload["name"].as_str().unwrap_or_default(), 100);
    let email = sanitize(payload["email"].as_str().unwrap_or_default(), 254);
    let message = sanitize(payload["message"].as_str().unwrap_or_default(), 2000);

    let body = format!("From: {} <{}>\n\nMessage:\n{}", name, email, message);

    state
        .mailer
        .send(
            &state.config.contact_recipient,
            "New Contact Form Submission",
            &body,
        )
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    Ok(Json(json!({"success": "Message sent successfully!"})))
}
