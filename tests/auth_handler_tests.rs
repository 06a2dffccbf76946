mod common;

use common::{build_app, spawn_app};
use nss_portal::repository::Repository;
use nss_portal::{MemoryRepository, MockMailer, MockStorageService};
use serde_json::json;

// --- Login ---

#[tokio::test]
async fn admin_login_issues_a_token_and_dashboard() {
    let app = spawn_app();
    app.seed_user("admin@nss.edu", "abc12345", "admin", None).await;

    let (status, body) = app
        .request(
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "admin@nss.edu", "password": "abc12345"})),
        )
        .await;

    assert_eq!(status, 200);
    assert!(!body["access_token"].as_str().unwrap().is_empty());
    assert_eq!(body["role"], "admin");
    assert_eq!(body["dashboard"], "/admin-dashboard");
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = spawn_app();
    app.seed_user("admin@nss.edu", "abc12345", "admin", None).await;

    let (status, body) = app
        .request(
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "admin@nss.edu", "password": "wrong1234"})),
        )
        .await;

    assert_eq!(status, 401);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn unknown_email_is_indistinguishable_from_wrong_password() {
    let app = spawn_app();

    let (status, body) = app
        .request(
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "ghost@nss.edu", "password": "abc12345"})),
        )
        .await;

    assert_eq!(status, 401);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn malformed_credentials_fail_validation_before_lookup() {
    let app = spawn_app();

    let (status, _) = app
        .request(
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "not-an-email", "password": "abc12345"})),
        )
        .await;
    assert_eq!(status, 400);

    let (status, _) = app
        .request(
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "admin@nss.edu", "password": "short"})),
        )
        .await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn vertical_head_must_name_their_own_vertical() {
    let app = spawn_app();
    app.seed_user("head@nss.edu", "abc12345", "verticalhead", Some("Events"))
        .await;

    // Wrong vertical.
    let (status, body) = app
        .request(
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "head@nss.edu", "password": "abc12345", "vertical": "social"})),
        )
        .await;
    assert_eq!(status, 403);
    assert_eq!(body["error"], "Invalid vertical. You belong to Events");

    // No vertical at all.
    let (status, _) = app
        .request(
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "head@nss.edu", "password": "abc12345"})),
        )
        .await;
    assert_eq!(status, 403);

    // Correct vertical, case-insensitively.
    let (status, body) = app
        .request(
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "head@nss.edu", "password": "abc12345", "vertical": "EVENTS"})),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["dashboard"], "/vertical-dashboard/events");
    assert_eq!(body["vertical"], "Events");
}

#[tokio::test]
async fn unmapped_verticals_have_no_dashboard() {
    let app = spawn_app();
    app.seed_user("head@nss.edu", "abc12345", "verticalhead", Some("media"))
        .await;

    let (status, body) = app
        .request(
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "head@nss.edu", "password": "abc12345", "vertical": "media"})),
        )
        .await;

    assert_eq!(status, 403);
    assert_eq!(body["error"], "No dashboard configured for your vertical");
}

#[tokio::test]
async fn volunteers_cannot_log_in() {
    let app = spawn_app();
    app.seed_user("vol@nss.edu", "abc12345", "volunteer", None).await;

    let (status, body) = app
        .request(
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "vol@nss.edu", "password": "abc12345"})),
        )
        .await;

    assert_eq!(status, 403);
    assert_eq!(body["error"], "You are not authorized to login");
}

// --- Check User ---

#[tokio::test]
async fn check_user_reports_role_and_vertical() {
    let app = spawn_app();
    app.seed_user("head@nss.edu", "abc12345", "verticalhead", Some("events"))
        .await;

    let (status, body) = app
        .request("GET", "/auth/check-user?email=head@nss.edu", None, None)
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["role"], "verticalhead");
    assert_eq!(body["vertical"], "events");

    let (status, body) = app
        .request("GET", "/auth/check-user?email=ghost@nss.edu", None, None)
        .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "User not found");

    let (status, body) = app.request("GET", "/auth/check-user", None, None).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Email not provided");
}

// --- Password Reset Flow ---

#[tokio::test]
async fn forgot_password_emails_a_reset_link() {
    let app = spawn_app();
    app.seed_user("vol@nss.edu", "abc12345", "volunteer", None).await;

    let (status, body) = app
        .request(
            "POST",
            "/auth/forgot-password",
            None,
            Some(json!({"email": "vol@nss.edu"})),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Password reset link sent to your email");

    let sent = app.mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "vol@nss.edu");
    assert_eq!(sent[0].subject, "Password Reset Request");
    assert!(sent[0].body.contains("/reset-password/"));
}

#[tokio::test]
async fn forgot_password_for_unknown_email_is_not_found() {
    let app = spawn_app();

    let (status, _) = app
        .request(
            "POST",
            "/auth/forgot-password",
            None,
            Some(json!({"email": "ghost@nss.edu"})),
        )
        .await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn forgot_password_still_succeeds_when_delivery_fails() {
    // The endpoint must not reveal whether mail went out.
    let app = build_app(
        MemoryRepository::new(),
        MockStorageService::new(),
        MockMailer::new_failing(),
    );
    app.seed_user("vol@nss.edu", "abc12345", "volunteer", None).await;

    let (status, _) = app
        .request(
            "POST",
            "/auth/forgot-password",
            None,
            Some(json!({"email": "vol@nss.edu"})),
        )
        .await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn reset_token_is_single_use() {
    let app = spawn_app();
    app.seed_user("vol@nss.edu", "abc12345", "volunteer", None).await;

    app.request(
        "POST",
        "/auth/forgot-password",
        None,
        Some(json!({"email": "vol@nss.edu"})),
    )
    .await;

    let token = app
        .repo
        .find_user_by_email("vol@nss.edu")
        .await
        .unwrap()
        .unwrap()
        .reset_token
        .unwrap();

    // A weak replacement password is rejected before anything changes.
    let (status, _) = app
        .request(
            "POST",
            &format!("/auth/reset-password/{}", token),
            None,
            Some(json!({"password": "short"})),
        )
        .await;
    assert_eq!(status, 400);

    let (status, body) = app
        .request(
            "POST",
            &format!("/auth/reset-password/{}", token),
            None,
            Some(json!({"password": "newpass99"})),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Password updated successfully");

    // The token was consumed.
    let (status, body) = app
        .request(
            "POST",
            &format!("/auth/reset-password/{}", token),
            None,
            Some(json!({"password": "another99"})),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Invalid or expired token");

    // And the new password is live (volunteers still cannot log in, so check
    // the stored hash directly).
    let user = app
        .repo
        .find_user_by_email("vol@nss.edu")
        .await
        .unwrap()
        .unwrap();
    assert!(bcrypt::verify("newpass99", &user.password_hash).unwrap());
    assert!(user.reset_token.is_none());
}

// --- Gate Behavior ---

#[tokio::test]
async fn admin_routes_reject_missing_and_non_admin_tokens() {
    let app = spawn_app();

    let (status, _) = app
        .request("GET", "/admin/get-users", None, None)
        .await;
    assert_eq!(status, 401);

    let volunteer = app.token_for("vol@nss.edu", "volunteer", None);
    let (status, body) = app
        .request("GET", "/admin/get-users", Some(&volunteer), None)
        .await;
    assert_eq!(status, 403);
    assert_eq!(body["error"], "Admin access required");

    let admin = app.admin_token();
    let (status, _) = app
        .request("GET", "/admin/get-users", Some(&admin), None)
        .await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn garbage_tokens_are_unauthorized() {
    let app = spawn_app();

    let (status, _) = app
        .request("GET", "/admin/get-users", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, 401);
}
