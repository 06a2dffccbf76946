mod common;

use common::spawn_app;
use serde_json::json;

// --- User CRUD ---

#[tokio::test]
async fn vertical_head_requires_a_vertical() {
    let app = spawn_app();
    let admin = app.admin_token();

    let (status, body) = app
        .request(
            "POST",
            "/admin/add-user",
            Some(&admin),
            Some(json!({"email": "a@b.com", "password": "abc12345", "role": "verticalhead"})),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Vertical name is required for vertical head.");

    let (status, body) = app
        .request(
            "POST",
            "/admin/add-user",
            Some(&admin),
            Some(json!({
                "email": "a@b.com", "password": "abc12345",
                "role": "verticalhead", "vertical": "events"
            })),
        )
        .await;
    assert_eq!(status, 201);
    assert_eq!(body["message"], "User a@b.com added");
}

#[tokio::test]
async fn user_listing_never_exposes_credentials() {
    let app = spawn_app();
    let admin = app.admin_token();

    app.request(
        "POST",
        "/admin/add-user",
        Some(&admin),
        Some(json!({"email": "a@b.com", "password": "abc12345", "role": "volunteer"})),
    )
    .await;

    let (status, body) = app
        .request("GET", "/admin/get-users", Some(&admin), None)
        .await;
    assert_eq!(status, 200);

    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], "a@b.com");
    assert!(users[0].get("password").is_none());
    assert!(users[0].get("password_hash").is_none());
    assert!(users[0].get("reset_token").is_none());
}

#[tokio::test]
async fn duplicate_emails_conflict_regardless_of_other_fields() {
    let app = spawn_app();
    let admin = app.admin_token();

    let (status, _) = app
        .request(
            "POST",
            "/admin/add-user",
            Some(&admin),
            Some(json!({"email": "a@b.com", "password": "abc12345", "role": "volunteer"})),
        )
        .await;
    assert_eq!(status, 201);

    let (status, body) = app
        .request(
            "POST",
            "/admin/add-user",
            Some(&admin),
            Some(json!({"email": "a@b.com", "password": "different9", "role": "admin"})),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "User already exists");
}

#[tokio::test]
async fn add_user_validates_fields() {
    let app = spawn_app();
    let admin = app.admin_token();

    let (status, body) = app
        .request(
            "POST",
            "/admin/add-user",
            Some(&admin),
            Some(json!({"email": "a@b.com"})),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Missing required fields.");

    let (status, _) = app
        .request(
            "POST",
            "/admin/add-user",
            Some(&admin),
            Some(json!({"email": "nope", "password": "abc12345", "role": "volunteer"})),
        )
        .await;
    assert_eq!(status, 400);

    let (status, _) = app
        .request(
            "POST",
            "/admin/add-user",
            Some(&admin),
            Some(json!({"email": "a@b.com", "password": "abc12345", "role": "owner"})),
        )
        .await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn role_transitions_maintain_the_vertical_invariant() {
    let app = spawn_app();
    let admin = app.admin_token();

    app.request(
        "POST",
        "/admin/add-user",
        Some(&admin),
        Some(json!({"email": "a@b.com", "password": "abc12345", "role": "volunteer"})),
    )
    .await;

    // Into verticalhead without a vertical: refused.
    let (status, _) = app
        .request(
            "PUT",
            "/admin/update-user",
            Some(&admin),
            Some(json!({"existingEmail": "a@b.com", "newRole": "verticalhead"})),
        )
        .await;
    assert_eq!(status, 400);

    // Into verticalhead with one: accepted and stored.
    let (status, _) = app
        .request(
            "PUT",
            "/admin/update-user",
            Some(&admin),
            Some(json!({
                "existingEmail": "a@b.com", "newRole": "verticalhead", "newVertical": "social"
            })),
        )
        .await;
    assert_eq!(status, 200);

    let (_, body) = app
        .request("GET", "/auth/check-user?email=a@b.com", None, None)
        .await;
    assert_eq!(body["role"], "verticalhead");
    assert_eq!(body["vertical"], "social");

    // Out of verticalhead: the vertical is cleared.
    let (status, _) = app
        .request(
            "PUT",
            "/admin/update-user",
            Some(&admin),
            Some(json!({"existingEmail": "a@b.com", "newRole": "volunteer"})),
        )
        .await;
    assert_eq!(status, 200);

    let (_, body) = app
        .request("GET", "/auth/check-user?email=a@b.com", None, None)
        .await;
    assert_eq!(body["role"], "volunteer");
    assert_eq!(body["vertical"], "");
}

#[tokio::test]
async fn update_and_delete_unknown_users_are_not_found() {
    let app = spawn_app();
    let admin = app.admin_token();

    let (status, _) = app
        .request(
            "PUT",
            "/admin/update-user",
            Some(&admin),
            Some(json!({"existingEmail": "ghost@b.com", "newRole": "admin"})),
        )
        .await;
    assert_eq!(status, 404);

    let (status, _) = app
        .request(
            "DELETE",
            "/admin/delete-user",
            Some(&admin),
            Some(json!({"email": "ghost@b.com"})),
        )
        .await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn delete_user_removes_the_account() {
    let app = spawn_app();
    let admin = app.admin_token();

    app.request(
        "POST",
        "/admin/add-user",
        Some(&admin),
        Some(json!({"email": "a@b.com", "password": "abc12345", "role": "volunteer"})),
    )
    .await;

    let (status, body) = app
        .request(
            "DELETE",
            "/admin/delete-user",
            Some(&admin),
            Some(json!({"email": "a@b.com"})),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "User deleted");

    let (status, _) = app
        .request("GET", "/auth/check-user?email=a@b.com", None, None)
        .await;
    assert_eq!(status, 404);
}

// --- Announcements ---

#[tokio::test]
async fn announcement_lifecycle_is_name_addressed() {
    let app = spawn_app();
    let admin = app.admin_token();

    let (status, _) = app
        .request(
            "POST",
            "/admin/add-announcement",
            Some(&admin),
            Some(json!({"ActivityName": "Orientation", "ActivityDescription": "Freshers welcome"})),
        )
        .await;
    assert_eq!(status, 201);

    // Reads are public.
    let (status, body) = app
        .request("GET", "/admin/get-announcements", None, None)
        .await;
    assert_eq!(status, 200);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["activityName"], "Orientation");

    // Rename locates the record by its previous name.
    let (status, _) = app
        .request(
            "PUT",
            "/admin/update-announcement",
            Some(&admin),
            Some(json!({
                "oldName": "Orientation", "newName": "Orientation 2025", "newText": "Updated"
            })),
        )
        .await;
    assert_eq!(status, 200);

    let (status, body) = app
        .request(
            "PUT",
            "/admin/update-announcement",
            Some(&admin),
            Some(json!({"oldName": "Orientation", "newName": "X", "newText": "Y"})),
        )
        .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "No announcement updated. Check name.");

    let (status, _) = app
        .request(
            "DELETE",
            "/admin/delete-announcement",
            Some(&admin),
            Some(json!({"Activity": "Orientation 2025"})),
        )
        .await;
    assert_eq!(status, 200);

    let (status, _) = app
        .request(
            "DELETE",
            "/admin/delete-announcement",
            Some(&admin),
            Some(json!({"Activity": "Orientation 2025"})),
        )
        .await;
    assert_eq!(status, 404);
}

// --- Highlights ---

#[tokio::test]
async fn highlight_lookup_falls_back_to_case_insensitive_match() {
    let app = spawn_app();
    let admin = app.admin_token();

    app.request(
        "POST",
        "/admin/add-trending",
        Some(&admin),
        Some(json!({"title": "Old Title", "description": "was trending"})),
    )
    .await;

    // Exact rename.
    let (status, _) = app
        .request(
            "PUT",
            "/admin/update-trending",
            Some(&admin),
            Some(json!({"oldTitle": "Old Title", "newTitle": "New Title", "newDescription": "d"})),
        )
        .await;
    assert_eq!(status, 200);

    // Addressing with different casing still finds the record.
    let (status, _) = app
        .request(
            "PUT",
            "/admin/update-trending",
            Some(&admin),
            Some(json!({"oldTitle": "new title", "newTitle": "Newer Title", "newDescription": "d"})),
        )
        .await;
    assert_eq!(status, 200);

    let (_, body) = app.request("GET", "/admin/get-trending", None, None).await;
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["Newer Title"]);

    // Deletion tolerates casing and surrounding whitespace too.
    let (status, _) = app
        .request(
            "DELETE",
            "/admin/delete-trending",
            Some(&admin),
            Some(json!({"title": "  NEWER TITLE  "})),
        )
        .await;
    assert_eq!(status, 200);

    let (_, body) = app.request("GET", "/admin/get-trending", None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn highlight_deletion_by_id() {
    let app = spawn_app();
    let admin = app.admin_token();

    let (status, body) = app
        .request(
            "DELETE",
            "/admin/delete-trending-by-id",
            Some(&admin),
            Some(json!({})),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "id is required");

    let (status, body) = app
        .request(
            "DELETE",
            "/admin/delete-trending-by-id",
            Some(&admin),
            Some(json!({"id": "not-a-uuid"})),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Invalid id format");

    // A real id round-trip: create, list to learn the id, delete by it.
    app.request(
        "POST",
        "/admin/add-trending",
        Some(&admin),
        Some(json!({"title": "Ephemeral", "description": "soon gone"})),
    )
    .await;
    let (_, body) = app.request("GET", "/admin/get-trending", None, None).await;
    let id = body.as_array().unwrap()[0]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .request(
            "DELETE",
            "/admin/delete-trending-by-id",
            Some(&admin),
            Some(json!({"id": id})),
        )
        .await;
    assert_eq!(status, 200);
}
