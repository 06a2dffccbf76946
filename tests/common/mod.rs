#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use nss_portal::{
    AppConfig, AppState, MemoryRepository, MockMailer, MockStorageService, auth::issue_token,
    create_router,
};
use std::sync::Arc;
use tower::util::ServiceExt;

/// TestApp
///
/// A fully wired router over the in-memory repository and the mock
/// storage/mail services, with handles kept so tests can seed data and
/// assert on recorded side effects.
pub struct TestApp {
    pub router: Router,
    pub repo: Arc<MemoryRepository>,
    pub storage: Arc<MockStorageService>,
    pub mailer: Arc<MockMailer>,
    pub config: AppConfig,
}

pub fn spawn_app() -> TestApp {
    build_app(
        MemoryRepository::new(),
        MockStorageService::new(),
        MockMailer::new(),
    )
}

pub fn spawn_app_seeded() -> TestApp {
    build_app(
        MemoryRepository::with_seed_data(),
        MockStorageService::new(),
        MockMailer::new(),
    )
}

pub fn build_app(
    repo: MemoryRepository,
    storage: MockStorageService,
    mailer: MockMailer,
) -> TestApp {
    let repo = Arc::new(repo);
    let storage = Arc::new(storage);
    let mailer = Arc::new(mailer);
    let config = AppConfig::default();

    let state = AppState {
        repo: repo.clone(),
        storage: storage.clone(),
        mailer: mailer.clone(),
        config: config.clone(),
    };

    TestApp {
        router: create_router(state),
        repo,
        storage,
        mailer,
        config,
    }
}

impl TestApp {
    pub fn admin_token(&self) -> String {
        issue_token(&self.config, "admin@nss.edu", "admin", None).unwrap()
    }

    pub fn token_for(&self, email: &str, role: &str, vertical: Option<&str>) -> String {
        issue_token(&self.config, email, role, vertical).unwrap()
    }

    /// Sends a JSON request through the router and parses the JSON response.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, json)
    }

    /// Sends a multipart/form-data request. Each part is
    /// (field_name, file_name, content_type, bytes).
    pub async fn multipart(
        &self,
        uri: &str,
        token: Option<&str>,
        parts: &[(&str, &str, &str, &[u8])],
    ) -> (StatusCode, serde_json::Value) {
        const BOUNDARY: &str = "nss-test-boundary-7MA4YWxkTrZu0gW";

        let mut body = Vec::new();
        for (field, filename, content_type, bytes) in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    field, filename
                )
                .as_bytes(),
            );
            body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        let mut builder = Request::builder().method("POST").uri(uri).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = builder.body(Body::from(body)).unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, json)
    }

    /// Creates a user directly in the repository with a real (low-cost) hash,
    /// so login flows can be exercised end to end.
    pub async fn seed_user(&self, email: &str, password: &str, role: &str, vertical: Option<&str>) {
        use nss_portal::models::NewUser;
        use nss_portal::repository::Repository;

        let password_hash = bcrypt::hash(password, 4).unwrap();
        self.repo
            .create_user(NewUser {
                email: email.to_string(),
                password_hash,
                role: role.to_string(),
                vertical: vertical.map(str::to_string),
            })
            .await
            .unwrap();
    }
}
