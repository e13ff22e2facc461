#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use sssf_api_rust::api::{build_router, AppState};
use sssf_api_rust::auth::PasswordHasher;
use sssf_api_rust::config::AppConfig;
use sssf_api_rust::database::memory::MemoryStore;
use sssf_api_rust::database::models::NewUser;
use sssf_api_rust::types::Role;

pub const PASSWORD: &str = "secret1";

/// A router over a fresh in-memory store. Uploads go to a per-app temp dir.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub upload_dir: PathBuf,
}

impl TestApp {
    pub fn new() -> Result<Self> {
        let upload_dir = std::env::temp_dir().join(format!("sssf-test-{}", Uuid::new_v4()));

        let mut config = AppConfig::development();
        config.security.jwt_secret = "integration-test-secret".to_string();
        config.server.upload_dir = upload_dir.to_string_lossy().into_owned();

        let passwords = PasswordHasher::new(1024, 1)?;
        let state = AppState::with_store(config, Arc::new(MemoryStore::new()), passwords)?;

        Ok(Self {
            router: build_router(state.clone()),
            state,
            upload_dir,
        })
    }

    pub async fn send(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        Ok((status, read_json(response).await?))
    }

    /// Registers `name` through the API and returns `(user, token)`.
    pub async fn register(&self, name: &str) -> Result<(Value, String)> {
        let (status, body) = self
            .send(json_request(
                "POST",
                "/users",
                None,
                json!({
                    "user_name": name,
                    "email": email(name),
                    "password": PASSWORD,
                }),
            ))
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "register failed: {}", body);

        let token = self.login(&email(name), PASSWORD).await?;
        Ok((body["data"].clone(), token))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let (status, body) = self
            .send(json_request(
                "POST",
                "/auth/login",
                None,
                json!({ "username": email, "password": password }),
            ))
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "login failed: {}", body);
        body["token"]
            .as_str()
            .map(str::to_string)
            .context("token missing from login response")
    }

    /// Admins cannot be registered, so seed one straight into the store.
    pub async fn admin(&self) -> Result<(Uuid, String)> {
        let user = self
            .state
            .store
            .create_user(NewUser {
                user_name: "admin".to_string(),
                email: email("admin"),
                password_hash: self.state.passwords.hash(PASSWORD)?,
                role: Role::Admin,
            })
            .await?;
        let token = self.state.tokens.issue(user.id)?;
        Ok((user.id, token))
    }

    /// POSTs a cat as multipart and returns the created record.
    pub async fn create_cat(&self, token: &str, name: &str, lat: f64, lng: f64) -> Result<Value> {
        let lat = lat.to_string();
        let lng = lng.to_string();
        let request = multipart_request(
            "/cats",
            token,
            &[
                ("cat_name", name),
                ("weight", "4.5"),
                ("birthdate", "2020-05-17"),
                ("lat", &lat),
                ("lng", &lng),
            ],
            None,
        );
        let (status, body) = self.send(request).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create cat failed: {}", body);
        Ok(body["data"].clone())
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}

pub fn email(name: &str) -> String {
    format!("{}@example.com", name)
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).expect("request")
}

/// Builds a `multipart/form-data` body; `file` becomes the `cat` part.
pub fn multipart_request(
    uri: &str,
    token: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &[u8])>,
) -> Request<Body> {
    let boundary = "sssf-test-boundary";
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"cat\"; filename=\"cat.png\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(body))
        .expect("request")
}

pub async fn read_json(response: axum::response::Response) -> Result<Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes).with_context(|| {
        format!("response was not JSON: {}", String::from_utf8_lossy(&bytes))
    })
}
