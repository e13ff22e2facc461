mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{email, json_request, TestApp, PASSWORD};

#[tokio::test]
async fn login_returns_token_and_user() -> Result<()> {
    let app = TestApp::new()?;
    let (alice, _) = app.register("alice").await?;

    let (status, body) = app
        .send(json_request(
            "POST",
            "/auth/login",
            None,
            json!({ "username": email("alice"), "password": PASSWORD }),
        ))
        .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["expires_in"], 7 * 24 * 3600);
    assert_eq!(body["user"]["_id"], alice["_id"]);
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"].get("password").is_none());
    Ok(())
}

#[tokio::test]
async fn login_failures_are_indistinguishable() -> Result<()> {
    let app = TestApp::new()?;
    app.register("alice").await?;

    let wrong_password = app
        .send(json_request(
            "POST",
            "/auth/login",
            None,
            json!({ "username": email("alice"), "password": "not-it" }),
        ))
        .await?;
    let unknown_email = app
        .send(json_request(
            "POST",
            "/auth/login",
            None,
            json!({ "username": email("nobody"), "password": PASSWORD }),
        ))
        .await?;

    assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password.1, json!({ "message": "Invalid username/password" }));
    Ok(())
}

#[tokio::test]
async fn login_with_empty_body_is_rejected() -> Result<()> {
    let app = TestApp::new()?;
    let (status, body) = app
        .send(json_request("POST", "/auth/login", None, json!({})))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid username/password");
    Ok(())
}
