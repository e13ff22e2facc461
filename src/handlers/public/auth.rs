// handlers/public/auth.rs - POST /auth/login

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::{AppState, JsonBody};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::validation::deserialize_email;

const INVALID_CREDENTIALS: &str = "Invalid username/password";

/// `username` is the account email, matched case-insensitively.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "deserialize_email")]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
    pub user: AuthUser,
}

/**
 * POST /auth/login - Exchange email and password for a bearer token
 *
 * An unknown email and a wrong password both answer 401 with the same body,
 * and both pay for one hash verification.
 */
pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let account = state.store.find_user_by_email(&body.username).await?;
    let stored_hash = account.as_ref().map(|user| user.password_hash.clone());
    let verified = state
        .passwords
        .clone()
        .verify_blocking(body.password, stored_hash)
        .await?;

    let user = match account {
        Some(user) if verified => user,
        Some(user) => {
            tracing::info!("Failed login for user {}", user.id);
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }
        None => {
            tracing::info!("Failed login for unknown account");
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }
    };

    let token = state.tokens.issue(user.id)?;
    tracing::info!("User {} logged in", user.id);

    Ok(Json(LoginResponse {
        message: "Login successful",
        token,
        expires_in: state.tokens.expires_in_secs(),
        user: AuthUser::from(user),
    }))
}
