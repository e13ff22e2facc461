// handlers/public/users.rs - User reads and self-registration

use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::{AppState, JsonBody};
use crate::database::models::{NewUser, UserOutput};
use crate::error::ApiError;
use crate::handlers::payloads::RegisterUser;
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::Role;
use crate::validation::parse_id;

/// GET /users
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<UserOutput>>, ApiError> {
    let users = state.store.list_users().await?;
    Ok(Json(users.iter().map(|u| u.output()).collect()))
}

/// GET /users/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserOutput>, ApiError> {
    let id = parse_id(&id)?;
    let user = state.store.get_user(id).await?;
    Ok(Json(user.output()))
}

/// POST /users - role is always `user`, whatever the body says
pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterUser>,
) -> ApiResult<UserOutput> {
    body.validate(state.config.security.password_min_length)?;

    let password_hash = state.passwords.clone().hash_blocking(body.password).await?;
    let user = state
        .store
        .create_user(NewUser {
            user_name: body.user_name,
            email: body.email,
            password_hash,
            role: Role::User,
        })
        .await?;

    tracing::info!("Registered user {}", user.id);
    Ok(ApiResponse::created("User created", user.output()))
}
