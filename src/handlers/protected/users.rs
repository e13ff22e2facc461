// handlers/protected/users.rs - Token introspection and self-service account changes

use axum::{extract::State, Extension, Json};

use crate::api::{AppState, JsonBody};
use crate::database::models::UserOutput;
use crate::handlers::payloads::UserPatch;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /users/token - the identity the bearer token resolves to
pub async fn token(Extension(actor): Extension<AuthUser>) -> Json<AuthUser> {
    Json(actor)
}

/// PUT /users - merge allow-listed fields into the caller's own account
pub async fn update_self(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    JsonBody(patch): JsonBody<UserPatch>,
) -> ApiResult<UserOutput> {
    let changes = patch.into_changes(
        state.config.security.password_min_length,
        &state.passwords,
    )
    .await?;
    let user = state.store.update_user(actor.id, changes).await?;
    Ok(ApiResponse::success("User updated", user.output()))
}

/// DELETE /users - removes the caller and their cats
pub async fn delete_self(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
) -> ApiResult<UserOutput> {
    let user = state.store.delete_user(actor.id).await?;
    tracing::info!("User {} deleted their account", user.id);
    Ok(ApiResponse::success("User deleted", user.output()))
}
