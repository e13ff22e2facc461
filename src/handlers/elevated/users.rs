// handlers/elevated/users.rs - Admin account management

use axum::{
    extract::{Path, State},
    Extension,
};

use crate::api::{AppState, JsonBody};
use crate::authz::require_admin;
use crate::database::models::UserOutput;
use crate::handlers::payloads::AdminUserPatch;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::validation::parse_id;

/// PUT /users/:id - any allow-listed field, `role` included
pub async fn update(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<AdminUserPatch>,
) -> ApiResult<UserOutput> {
    require_admin(&actor)?;
    let id = parse_id(&id)?;

    let changes = patch.into_changes(
        state.config.security.password_min_length,
        &state.passwords,
    )
    .await?;
    let user = state.store.update_user(id, changes).await?;

    tracing::info!("Admin {} updated user {}", actor.id, user.id);
    Ok(ApiResponse::success("User updated", user.output()))
}

/// DELETE /users/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<UserOutput> {
    require_admin(&actor)?;
    let id = parse_id(&id)?;

    let user = state.store.delete_user(id).await?;
    tracing::info!("Admin {} deleted user {}", actor.id, user.id);
    Ok(ApiResponse::success("User deleted", user.output()))
}
