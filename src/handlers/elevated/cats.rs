// handlers/elevated/cats.rs - Admin cat management, ownership ignored

use axum::{
    extract::{Path, State},
    Extension,
};

use crate::api::{AppState, JsonBody};
use crate::authz::require_admin;
use crate::database::models::CatOutput;
use crate::database::OwnerScope;
use crate::handlers::payloads::CatPatch;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::validation::parse_id;

/// PUT /cats/admin/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<CatPatch>,
) -> ApiResult<CatOutput> {
    require_admin(&actor)?;
    let id = parse_id(&id)?;

    let changes = patch.into_changes()?;
    let cat = state.store.update_cat(id, OwnerScope::Any, changes).await?;
    Ok(ApiResponse::success("Cat updated", cat))
}

/// DELETE /cats/admin/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<CatOutput> {
    require_admin(&actor)?;
    let id = parse_id(&id)?;

    let cat = state.store.delete_cat(id, OwnerScope::Any).await?;
    tracing::info!("Admin {} deleted cat {}", actor.id, cat.id);
    Ok(ApiResponse::success("Cat deleted", cat))
}
