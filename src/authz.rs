//! Who may touch what.
//!
//! Cat mutations never ask "may this user do it?" up front. The actor's
//! [`OwnerScope`] travels into the store call, and a row the actor does not
//! own simply is not found. Admin-only paths are the one explicit check.

use crate::database::OwnerScope;
use crate::error::ApiError;
use crate::middleware::AuthUser;

pub const ADMIN_ONLY: &str = "Admin only";

pub fn require_admin(actor: &AuthUser) -> Result<(), ApiError> {
    if actor.is_admin() {
        Ok(())
    } else {
        tracing::warn!("User {} denied admin-only operation", actor.id);
        Err(ApiError::forbidden(ADMIN_ONLY))
    }
}

pub fn cat_scope(actor: &AuthUser) -> OwnerScope {
    if actor.is_admin() {
        OwnerScope::Any
    } else {
        OwnerScope::Owner(actor.id)
    }
}
