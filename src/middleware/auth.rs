use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use uuid::Uuid;

use crate::api::AppState;
use crate::database::models::User;
use crate::database::StoreError;
use crate::error::ApiError;
use crate::types::Role;

const TOKEN_NOT_VALID: &str = "token not valid";

/// Authenticated user context resolved from the bearer token
#[derive(Clone, Debug, Serialize)]
pub struct AuthUser {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_name: String,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            user_name: user.user_name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Verifies the bearer token and resolves its subject to a stored user.
///
/// Every rejection looks the same to the client; the reason is only logged.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(request.headers()).map_err(|reason| {
        tracing::debug!("Rejected request: {}", reason);
        ApiError::unauthorized(TOKEN_NOT_VALID)
    })?;

    let claims = state.tokens.verify(token).map_err(|e| {
        tracing::warn!("Rejected token: {}", e);
        ApiError::unauthorized(TOKEN_NOT_VALID)
    })?;

    let user = match state.store.get_user(claims.sub).await {
        Ok(user) => user,
        Err(StoreError::NotFound(_)) => {
            tracing::warn!("Token subject {} no longer exists", claims.sub);
            return Err(ApiError::unauthorized(TOKEN_NOT_VALID));
        }
        Err(e) => return Err(e.into()),
    };

    request.extensions_mut().insert(AuthUser::from(user));
    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn extract_bearer(headers: &HeaderMap) -> Result<&str, &'static str> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("missing Authorization header")?
        .to_str()
        .map_err(|_| "Authorization header is not ASCII")?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or("Authorization header must use Bearer scheme")?
        .trim();
    if token.is_empty() {
        return Err("empty bearer token");
    }
    Ok(token)
}
