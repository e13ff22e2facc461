// handlers/public/system.rs - Service info and health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::api::AppState;

/// GET / - name, version and endpoint overview
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "SSSF API (Rust)",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Users and geotagged cats",
        "endpoints": {
            "auth": "POST /auth/login (public)",
            "users": "/users[/:id] (reads and registration public; updates protected)",
            "token": "/users/token (protected)",
            "cats": "/cats[/:id], /cats/area (reads public; writes protected)",
            "mine": "/cats/user (protected)",
            "admin": "/cats/admin/:id, PUT|DELETE /users/:id (admin)",
        }
    }))
}

/// GET /health - 200 while the store answers, 503 otherwise
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let backend = state.store.backend();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "store": backend,
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "store": backend,
                    "message": "store unavailable",
                })),
            )
        }
    }
}
