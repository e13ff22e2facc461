use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use super::AppState;
use crate::handlers::{elevated, protected, public};
use crate::middleware::require_auth;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.max_upload_bytes;
    let cors = cors_layer(&state.config.security.cors_origins);

    public_routes()
        .merge(protected_routes(state.clone()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::system::root))
        .route("/health", get(public::system::health))
        .route("/auth/login", post(public::auth::login))
        .route("/users", get(public::users::list).post(public::users::register))
        .route("/users/:id", get(public::users::get))
        .route("/cats", get(public::cats::list))
        .route("/cats/area", get(public::cats::area))
        .route("/cats/:id", get(public::cats::get))
}

/// Routes behind the bearer-token gate. Paths shared with the public router
/// merge per method, so only these methods carry the auth layer.
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            put(protected::users::update_self).delete(protected::users::delete_self),
        )
        .route("/users/token", get(protected::users::token))
        .route(
            "/users/:id",
            put(elevated::users::update).delete(elevated::users::delete),
        )
        .route("/cats", post(protected::cats::create))
        .route("/cats/user", get(protected::cats::mine))
        .route(
            "/cats/:id",
            put(protected::cats::update).delete(protected::cats::delete),
        )
        .route(
            "/cats/admin/:id",
            put(elevated::cats::update).delete(elevated::cats::delete),
        )
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
