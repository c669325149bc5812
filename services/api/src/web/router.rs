//! services/api/src/web/router.rs
//!
//! Assembles the public and protected routes into one router.

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::web::{
    auth::{
        all_users_handler, login_handler, logout_handler, profile_handler, register_handler,
    },
    middleware::require_auth,
    projects::{all_projects_handler, create_project_handler},
    rest::health_handler,
    state::AppState,
};

/// Upper bound on request bodies, sized for a profile picture upload.
const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = match origin.parse::<HeaderValue>() {
        Ok(value) => AllowOrigin::exact(value),
        Err(e) => {
            warn!("Invalid CORS_ORIGIN {:?} ({}), allowing any origin", origin, e);
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT])
}

/// Builds the API router over `app_state`.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/users/register", post(register_handler))
        .route("/users/login", post(login_handler))
        .route("/health", get(health_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/users/profile", get(profile_handler))
        .route("/users/logout", post(logout_handler))
        .route("/users/all", get(all_users_handler))
        .route("/projects/create", post(create_project_handler))
        .route("/projects/all", get(all_projects_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors_layer(&app_state.config.cors_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
