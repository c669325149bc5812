//! services/api/src/web/rest.rs
//!
//! The health endpoint and the master definition for the OpenAPI specification.

use crate::error::ErrorBody;
use crate::web::models::*;
use crate::web::state::AppState;
use crate::web::{auth, projects};
use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::warn;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register_handler,
        auth::login_handler,
        auth::profile_handler,
        auth::logout_handler,
        auth::all_users_handler,
        projects::create_project_handler,
        projects::all_projects_handler,
        health_handler,
    ),
    components(
        schemas(
            LoginRequest,
            CreateProjectRequest,
            AuthResponse,
            UserResponse,
            ProfileResponse,
            UsersResponse,
            MessageResponse,
            ProjectResponse,
            CreateProjectResponse,
            ProjectsResponse,
            HealthResponse,
            ErrorBody,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "CodeWithChat API", description = "Users and projects of the collaborative workspace.")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` security scheme referenced by protected paths.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

//=========================================================================================
// Health
//=========================================================================================

/// GET /health - Liveness, plus a cache round-trip
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let cache = match state.cache.ping().await {
        Ok(true) => "up",
        Ok(false) => "disabled",
        Err(e) => {
            warn!("Cache ping failed: {}", e);
            "down"
        }
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        cache: cache.to_string(),
    })
}
