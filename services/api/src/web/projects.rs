//! services/api/src/web/projects.rs
//!
//! Project endpoints. Both routes sit behind `require_auth`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::info;

use crate::error::{ErrorBody, HttpError};
use crate::web::models::{
    CreateProjectRequest, CreateProjectResponse, ProjectResponse, ProjectsResponse,
};
use crate::web::state::{AppState, AuthContext};

/// POST /projects/create - Create a project owned by the caller
#[utoipa::path(
    post,
    path = "/projects/create",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = CreateProjectResponse),
        (status = 400, description = "Missing project name", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn create_project_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateProjectResponse>), HttpError> {
    let Json(req) = payload?;
    let name = req.name.trim();
    if name.is_empty() {
        return Err(HttpError::bad_request("Name is required"));
    }

    let project = state.db.create_project(name, auth.user_id).await?;
    info!("User {} created project {}", auth.user_id, project.id);

    Ok((
        StatusCode::CREATED,
        Json(CreateProjectResponse {
            project: project.into(),
        }),
    ))
}

/// GET /projects/all - Projects the caller is a member of, newest first
#[utoipa::path(
    get,
    path = "/projects/all",
    responses(
        (status = 200, description = "The caller's projects", body = ProjectsResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn all_projects_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ProjectsResponse>, HttpError> {
    let projects = state.db.get_projects_for_user(auth.user_id).await?;
    Ok(Json(ProjectsResponse {
        projects: projects.into_iter().map(ProjectResponse::from).collect(),
    }))
}
