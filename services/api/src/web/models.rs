//! services/api/src/web/models.rs
//!
//! Request and response payloads of the REST API. Field names follow the JSON
//! shape the browser client already consumes (`_id`, `profilePic`, ...).

use chrono::{DateTime, Utc};
use codewithchat_core::domain::{Project, User};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Requests
//=========================================================================================

/// The fields of the multipart registration form, once parsed.
#[derive(Debug, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    /// A reference (URL) to a profile picture. Uploaded image files are not stored.
    pub profile_pic: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    pub name: String,
}

//=========================================================================================
// Responses
//=========================================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(rename = "profilePic")]
    pub profile_pic: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            profile_pic: user.profile_pic,
            created_at: user.created_at,
        }
    }
}

/// Returned by register and login.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user: UserResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UsersResponse {
    pub users: Vec<UserResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub users: Vec<Uuid>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            name: project.name,
            users: project.users,
            created_at: project.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateProjectResponse {
    pub project: ProjectResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectsResponse {
    pub projects: Vec<ProjectResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    /// `up`, `down` or `disabled`.
    pub cache: String,
}
