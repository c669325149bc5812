//! JSON shapes exchanged with the API.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The user object returned by the API and cached under the `user` storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(rename = "profilePic", default)]
    pub profile_pic: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub users: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct ProfileResponse {
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectResponse {
    pub project: Project,
}

#[derive(Debug, Deserialize)]
pub struct ProjectsResponse {
    #[serde(default)]
    pub projects: Vec<Project>,
}

#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error payload; either field may carry the text.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.error)
    }
}

/// Input of the registration screen.
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub profile_pic: Option<std::path::PathBuf>,
}
