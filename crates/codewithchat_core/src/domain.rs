//! crates/codewithchat_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A registered user, as seen by everything outside the auth handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub profile_pic: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub hashed_password: String,
}

/// Everything needed to insert a new user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub hashed_password: String,
    pub profile_pic: Option<String>,
}

/// A project and the users who belong to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub users: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn has_member(&self, user_id: Uuid) -> bool {
        self.users.contains(&user_id)
    }
}

// Represents a bearer token issued at login/registration
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
