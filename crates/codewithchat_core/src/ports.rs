//! crates/codewithchat_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or caches.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{NewUser, Project, User, UserCredentials};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---

    /// Inserts a user. A duplicate email yields `PortError::Conflict`.
    async fn create_user(&self, new_user: NewUser) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User>;

    /// Every user except `user_id`.
    async fn list_users_except(&self, user_id: Uuid) -> PortResult<Vec<User>>;

    // --- Auth Methods ---
    async fn create_auth_session(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Resolves a token to its user id, rejecting unknown and expired tokens.
    async fn validate_auth_session(&self, token: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, token: &str) -> PortResult<()>;

    // --- Project Management ---
    async fn create_project(&self, name: &str, owner_id: Uuid) -> PortResult<Project>;

    /// Projects whose member list contains `user_id`, newest first.
    async fn get_projects_for_user(&self, user_id: Uuid) -> PortResult<Vec<Project>>;
}

#[async_trait]
pub trait CacheService: Send + Sync {
    /// Round-trips to the cache. Returns `false` when caching is disabled.
    async fn ping(&self) -> PortResult<bool>;
}
