//! services/api/src/adapters/memory.rs
//!
//! An in-process implementation of the `DatabaseService` port. Selected with
//! `DATABASE_URL=memory://` for local runs and used by the router tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use codewithchat_core::domain::{AuthSession, NewUser, Project, User, UserCredentials};
use codewithchat_core::ports::{DatabaseService, PortError, PortResult};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: Vec<UserCredentials>,
    sessions: HashMap<String, AuthSession>,
    projects: Vec<Project>,
}

/// A `DatabaseService` backed by plain collections behind a lock.
#[derive(Default)]
pub struct MemoryDb {
    tables: RwLock<Tables>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DatabaseService for MemoryDb {
    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|c| c.user.email == new_user.email) {
            return Err(PortError::Conflict(format!(
                "User with email {} already exists",
                new_user.email
            )));
        }

        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            profile_pic: new_user.profile_pic,
            created_at: Utc::now(),
        };
        tables.users.push(UserCredentials {
            user: user.clone(),
            hashed_password: new_user.hashed_password,
        });
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let tables = self.tables.read().await;
        tables
            .users
            .iter()
            .find(|c| c.user.email == email)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", email)))
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let tables = self.tables.read().await;
        tables
            .users
            .iter()
            .find(|c| c.user.id == user_id)
            .map(|c| c.user.clone())
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn list_users_except(&self, user_id: Uuid) -> PortResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .filter(|c| c.user.id != user_id)
            .map(|c| c.user.clone())
            .collect())
    }

    async fn create_auth_session(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        tables.sessions.retain(|_, session| !session.is_expired(now));
        tables.sessions.insert(
            token.to_string(),
            AuthSession {
                token: token.to_string(),
                user_id,
                expires_at,
            },
        );
        Ok(())
    }

    async fn validate_auth_session(&self, token: &str) -> PortResult<Uuid> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        match tables
            .sessions
            .get(token)
            .map(|session| (session.user_id, session.is_expired(now)))
        {
            Some((user_id, false)) => Ok(user_id),
            Some((_, true)) => {
                tables.sessions.remove(token);
                Err(PortError::Unauthorized)
            }
            None => Err(PortError::Unauthorized),
        }
    }

    async fn delete_auth_session(&self, token: &str) -> PortResult<()> {
        self.tables.write().await.sessions.remove(token);
        Ok(())
    }

    async fn create_project(&self, name: &str, owner_id: Uuid) -> PortResult<Project> {
        let project = Project {
            id: Uuid::new_v4(),
            name: name.to_string(),
            users: vec![owner_id],
            created_at: Utc::now(),
        };
        self.tables.write().await.projects.push(project.clone());
        Ok(project)
    }

    async fn get_projects_for_user(&self, user_id: Uuid) -> PortResult<Vec<Project>> {
        let tables = self.tables.read().await;
        // Insertion order is creation order; newest first.
        Ok(tables
            .projects
            .iter()
            .rev()
            .filter(|p| p.has_member(user_id))
            .cloned()
            .collect())
    }
}
