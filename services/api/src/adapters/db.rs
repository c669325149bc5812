//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use codewithchat_core::domain::{NewUser, Project, User, UserCredentials};
use codewithchat_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

/// Unique indexes the application relies on, as `(name, definition)`.
///
/// They live outside the migrations so a server restart recreates them after
/// `fix_index` has dropped every secondary index on `users`.
pub const REQUIRED_INDEXES: &[(&str, &str)] = &[(
    "users_email_key",
    "CREATE UNIQUE INDEX IF NOT EXISTS users_email_key ON users (email)",
)];

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Creates any missing entry of `REQUIRED_INDEXES`.
    pub async fn ensure_indexes(&self) -> Result<(), sqlx::Error> {
        for (name, definition) in REQUIRED_INDEXES {
            sqlx::query(definition).execute(&self.pool).await?;
            info!("Ensured index {}", name);
        }
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    name: String,
    email: String,
    profile_pic: Option<String>,
    created_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            profile_pic: self.profile_pic,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    id: Uuid,
    name: String,
    email: String,
    profile_pic: Option<String>,
    created_at: DateTime<Utc>,
    password_hash: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user: User {
                id: self.id,
                name: self.name,
                email: self.email,
                profile_pic: self.profile_pic,
                created_at: self.created_at,
            },
            hashed_password: self.password_hash,
        }
    }
}

#[derive(FromRow)]
struct ProjectRecord {
    id: Uuid,
    name: String,
    users: Vec<Uuid>,
    created_at: DateTime<Utc>,
}
impl ProjectRecord {
    fn to_domain(self) -> Project {
        Project {
            id: self.id,
            name: self.name,
            users: self.users,
            created_at: self.created_at,
        }
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (id, name, email, password_hash, profile_pic) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, name, email, profile_pic, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.hashed_password)
        .bind(&new_user.profile_pic)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                PortError::Conflict(format!("User with email {} already exists", new_user.email))
            }
            _ => unexpected(e),
        })?;

        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT id, name, email, profile_pic, created_at, password_hash \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", email)),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, email, profile_pic, created_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", user_id)),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn list_users_except(&self, user_id: Uuid) -> PortResult<Vec<User>> {
        let records = sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, email, profile_pic, created_at FROM users \
             WHERE id <> $1 ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn create_auth_session(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(token)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, token: &str) -> PortResult<Uuid> {
        let user_id: Option<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        if user_id.is_none() {
            // The token may exist but be expired.
            sqlx::query("DELETE FROM auth_sessions WHERE id = $1 AND expires_at <= NOW()")
                .bind(token)
                .execute(&self.pool)
                .await
                .map_err(unexpected)?;
        }

        user_id.ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, token: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn create_project(&self, name: &str, owner_id: Uuid) -> PortResult<Project> {
        let record = sqlx::query_as::<_, ProjectRecord>(
            "INSERT INTO projects (id, name, users) VALUES ($1, $2, $3) \
             RETURNING id, name, users, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(vec![owner_id])
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_projects_for_user(&self, user_id: Uuid) -> PortResult<Vec<Project>> {
        let records = sqlx::query_as::<_, ProjectRecord>(
            "SELECT id, name, users, created_at FROM projects \
             WHERE $1 = ANY(users) ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }
}
