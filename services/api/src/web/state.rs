//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::adapters::{DisabledCache, MemoryDb};
use crate::config::Config;
use codewithchat_core::ports::{CacheService, DatabaseService};
use std::sync::Arc;
use uuid::Uuid;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub cache: Arc<dyn CacheService>,
    pub config: Arc<Config>,
}

impl AppState {
    /// State backed by the in-memory database with caching disabled.
    pub fn in_memory() -> Self {
        Self {
            db: Arc::new(MemoryDb::new()),
            cache: Arc::new(DisabledCache),
            config: Arc::new(Config::in_memory()),
        }
    }
}

/// The authenticated caller, inserted into request extensions by `require_auth`.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub token: String,
}
