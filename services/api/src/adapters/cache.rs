//! services/api/src/adapters/cache.rs
//!
//! Implementations of the `CacheService` port: a Redis-backed client opened
//! once at startup, and a disabled variant used when no Redis host is configured.

use async_trait::async_trait;
use codewithchat_core::ports::{CacheService, PortError, PortResult};
use redis::{
    aio::{ConnectionManager, ConnectionManagerConfig},
    Client,
};
use tracing::info;

use crate::config::RedisConfig;

/// A cache adapter holding a shared, auto-reconnecting Redis connection.
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
}

impl RedisCache {
    /// Opens the connection described by `config`.
    pub async fn connect(config: &RedisConfig) -> Result<Self, redis::RedisError> {
        info!("Connecting to Redis at {} {}", config.host, config.port);
        let manager_config = ConnectionManagerConfig::new().set_number_of_retries(1);

        let client = Client::open(config.connection_info())?;
        let connection = client
            .get_connection_manager_with_config(manager_config)
            .await?;
        info!("Redis connected");

        Ok(Self { connection })
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn ping(&self) -> PortResult<bool> {
        let mut connection = self.connection.clone();
        let reply: String = redis::cmd("PING")
            .query_async(&mut connection)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(reply == "PONG")
    }
}

/// Stand-in used when `REDIS_HOST` is not set.
#[derive(Clone, Default)]
pub struct DisabledCache;

#[async_trait]
impl CacheService for DisabledCache {
    async fn ping(&self) -> PortResult<bool> {
        Ok(false)
    }
}
