//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use redis::{ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Connection settings for the Redis cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
}

impl RedisConfig {
    /// Connection parameters for the Redis client. The password is passed as
    /// a field so it needs no URL escaping.
    pub fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo {
            addr: ConnectionAddr::Tcp(self.host.clone(), self.port),
            redis: RedisConnectionInfo {
                password: self.password.clone(),
                ..Default::default()
            },
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub cors_origin: String,
    /// `None` when `REDIS_HOST` is unset; caching is then disabled.
    pub redis: Option<RedisConfig>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level = load_log_level()?;

        let cors_origin = std::env::var("CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:5173".to_string());

        // --- Load Cache Settings ---
        let redis = match std::env::var("REDIS_HOST") {
            Ok(host) if !host.trim().is_empty() => {
                let port_str =
                    std::env::var("REDIS_PORT").unwrap_or_else(|_| "6379".to_string());
                let port = port_str.parse::<u16>().map_err(|e| {
                    ConfigError::InvalidValue("REDIS_PORT".to_string(), e.to_string())
                })?;
                let password = std::env::var("REDIS_PASSWORD")
                    .ok()
                    .filter(|p| !p.is_empty());
                Some(RedisConfig {
                    host,
                    port,
                    password,
                })
            }
            _ => None,
        };

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            cors_origin,
            redis,
        })
    }

    /// A configuration suitable for tests: in-memory database, no cache.
    pub fn in_memory() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 0)),
            database_url: "memory://".to_string(),
            log_level: Level::INFO,
            cors_origin: "http://localhost:5173".to_string(),
            redis: None,
        }
    }

    /// Whether `DATABASE_URL` selects the in-memory adapter.
    pub fn uses_memory_db(&self) -> bool {
        self.database_url.starts_with("memory:")
    }
}

/// Reads `RUST_LOG` as a single level, defaulting to `INFO`.
pub fn load_log_level() -> Result<Level, ConfigError> {
    let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
    log_level_str.parse::<Level>().map_err(|_| {
        ConfigError::InvalidValue(
            "RUST_LOG".to_string(),
            format!("'{}' is not a valid log level", log_level_str),
        )
    })
}
