//! services/api/src/bin/fix_index.rs
//!
//! Repairs the secondary indexes on the `users` table. Exits 1 only when the
//! database cannot be reached.

use api_lib::config::load_log_level;
use api_lib::maintenance::{repair_user_indexes, PgIndexCatalog};
use sqlx::postgres::PgPoolOptions;
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_DATABASE_URL: &str = "postgres://localhost:5432/test";

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let log_level = load_log_level().unwrap_or(Level::INFO);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    info!("Connecting to database...");
    let pool = match PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            error!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let report = repair_user_indexes(&PgIndexCatalog::new(pool.clone())).await;
    info!(
        "Dropped {} secondary index(es){}",
        report.dropped.len(),
        if report.legacy_dropped {
            " after removing the legacy index".to_string()
        } else {
            String::new()
        }
    );

    pool.close().await;
    ExitCode::SUCCESS
}
