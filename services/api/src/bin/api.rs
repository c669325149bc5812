//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, DisabledCache, MemoryDb, RedisCache},
    config::Config,
    error::ApiError,
    web::{build_router, rest::ApiDoc, state::AppState},
};
use codewithchat_core::ports::{CacheService, DatabaseService};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database, Run Migrations & Ensure Indexes ---
    let db: Arc<dyn DatabaseService> = if config.uses_memory_db() {
        warn!("DATABASE_URL selects the in-memory database; data is lost on exit.");
        Arc::new(MemoryDb::new())
    } else {
        info!("Connecting to database...");
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&config.database_url)
            .await?;
        let db_adapter = DbAdapter::new(db_pool);
        info!("Running database migrations...");
        db_adapter.run_migrations().await?;
        db_adapter.ensure_indexes().await?;
        info!("Database migrations complete.");
        Arc::new(db_adapter)
    };

    // --- 3. Connect to the Cache ---
    let cache: Arc<dyn CacheService> = match &config.redis {
        Some(redis_config) => Arc::new(RedisCache::connect(redis_config).await?),
        None => {
            info!("REDIS_HOST not set; caching disabled.");
            Arc::new(DisabledCache)
        }
    };

    // --- 4. Build the Shared AppState & Router ---
    let app_state = Arc::new(AppState {
        db,
        cache,
        config: config.clone(),
    });

    let app = build_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
