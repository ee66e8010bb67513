//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{JsonFileStore, PgDonorStore},
    config::{Config, StorageBackend},
    error::ApiError,
    web::{self, state::AppState},
};
use bloodreach_core::{
    AdminPolicy, Clock, DonorRepository, DonorStore, InMemoryKeyValueStore, KeyValueStore,
    KvDonorStore, SessionLifetime, SystemClock,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Open Storage ---
    // Sessions always live in the key-value store; donors may move to Postgres.
    let kv: Arc<dyn KeyValueStore> = match config.storage_backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on exit");
            Arc::new(InMemoryKeyValueStore::new())
        }
        StorageBackend::File | StorageBackend::Postgres => {
            info!("Using key-value file at {}", config.data_path.display());
            Arc::new(JsonFileStore::new(config.data_path.clone()))
        }
    };

    let donor_store: Arc<dyn DonorStore> = match config.storage_backend {
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| ApiError::Internal("DATABASE_URL is required".to_string()))?;
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            let pg_store = PgDonorStore::new(db_pool);
            info!("Running database migrations...");
            pg_store.run_migrations().await?;
            info!("Database migrations complete.");
            Arc::new(pg_store)
        }
        StorageBackend::File | StorageBackend::Memory => {
            Arc::new(KvDonorStore::new(kv.clone(), &config.app_name))
        }
    };

    // --- 3. Build the Repository ---
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let repo = DonorRepository::new(donor_store, clock.clone())
        .with_latency(config.latency)
        .with_stats_offsets(config.stats_offsets);
    let donors = repo.initialize().await?;
    info!("Donor collection ready with {} records", donors.len());

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        repo: Arc::new(repo),
        sessions: kv,
        admin_policy: Arc::new(AdminPolicy::new(config.admin_emails.clone())),
        session_lifetime: SessionLifetime::expiring(clock, config.session_max_age),
        config: config.clone(),
    });
    let purged = app_state.purge_expired_sessions().await?;
    info!("Session store ready; {} expired sessions removed", purged);

    // --- 5. Create the Web Router ---
    let app = web::router(app_state)?;

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
