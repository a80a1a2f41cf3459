use lab_portal::{
    AppState,
    config::{AppConfig, DataBackend, Env, StorageBackend},
    create_router,
    repository::{MemoryRepository, PostgresRepository, RepositoryState},
    storage::{LocalDiskStorage, S3StorageClient, StorageState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point: configuration, logging, persistence, upload storage, then the HTTP server.
/// Any startup failure aborts the process.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load().expect("FATAL: Invalid configuration");

    // 2. Logging Filter Setup
    // RUST_LOG wins; otherwise verbose for this crate and the HTTP stack.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lab_portal=debug,tower_http=info,axum=trace".into());

    // 3. Initialize Logging based on Environment
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // JSON lines for the log aggregator.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Persistence Initialization
    let repo: RepositoryState = match &config.data {
        DataBackend::Postgres {
            url,
            max_connections,
        } => {
            let pool = PgPoolOptions::new()
                .max_connections(*max_connections)
                .connect(url)
                .await
                .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("FATAL: Database migrations failed");
            tracing::info!("Database migrations applied");

            Arc::new(PostgresRepository::new(pool))
        }
        DataBackend::Memory => {
            tracing::warn!("DATA_BACKEND=memory: content is kept in process memory only");
            Arc::new(MemoryRepository::new())
        }
    };

    // 5. Upload Storage Initialization
    let storage: StorageState = match &config.storage {
        StorageBackend::Local { dir } => {
            tracing::info!(
                dir = %dir.display(),
                prefix = %config.uploads_public_prefix,
                "Serving uploads from local directory"
            );
            Arc::new(LocalDiskStorage::new(
                dir.clone(),
                config.uploads_public_prefix.clone(),
            ))
        }
        StorageBackend::S3 {
            endpoint,
            region,
            access_key,
            secret_key,
            bucket,
            public_url,
        } => Arc::new(S3StorageClient::new(
            endpoint, region, access_key, secret_key, bucket, public_url,
        )),
    };
    storage
        .ensure_ready()
        .await
        .expect("FATAL: Upload storage is not usable");

    // 6. Unified State Assembly
    let port = config.port;
    let app_state = AppState {
        repo,
        storage,
        config,
    };

    // 7. Router and Server Startup
    let app = create_router(app_state);

    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .expect("FATAL: Could not bind the HTTP port");

    tracing::info!("Listening on 0.0.0.0:{port}");
    tracing::info!("API Documentation (Swagger UI) available at: http://localhost:{port}/swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated");
}
