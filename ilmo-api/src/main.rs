//! # Ilmo Web Server
//!
//! Serves the public event registration pages and the admin API.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/ilmo ADMIN_TOKEN=change-me-please-0000 \
//!     cargo run -p ilmo-api
//! ```

use ilmo_api::{
    app::{build_router, AppState},
    config::Config,
};
use ilmo_shared::db::{
    migrations::run_migrations,
    pool::{close_pool, create_pool, PoolConfig},
};
use ilmo_shared::gender::GenderClassifier;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ilmo_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Ilmo server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    let pool = create_pool(PoolConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..PoolConfig::default()
    })
    .await?;

    run_migrations(&pool).await?;

    let classifier = GenderClassifier::load(&config.resource_path)?;

    let bind_address = config.bind_address();
    let state = AppState::new(pool.clone(), config, classifier);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown signal received, closing database pool...");
    close_pool(pool).await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
