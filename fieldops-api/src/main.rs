//! # FieldOps API Server binary
//!
//! Boot order: configuration → database pool → schema → seed data →
//! queue connection → router → serve. The queue is allowed to be down at
//! startup (notifications degrade to warnings); a missing `JWT_SECRET`
//! or unreachable database is fatal.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p fieldops-api
//! ```

use fieldops_api::{
    app::{build_router, AppState},
    config::Config,
};
use fieldops_shared::{
    auth::hasher::CredentialHasher,
    db::{pool::create_pool, schema::ensure_schema, seed::seed_defaults},
    queue::QueueClient,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fieldops_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!(
        "FieldOps API v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let pool = create_pool(config.database.clone()).await?;
    ensure_schema(&pool).await?;

    let hasher = CredentialHasher::new(config.auth.hash_secret.clone());
    seed_defaults(&pool, &hasher).await?;

    let notifier = match QueueClient::connect(&config.queue).await {
        Ok(client) => Some(client),
        Err(err) => {
            tracing::warn!(
                error = %err,
                "queue unavailable, task notifications will be dropped"
            );
            None
        }
    };

    let bind_address = config.bind_address();
    let state = AppState::new(pool, config, notifier);
    let app = build_router(state.clone());

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("server running on http://{bind_address}/");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(queue) = &state.notifier {
        queue.close();
    }
    tracing::info!("shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    tracing::info!("shutdown signal received");
}
