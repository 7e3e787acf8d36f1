//! # FieldOps Worker
//!
//! Drains the notification queue and logs every message. The API
//! publishes one line per performed task; this process is the consumer
//! side of that fire-and-forget channel.
//!
//! Queue errors are retried with a short backoff so a Redis restart does
//! not kill the worker; ctrl-c shuts it down.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p fieldops-worker
//! ```

use fieldops_shared::queue::{QueueClient, QueueConfig};
use std::env;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const RETRY_DELAY: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fieldops_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = QueueConfig {
        url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
        queue: env::var("QUEUE_NAME").unwrap_or_else(|_| "default".to_string()),
    };

    tracing::info!(
        "FieldOps Worker v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let queue = QueueClient::connect(&config)
        .await
        .map_err(|err| anyhow::anyhow!("could not reach the queue backend: {err}"))?;

    tracing::info!(queue = queue.queue_name(), "waiting for notifications");

    tokio::select! {
        _ = drain(&queue) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received, exiting...");
        }
    }

    queue.close();

    Ok(())
}

/// Consumes the queue forever, logging each notification and retrying
/// after queue errors.
async fn drain(queue: &QueueClient) {
    loop {
        let result = queue
            .consume(|message| tracing::info!(%message, "received notification"))
            .await;

        if let Err(err) = result {
            tracing::warn!(error = %err, "queue read failed, retrying");
            tokio::time::sleep(RETRY_DELAY).await;
        }
    }
}
