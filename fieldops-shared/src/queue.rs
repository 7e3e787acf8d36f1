/// Notification queue client
///
/// The queue is a durable named Redis list shared by the API (producer)
/// and the worker (consumer). The API publishes a human-readable line
/// whenever a task is marked performed; the worker drains the list and
/// logs each message.
///
/// One client is created at process start and reused for the life of the
/// process. The underlying `ConnectionManager` multiplexes commands over a
/// single connection and reconnects on failure; a send issued while the
/// connection is down returns an error that the caller is expected to
/// catch; the perform flow treats delivery as best-effort and never fails
/// the HTTP response over it.
///
/// # Example
///
/// ```no_run
/// use fieldops_shared::queue::{QueueClient, QueueConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = QueueClient::connect(&QueueConfig {
///     url: "redis://localhost:6379".to_string(),
///     queue: "default".to_string(),
/// })
/// .await?;
///
/// client.send("Task 'Replace filter' was performed by technician").await?;
/// # Ok(())
/// # }
/// ```

use redis::aio::ConnectionManager;
use redis::{Client, RedisError};
use thiserror::Error;
use tracing::{debug, info};

/// How long a blocking receive waits before returning empty (seconds).
const RECEIVE_BLOCK_SECS: u64 = 5;

/// Queue connection settings.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Redis connection URL, e.g. `redis://localhost:6379`
    pub url: String,

    /// Name of the queue (Redis list key)
    pub queue: String,
}

/// Queue client errors.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Could not reach the queue backend
    #[error("queue connection error: {0}")]
    Connection(String),

    /// A queue command failed
    #[error("queue command error: {0}")]
    Command(String),
}

impl From<RedisError> for QueueError {
    fn from(err: RedisError) -> Self {
        match err.kind() {
            redis::ErrorKind::IoError => QueueError::Connection(format!("IO error: {}", err)),
            _ => QueueError::Command(err.to_string()),
        }
    }
}

/// Handle to the named notification queue.
#[derive(Clone)]
pub struct QueueClient {
    manager: ConnectionManager,
    queue: String,
}

impl QueueClient {
    /// Connects to the queue backend.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Connection`] if the backend is unreachable.
    pub async fn connect(config: &QueueConfig) -> Result<Self, QueueError> {
        let client = Client::open(config.url.as_str())?;
        let manager = ConnectionManager::new(client).await?;

        info!(queue = %config.queue, "queue connection established");

        Ok(Self {
            manager,
            queue: config.queue.clone(),
        })
    }

    /// The name of the queue this client talks to.
    pub fn queue_name(&self) -> &str {
        &self.queue
    }

    /// Publishes one message onto the tail of the queue.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend is unreachable; the message is
    /// then lost. Callers that treat delivery as best-effort must catch
    /// this instead of propagating it.
    pub async fn send(&self, message: &str) -> Result<(), QueueError> {
        let mut conn = self.manager.clone();

        redis::cmd("RPUSH")
            .arg(&self.queue)
            .arg(message)
            .query_async::<_, i64>(&mut conn)
            .await?;

        debug!(queue = %self.queue, "message enqueued");
        Ok(())
    }

    /// Takes one message from the head of the queue, blocking briefly.
    ///
    /// Returns `None` when the queue stayed empty for the whole wait.
    pub async fn receive(&self, block_secs: u64) -> Result<Option<String>, QueueError> {
        let mut conn = self.manager.clone();

        let reply: Option<(String, String)> = redis::cmd("BLPOP")
            .arg(&self.queue)
            .arg(block_secs)
            .query_async(&mut conn)
            .await?;

        Ok(reply.map(|(_, message)| message))
    }

    /// Drains the queue, invoking the handler for every message.
    ///
    /// Runs until a queue error occurs; callers decide whether to retry.
    pub async fn consume<F>(&self, mut handler: F) -> Result<(), QueueError>
    where
        F: FnMut(String),
    {
        loop {
            if let Some(message) = self.receive(RECEIVE_BLOCK_SECS).await? {
                handler(message);
            }
        }
    }

    /// Health check against the queue backend.
    pub async fn ping(&self) -> Result<(), QueueError> {
        let mut conn = self.manager.clone();

        redis::cmd("PING").query_async::<_, String>(&mut conn).await?;

        Ok(())
    }

    /// Marks the client closed. The multiplexed connection is torn down
    /// when the last clone of the client drops; this exists so shutdown
    /// paths can be explicit about it.
    pub fn close(&self) {
        debug!(queue = %self.queue, "queue connection closing");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_holds_url_and_queue() {
        let config = QueueConfig {
            url: "redis://localhost:6379".to_string(),
            queue: "notifications".to_string(),
        };

        assert_eq!(config.queue, "notifications");
        assert!(config.url.starts_with("redis://"));
    }

    #[test]
    fn test_invalid_url_is_a_connection_error() {
        let err = Client::open("not-a-redis-url").unwrap_err();
        let err: QueueError = err.into();

        assert!(matches!(err, QueueError::Connection(_) | QueueError::Command(_)));
    }
}
