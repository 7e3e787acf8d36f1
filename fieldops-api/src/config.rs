/// Configuration management for the API server
///
/// Loads configuration from environment variables into a typed struct at
/// startup. The process fails fast when the signing secret is absent
/// (no token can ever be issued or verified without it) instead of
/// discovering the problem on the first login.
///
/// # Environment Variables
///
/// - `API_HOST`: host to bind to (default: 0.0.0.0)
/// - `API_PORT`: port to bind to (default: 3000)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `JWT_SECRET`: token signing secret (required)
/// - `JWT_EXPIRES_IN`: token expiry window (default: 7d)
/// - `HASH_SECRET`: process-wide credential hashing secret (defaults to a
///   built-in fallback, with a warning; set it in any real deployment)
/// - `REDIS_URL`: queue backend URL (default: redis://localhost:6379)
/// - `QUEUE_NAME`: notification queue name (default: default)

use fieldops_shared::auth::token::{parse_expiry, DEFAULT_EXPIRY};
use fieldops_shared::db::pool::DatabaseConfig;
use fieldops_shared::queue::QueueConfig;
use std::env;
use std::fmt;

/// Fallback hashing secret used when `HASH_SECRET` is unset.
///
/// A deployment that keeps it loses the protection the process-wide
/// secret adds over a leaked storage dump.
const DEFAULT_HASH_SECRET: &str = "random-password";

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Notification queue configuration
    pub queue: QueueConfig,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,
}

/// Authentication configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Token signing secret
    pub jwt_secret: String,

    /// Token expiry window
    pub token_ttl: chrono::Duration,

    /// Process-wide credential hashing secret
    pub hash_secret: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // never print the secrets
        f.debug_struct("AuthConfig")
            .field("token_ttl", &self.token_ttl)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` or `JWT_SECRET` is missing, or
    /// if any variable has an unparseable value.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        let token_ttl =
            parse_expiry(&env::var("JWT_EXPIRES_IN").unwrap_or_else(|_| DEFAULT_EXPIRY.to_string()))?;

        let hash_secret = env::var("HASH_SECRET").unwrap_or_else(|_| {
            tracing::warn!("HASH_SECRET is not set, falling back to the built-in default");
            DEFAULT_HASH_SECRET.to_string()
        });

        let queue_url =
            env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let queue_name = env::var("QUEUE_NAME").unwrap_or_else(|_| "default".to_string());

        Ok(Self {
            api: ApiConfig { host, port },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                ..Default::default()
            },
            auth: AuthConfig {
                jwt_secret,
                token_ttl,
                hash_secret,
            },
            queue: QueueConfig {
                url: queue_url,
                queue: queue_name,
            },
        })
    }

    /// Returns the server bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
