/// Shared test harness for router-level tests
///
/// Builds the full application router against a lazily-connected pool
/// pointing at an unroutable address, so any code path that touches
/// storage fails loudly with a 500. The tests in this suite only exercise
/// paths that must short-circuit before storage, which makes the lazy
/// pool an assertion in itself.

use axum::Router;
use chrono::Duration;
use fieldops_api::{
    app::{build_router, AppState},
    config::{ApiConfig, AuthConfig, Config},
};
use fieldops_shared::auth::token::TokenIssuer;
use fieldops_shared::db::pool::DatabaseConfig;
use fieldops_shared::models::role::RoleSummary;
use fieldops_shared::models::user::UserProfile;
use fieldops_shared::queue::QueueConfig;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

const TEST_SECRET: &str = "router-test-signing-secret";

pub struct TestContext {
    pub app: Router,
    tokens: TokenIssuer,
}

impl TestContext {
    pub fn new() -> Self {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            database: DatabaseConfig {
                // unroutable on purpose: storage must never be reached
                url: "postgresql://127.0.0.1:1/fieldops_test".to_string(),
                ..Default::default()
            },
            auth: AuthConfig {
                jwt_secret: TEST_SECRET.to_string(),
                token_ttl: Duration::days(1),
                hash_secret: "random-password".to_string(),
            },
            queue: QueueConfig {
                url: "redis://127.0.0.1:1".to_string(),
                queue: "default".to_string(),
            },
        };

        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database.url)
            .expect("lazy pool should accept the URL");

        let state = AppState::new(pool, config, None);

        Self {
            app: build_router(state),
            tokens: TokenIssuer::new(TEST_SECRET, Duration::days(1)),
        }
    }

    /// Builds a bearer header value for a caller with the given permissions.
    pub fn bearer_for(&self, name: &str, permissions: &str) -> String {
        let profile = UserProfile {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{name}@mail.com"),
            role: RoleSummary {
                name: "TestRole".to_string(),
                permissions: permissions.to_string(),
            },
        };

        let token = self.tokens.sign(&profile).expect("should sign test token");
        format!("Bearer {token}")
    }
}
