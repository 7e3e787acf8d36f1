/// Application state and router builder
///
/// Defines the shared application state and assembles the Axum router:
/// public auth routes, the protected task routes behind the access gate,
/// and the health check.
///
/// # Router layout
///
/// ```text
/// /
/// ├── /health                    # public
/// ├── /auth/
/// │   ├── POST /register         # public
/// │   └── POST /login            # public
/// └── /tasks/                    # bearer token required (access gate)
///     ├── GET    /               # read_my_tasks
///     ├── POST   /               # create_task
///     ├── GET    /all            # read_all_tasks
///     ├── GET    /:task_id       # read_my_tasks
///     ├── PATCH  /:task_id       # update_task
///     └── DELETE /:task_id       # delete_task
/// ```
///
/// The access gate only authenticates; the per-operation permission
/// checks live in the task handlers.

use crate::{config::Config, routes};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    routing::get,
    Router,
};
use fieldops_shared::auth::{
    hasher::CredentialHasher,
    middleware::{authenticate, AuthError},
    token::TokenIssuer,
};
use fieldops_shared::queue::QueueClient;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state.
///
/// Cloned into every request handler via Axum's `State` extractor; the
/// expensive members sit behind `Arc`, and `PgPool` is internally shared.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Token issuer/verifier
    pub tokens: Arc<TokenIssuer>,

    /// Credential hasher
    pub hasher: Arc<CredentialHasher>,

    /// Notification queue, None when the backend was unreachable at start
    pub notifier: Option<Arc<QueueClient>>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates application state from configuration and live collaborators.
    pub fn new(db: PgPool, config: Config, notifier: Option<QueueClient>) -> Self {
        let tokens = Arc::new(TokenIssuer::new(
            &config.auth.jwt_secret,
            config.auth.token_ttl,
        ));
        let hasher = Arc::new(CredentialHasher::new(config.auth.hash_secret.clone()));

        Self {
            db,
            tokens,
            hasher,
            notifier: notifier.map(Arc::new),
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", axum::routing::post(routes::auth::register))
        .route("/login", axum::routing::post(routes::auth::login));

    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_mine).post(routes::tasks::create),
        )
        .route("/all", get(routes::tasks::list_all))
        // GET /:task_id shares the listing handler; the path id is not used
        .route(
            "/:task_id",
            get(routes::tasks::list_mine)
                .patch(routes::tasks::perform)
                .delete(routes::tasks::delete),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            access_gate,
        ));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/auth", auth_routes)
        .nest("/tasks", task_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Access gate run before every protected route.
///
/// Verifies the bearer token and attaches the resulting [`AuthContext`]
/// (identity + typed permission set) to the request extensions. Rejected
/// requests never reach a handler.
///
/// [`AuthContext`]: fieldops_shared::auth::middleware::AuthContext
async fn access_gate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let ctx = authenticate(&state.tokens, req.headers())?;
    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}
