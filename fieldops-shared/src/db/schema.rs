/// Idempotent schema bootstrap
///
/// Creates the tables the API expects if they do not exist yet. Every
/// statement is `IF NOT EXISTS`, so running the bootstrap on every start
/// is safe.
///
/// The unique index on `users.email` is deliberate: registration performs
/// a non-transactional check-then-create, and the index is the
/// storage-level backstop that keeps a racing duplicate registration from
/// producing two accounts.

use sqlx::PgPool;
use tracing::info;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS roles (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        name VARCHAR(255) NOT NULL UNIQUE,
        permissions TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        name VARCHAR(255) NOT NULL,
        email VARCHAR(255) NOT NULL UNIQUE,
        role_id UUID NOT NULL REFERENCES roles(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS auth_credentials (
        user_id UUID PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
        password VARCHAR(64) NOT NULL,
        salt TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tasks (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        name VARCHAR(255) NOT NULL,
        summary TEXT NOT NULL,
        date_performed TIMESTAMPTZ,
        user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
];

/// Applies the schema, creating any missing tables.
///
/// # Errors
///
/// Returns an error if any DDL statement fails.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("database schema ready");
    Ok(())
}
