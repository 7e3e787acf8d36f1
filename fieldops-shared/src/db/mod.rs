/// Database plumbing
///
/// - `pool`: PostgreSQL connection pool management
/// - `schema`: idempotent schema bootstrap
/// - `seed`: default roles and accounts

pub mod pool;
pub mod schema;
pub mod seed;
