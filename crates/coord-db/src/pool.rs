use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::error::DbError;

/// Connects with the same tuned pool shape the teacher uses for its RPC
/// clients: bounded size, short acquire timeout, so a stuck connection
/// surfaces as a retryable error instead of hanging a worker cycle.
pub async fn connect(db_url: &str) -> Result<PgPool, DbError> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect(db_url)
        .await?;
    Ok(pool)
}

/// Applies `migrations/` in order. Gated behind an explicit opt-in flag
/// at the call site (bin/*-worker `--migrate`) rather than run
/// unconditionally on every start, so a fleet of worker processes never
/// races each other to apply the same migration.
pub async fn migrate(pool: &PgPool) -> Result<(), DbError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
