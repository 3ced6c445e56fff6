use serde_json::Value;

use crate::{error::DbError, Db};

impl Db {
    /// Appends one row per cycle (§4.1 step 3): `success`, `fail`, or
    /// `skip` (maintenance window / incident mode denied this domain).
    pub async fn log_cycle(
        &self,
        worker_id: &str,
        status: &str,
        duration_ms: i64,
        message: Option<&str>,
        metadata: Option<Value>,
    ) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO worker_execution_logs (worker_id, status, duration_ms, message, metadata)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(worker_id)
        .bind(status)
        .bind(duration_ms)
        .bind(message)
        .bind(metadata)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
