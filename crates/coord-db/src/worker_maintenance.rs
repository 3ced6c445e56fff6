use chrono::{DateTime, Utc};

use crate::{error::DbError, rows::WorkerMaintenanceRow, Db};

impl Db {
    /// Maintenance windows covering `at`, scoped to `worker_type` and/or
    /// `chain_id` when set, global otherwise (§4.1 step 1's gating check).
    pub async fn list_active_maintenance(
        &self,
        worker_type: &str,
        chain_id: Option<i64>,
        at: DateTime<Utc>,
    ) -> Result<Vec<WorkerMaintenanceRow>, DbError> {
        sqlx::query_as::<_, WorkerMaintenanceRow>(
            "SELECT id, worker_type, chain_id, start_time, end_time, reason
             FROM worker_maintenance
             WHERE start_time <= $3 AND end_time > $3
               AND (worker_type IS NULL OR worker_type = $1)
               AND (chain_id IS NULL OR chain_id = $2)",
        )
        .bind(worker_type)
        .bind(chain_id)
        .bind(at)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)
    }
}
