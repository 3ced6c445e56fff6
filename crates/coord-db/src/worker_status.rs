use serde_json::Value;

use crate::{error::DbError, Db};

impl Db {
    /// Upserts the row this process owns at startup (§4.1 step 1,
    /// §6.6's `worker_id = "<worker_type>_<pid>"` convention). A restart
    /// under the same pid (rare, but possible in a container that reuses
    /// pid 1) simply re-registers as `starting`.
    pub async fn register_worker(
        &self,
        worker_id: &str,
        worker_type: &str,
        chain_id: Option<i64>,
    ) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO worker_status (worker_id, worker_type, chain_id, status, health_status)
             VALUES ($1, $2, $3, 'starting', 'unknown')
             ON CONFLICT (worker_id) DO UPDATE SET
                status = 'starting', health_status = 'unknown', started_at = now(),
                updated_at = now()",
        )
        .bind(worker_id)
        .bind(worker_type)
        .bind(chain_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Heartbeat write (§4.1 step 2, period `H`).
    pub async fn heartbeat(
        &self,
        worker_id: &str,
        status: &str,
        health_status: &str,
        current_metrics: Option<Value>,
    ) -> Result<(), DbError> {
        sqlx::query(
            "UPDATE worker_status
             SET status = $2, health_status = $3, current_metrics = $4, updated_at = now()
             WHERE worker_id = $1",
        )
        .bind(worker_id)
        .bind(status)
        .bind(health_status)
        .bind(current_metrics)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn record_cycle_counts(
        &self,
        worker_id: &str,
        processed_delta: i64,
        success_delta: i64,
        failed_delta: i64,
    ) -> Result<(), DbError> {
        sqlx::query(
            "UPDATE worker_status
             SET jobs_processed = jobs_processed + $2, jobs_success = jobs_success + $3,
                 jobs_failed = jobs_failed + $4, updated_at = now()
             WHERE worker_id = $1",
        )
        .bind(worker_id)
        .bind(processed_delta)
        .bind(success_delta)
        .bind(failed_delta)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Graceful-shutdown write (§4.1: "sets `status=stopped, health=unknown`").
    pub async fn mark_stopped(&self, worker_id: &str) -> Result<(), DbError> {
        sqlx::query(
            "UPDATE worker_status SET status = 'stopped', health_status = 'unknown', updated_at = now()
             WHERE worker_id = $1",
        )
        .bind(worker_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
