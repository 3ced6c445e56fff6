use chrono::{DateTime, Utc};

use crate::{error::DbError, rows::WithdrawalRequestRow, Db};

const WR_COLUMNS: &str = "id, user_id, chain_id, asset_on_chain_id, asset_id, to_address,
    amount_human, status, queued_at, final_tx_hash";

impl Db {
    pub async fn get_withdrawal_request(&self, id: i64) -> Result<WithdrawalRequestRow, DbError> {
        let sql = format!("SELECT {WR_COLUMNS} FROM withdrawal_requests WHERE id = $1");
        sqlx::query_as::<_, WithdrawalRequestRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DbError::NotFound { what: "withdrawal_requests" })
    }

    /// Requests approved by an upstream process (out of scope, §1) that
    /// have not yet been pulled into `withdrawal_queue` (§4.7 step 1).
    pub async fn list_approved_unqueued(&self, limit: i64) -> Result<Vec<WithdrawalRequestRow>, DbError> {
        let sql = format!(
            "SELECT {WR_COLUMNS} FROM withdrawal_requests
             WHERE status = 'approved' ORDER BY id ASC LIMIT $1"
        );
        sqlx::query_as::<_, WithdrawalRequestRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)
    }

    pub async fn try_mark_queued(&self, id: i64, queued_at: DateTime<Utc>) -> Result<bool, DbError> {
        let result = sqlx::query(
            "UPDATE withdrawal_requests SET status = 'queued', queued_at = $2
             WHERE id = $1 AND status = 'approved'",
        )
        .bind(id)
        .bind(queued_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn mark_completed(&self, id: i64, final_tx_hash: &str) -> Result<(), DbError> {
        sqlx::query(
            "UPDATE withdrawal_requests SET status = 'completed', final_tx_hash = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(final_tx_hash)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn mark_failed(&self, id: i64) -> Result<(), DbError> {
        sqlx::query("UPDATE withdrawal_requests SET status = 'failed' WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
