use chrono::{DateTime, Utc};

use crate::{error::DbError, rows::ConsolidationQueueRow, Db};

const CQ_COLUMNS: &str = "id, wallet_balance_id, wallet_id, chain_id, asset_on_chain_id,
    operation_wallet_address_id, amount_raw, amount_human, status, priority, tx_hash,
    retry_count, max_retries, error_message, scheduled_at, processed_at, gas_used, gas_price";

impl Db {
    #[allow(clippy::too_many_arguments, reason = "mirrors the consolidation_queue table shape 1:1")]
    pub async fn insert_consolidation_job(
        &self,
        wallet_balance_id: i64,
        wallet_id: i64,
        chain_id: i64,
        asset_on_chain_id: i64,
        operation_wallet_address_id: i64,
        amount_raw: &str,
        amount_human: &str,
    ) -> Result<i64, DbError> {
        let row: (i64,) = sqlx::query_as(
            "INSERT INTO consolidation_queue
                (wallet_balance_id, wallet_id, chain_id, asset_on_chain_id,
                 operation_wallet_address_id, amount_raw, amount_human)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id",
        )
        .bind(wallet_balance_id)
        .bind(wallet_id)
        .bind(chain_id)
        .bind(asset_on_chain_id)
        .bind(operation_wallet_address_id)
        .bind(amount_raw)
        .bind(amount_human)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    pub async fn list_claimable_consolidation_jobs(
        &self,
        chain_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<ConsolidationQueueRow>, DbError> {
        let order = "ORDER BY CASE priority WHEN 'high' THEN 0 WHEN 'normal' THEN 1 ELSE 2 END,
                scheduled_at ASC";
        match chain_id {
            Some(cid) => {
                let sql = format!(
                    "SELECT {CQ_COLUMNS} FROM consolidation_queue
                     WHERE chain_id = $1 AND status = 'pending' AND scheduled_at <= now()
                       AND retry_count < max_retries
                     {order} LIMIT $2"
                );
                sqlx::query_as::<_, ConsolidationQueueRow>(&sql)
                    .bind(cid)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(DbError::from)
            }
            None => {
                let sql = format!(
                    "SELECT {CQ_COLUMNS} FROM consolidation_queue
                     WHERE status = 'pending' AND scheduled_at <= now()
                       AND retry_count < max_retries
                     {order} LIMIT $1"
                );
                sqlx::query_as::<_, ConsolidationQueueRow>(&sql)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(DbError::from)
            }
        }
    }

    pub async fn try_claim_consolidation_job(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query(
            "UPDATE consolidation_queue SET status = 'processing' WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn record_consolidation_broadcast(
        &self,
        id: i64,
        tx_hash: &str,
        processed_at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        sqlx::query(
            "UPDATE consolidation_queue
             SET status = 'confirming', tx_hash = $2, processed_at = $3
             WHERE id = $1",
        )
        .bind(id)
        .bind(tx_hash)
        .bind(processed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list_confirming_consolidation_jobs(
        &self,
        chain_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<ConsolidationQueueRow>, DbError> {
        match chain_id {
            Some(cid) => {
                let sql = format!(
                    "SELECT {CQ_COLUMNS} FROM consolidation_queue
                     WHERE chain_id = $1 AND status = 'confirming'
                     ORDER BY processed_at ASC NULLS FIRST LIMIT $2"
                );
                sqlx::query_as::<_, ConsolidationQueueRow>(&sql)
                    .bind(cid)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(DbError::from)
            }
            None => {
                let sql = format!(
                    "SELECT {CQ_COLUMNS} FROM consolidation_queue
                     WHERE status = 'confirming' ORDER BY processed_at ASC NULLS FIRST LIMIT $1"
                );
                sqlx::query_as::<_, ConsolidationQueueRow>(&sql)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(DbError::from)
            }
        }
    }

    pub async fn mark_consolidation_confirmed(
        &self,
        id: i64,
        processed_at: DateTime<Utc>,
        gas_used: Option<&str>,
        gas_price: Option<&str>,
    ) -> Result<(), DbError> {
        sqlx::query(
            "UPDATE consolidation_queue
             SET status = 'confirmed', processed_at = $2, gas_used = $3, gas_price = $4,
                 retry_count = 0, error_message = NULL
             WHERE id = $1",
        )
        .bind(id)
        .bind(processed_at)
        .bind(gas_used)
        .bind(gas_price)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Lock contention on the source wallet (§4.5 step 4): revert a
    /// claimed job back to `pending` without penalty (§7 kind 5).
    pub async fn revert_consolidation_to_pending(&self, id: i64) -> Result<(), DbError> {
        sqlx::query("UPDATE consolidation_queue SET status = 'pending' WHERE id = $1 AND status = 'processing'")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Confirm-stage failure path (§4.6 step 6): terminal, not retried.
    pub async fn fail_consolidation_job(
        &self,
        id: i64,
        error_message: &str,
        processed_at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        sqlx::query(
            "UPDATE consolidation_queue SET status = 'failed', error_message = $2, processed_at = $3
             WHERE id = $1",
        )
        .bind(id)
        .bind(error_message)
        .bind(processed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// On failure, `wallet_balances.needs_consolidation` is left set
    /// rather than cleared (OQ-2): a later cycle simply tries again.
    pub async fn reschedule_or_fail_consolidation_job(
        &self,
        id: i64,
        error_message: &str,
        next_attempt_at: Option<DateTime<Utc>>,
    ) -> Result<(), DbError> {
        match next_attempt_at {
            Some(at) => {
                sqlx::query(
                    "UPDATE consolidation_queue
                     SET status = 'pending', retry_count = retry_count + 1,
                         error_message = $2, scheduled_at = $3
                     WHERE id = $1",
                )
                .bind(id)
                .bind(error_message)
                .bind(at)
                .execute(&self.pool)
                .await?;
            }
            None => {
                sqlx::query(
                    "UPDATE consolidation_queue
                     SET status = 'failed', retry_count = retry_count + 1, error_message = $2
                     WHERE id = $1",
                )
                .bind(id)
                .bind(error_message)
                .execute(&self.pool)
                .await?;
            }
        }
        Ok(())
    }
}
