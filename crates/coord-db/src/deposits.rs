use chrono::{DateTime, Utc};

use crate::{error::DbError, rows::DepositRow, Db};

const DEPOSIT_COLUMNS: &str = "id, chain_id, asset_on_chain_id, tx_hash, log_index, to_address,
    amount_raw, amount_human, block_number, status, confirmations, first_seen_block,
    confirmed_at, credited_at";

impl Db {
    /// Inserts a newly observed on-chain transfer, or no-ops if this
    /// `(tx_hash, log_index)` has already been recorded (§4.6 step 1: the
    /// scanner may see the same log more than once across restarts).
    #[allow(clippy::too_many_arguments, reason = "mirrors the deposits table shape 1:1")]
    pub async fn insert_deposit_if_new(
        &self,
        chain_id: i64,
        asset_on_chain_id: i64,
        tx_hash: &str,
        log_index: i32,
        to_address: &str,
        amount_raw: &str,
        amount_human: &str,
        block_number: i64,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            "INSERT INTO deposits
                (chain_id, asset_on_chain_id, tx_hash, log_index, to_address, amount_raw,
                 amount_human, block_number, first_seen_block)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
             ON CONFLICT (tx_hash, log_index) DO NOTHING",
        )
        .bind(chain_id)
        .bind(asset_on_chain_id)
        .bind(tx_hash)
        .bind(log_index)
        .bind(to_address)
        .bind(amount_raw)
        .bind(amount_human)
        .bind(block_number)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn get_deposit(&self, id: i64) -> Result<DepositRow, DbError> {
        let sql = format!("SELECT {DEPOSIT_COLUMNS} FROM deposits WHERE id = $1");
        sqlx::query_as::<_, DepositRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DbError::NotFound { what: "deposits" })
    }

    pub async fn list_pending_deposits(&self, chain_id: i64, limit: i64) -> Result<Vec<DepositRow>, DbError> {
        let sql = format!(
            "SELECT {DEPOSIT_COLUMNS} FROM deposits
             WHERE chain_id = $1 AND status = 'pending'
             ORDER BY id ASC LIMIT $2"
        );
        sqlx::query_as::<_, DepositRow>(&sql)
            .bind(chain_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)
    }

    pub async fn update_deposit_confirmations(&self, id: i64, confirmations: i32) -> Result<(), DbError> {
        sqlx::query("UPDATE deposits SET confirmations = $2 WHERE id = $1")
            .bind(id)
            .bind(confirmations)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Conditionally flips `pending -> confirmed` (§4.6 step 3). Returns
    /// `false` if another runner already confirmed this deposit, which is
    /// the caller's signal to skip crediting the ledger a second time.
    pub async fn try_mark_deposit_confirmed(&self, id: i64, confirmed_at: DateTime<Utc>) -> Result<bool, DbError> {
        let result = sqlx::query(
            "UPDATE deposits SET status = 'confirmed', confirmed_at = $2
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .bind(confirmed_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Deposits that are `confirmed` but not yet `credited_at` (§4.6 step
    /// 4): the gate that makes crediting the ledger idempotent even if the
    /// process crashes between confirming and crediting.
    pub async fn list_uncredited_confirmed_deposits(&self, limit: i64) -> Result<Vec<DepositRow>, DbError> {
        let sql = format!(
            "SELECT {DEPOSIT_COLUMNS} FROM deposits
             WHERE status = 'confirmed' AND credited_at IS NULL
             ORDER BY id ASC LIMIT $1"
        );
        sqlx::query_as::<_, DepositRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)
    }

    pub async fn try_mark_deposit_credited(&self, id: i64, credited_at: DateTime<Utc>) -> Result<bool, DbError> {
        let result = sqlx::query(
            "UPDATE deposits SET credited_at = $2
             WHERE id = $1 AND status = 'confirmed' AND credited_at IS NULL",
        )
        .bind(id)
        .bind(credited_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
