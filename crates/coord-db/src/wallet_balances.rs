use chrono::{DateTime, Utc};

use crate::{error::DbError, rows::WalletBalanceRow, Db};

/// Which pair of `*_locked_until` / `*_locked_by` columns a lock
/// operation targets (§4.3). Withdrawals draw from operation wallets
/// directly and do not take a `wallet_balances` lock, so only these two
/// kinds exist at the storage layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletLockKind {
    Consolidation,
    Gas,
}

impl WalletLockKind {
    fn processing_status(self) -> &'static str {
        match self {
            WalletLockKind::Consolidation => "consolidating",
            WalletLockKind::Gas => "gas_topup",
        }
    }
}

impl Db {
    pub async fn get_wallet_balance(&self, id: i64) -> Result<WalletBalanceRow, DbError> {
        sqlx::query_as::<_, WalletBalanceRow>(
            "SELECT id, wallet_id, asset_on_chain_id, available_raw, needs_consolidation,
                    needs_gas, processing_status, consolidation_locked_until,
                    consolidation_locked_by, gas_locked_until, gas_locked_by,
                    last_processed_at, last_consolidation_at
             FROM wallet_balances WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound { what: "wallet_balances" })
    }

    /// Wallets flagged for consolidation or gas top-up and currently idle
    /// or holding a lock that has expired (§4.2 step 1, §4.3's reclaim
    /// rule). Ordering matches the generic claim procedure's
    /// priority-then-age sort by falling back to `id` as a stable tiebreak.
    pub async fn list_consolidation_candidates(
        &self,
        limit: i64,
    ) -> Result<Vec<WalletBalanceRow>, DbError> {
        sqlx::query_as::<_, WalletBalanceRow>(
            "SELECT id, wallet_id, asset_on_chain_id, available_raw, needs_consolidation,
                    needs_gas, processing_status, consolidation_locked_until,
                    consolidation_locked_by, gas_locked_until, gas_locked_by,
                    last_processed_at, last_consolidation_at
             FROM wallet_balances
             WHERE needs_consolidation
               AND (processing_status = 'idle'
                    OR (processing_status = 'consolidating' AND consolidation_locked_until < now()))
             ORDER BY last_consolidation_at ASC NULLS FIRST, id ASC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)
    }

    /// Conditionally transitions a wallet balance into the locked
    /// processing state (§4.3). Succeeds either from `idle`, or by
    /// reclaiming an expired lock of the *same* kind left by a crashed
    /// worker — never by stealing a live lock or one of a different kind.
    /// Returns `true` iff this call won the lock.
    pub async fn try_acquire_wallet_lock(
        &self,
        id: i64,
        kind: WalletLockKind,
        locked_by: &str,
        locked_until: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        let status = kind.processing_status();
        let result = match kind {
            WalletLockKind::Consolidation => {
                sqlx::query(
                    "UPDATE wallet_balances
                     SET processing_status = $2, consolidation_locked_until = $3,
                         consolidation_locked_by = $4
                     WHERE id = $1
                       AND (processing_status = 'idle'
                            OR (processing_status = $2 AND consolidation_locked_until < now()))",
                )
                .bind(id)
                .bind(status)
                .bind(locked_until)
                .bind(locked_by)
                .execute(&self.pool)
                .await?
            }
            WalletLockKind::Gas => {
                sqlx::query(
                    "UPDATE wallet_balances
                     SET processing_status = $2, gas_locked_until = $3, gas_locked_by = $4
                     WHERE id = $1
                       AND (processing_status = 'idle'
                            OR (processing_status = $2 AND gas_locked_until < now()))",
                )
                .bind(id)
                .bind(status)
                .bind(locked_until)
                .bind(locked_by)
                .execute(&self.pool)
                .await?
            }
        };
        Ok(result.rows_affected() == 1)
    }

    /// Releases a lock back to `idle`, clearing the owning worker id so a
    /// stale reclaim check never matches a released lock (§4.3 final step).
    pub async fn release_wallet_lock(&self, id: i64, kind: WalletLockKind, locked_by: &str) -> Result<(), DbError> {
        match kind {
            WalletLockKind::Consolidation => {
                sqlx::query(
                    "UPDATE wallet_balances
                     SET processing_status = 'idle', consolidation_locked_until = NULL,
                         consolidation_locked_by = NULL, last_consolidation_at = now()
                     WHERE id = $1 AND consolidation_locked_by = $2",
                )
                .bind(id)
                .bind(locked_by)
                .execute(&self.pool)
                .await?;
            }
            WalletLockKind::Gas => {
                sqlx::query(
                    "UPDATE wallet_balances
                     SET processing_status = 'idle', gas_locked_until = NULL, gas_locked_by = NULL
                     WHERE id = $1 AND gas_locked_by = $2",
                )
                .bind(id)
                .bind(locked_by)
                .execute(&self.pool)
                .await?;
            }
        }
        Ok(())
    }

    pub async fn set_needs_consolidation(&self, id: i64, needs: bool) -> Result<(), DbError> {
        sqlx::query("UPDATE wallet_balances SET needs_consolidation = $2 WHERE id = $1")
            .bind(id)
            .bind(needs)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_needs_gas(&self, id: i64, needs: bool) -> Result<(), DbError> {
        sqlx::query("UPDATE wallet_balances SET needs_gas = $2 WHERE id = $1")
            .bind(id)
            .bind(needs)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_kind_maps_to_expected_processing_status() {
        assert_eq!(WalletLockKind::Consolidation.processing_status(), "consolidating");
        assert_eq!(WalletLockKind::Gas.processing_status(), "gas_topup");
    }
}
