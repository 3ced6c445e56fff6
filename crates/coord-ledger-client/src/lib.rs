//! Call contract to the ledger / accounting layer's
//! `credit_user_asset_balance` stored procedure (§6.2). The ledger's
//! internals are out of scope (§1); this crate's only job is to be the
//! single call site that invokes it, so a deposit is never credited by
//! more than one code path.

use coord_types::{AssetId, UserId};
use sqlx::PgPool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger call failed: {0}")]
    Db(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct LedgerClient {
    pool: PgPool,
}

impl LedgerClient {
    pub fn new(pool: PgPool) -> Self {
        LedgerClient { pool }
    }

    /// Invokes `credit_user_asset_balance(uid, asset_id, amount_human)`
    /// (§6.2, §4.6's deposit-finalization step 5). The procedure is
    /// idempotent on the ledger's side; this crate's contribution to
    /// at-most-once crediting is the `credited_at` gate in
    /// `coord-db`'s deposit repository, which ensures this is called
    /// at most once per deposit regardless of how many times it is
    /// (safely) invoked here.
    pub async fn credit_user_asset_balance(
        &self,
        uid: UserId,
        asset_id: AssetId,
        amount_human: &str,
    ) -> Result<(), LedgerError> {
        sqlx::query("SELECT credit_user_asset_balance($1, $2, $3)")
            .bind(uid.get())
            .bind(asset_id.get())
            .bind(amount_human)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The stored procedure itself lives in the ledger's own schema,
    // outside this crate's reach (§1), so there is nothing to exercise
    // here beyond the type wiring. Behavior against a live procedure is
    // covered by integration tests run against a provisioned ledger.
    #[test]
    fn constructs_from_pool_type() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LedgerClient>();
    }
}
