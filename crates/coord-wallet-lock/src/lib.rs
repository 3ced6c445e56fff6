//! Pessimistic per-(wallet, asset) lock manager over `wallet_balances`
//! (C3, spec §4.3). Two lock flavors exist at the storage layer —
//! consolidation and gas top-up — matching the two `*_locked_{until,by}`
//! column pairs the schema actually carries (§3.1). Withdrawals do not
//! take a `wallet_balances` lock: the hot wallet they draw from is an
//! `operation_wallet_addresses` row, serialized instead by the partial
//! unique index on `withdrawal_queue` (at most one active job per
//! request, §3.1) plus the per-funder nonce mutex (§4.5 step 6); see
//! DESIGN.md for why this reading was chosen over adding a third lock
//! column pair the schema in §3.1 never defines.

mod validate;

pub use coord_db::WalletLockKind;
pub use validate::{validate_for_consolidation, validate_for_gas_topup, ValidationError};

use std::time::Duration;

use chrono::Utc;
use coord_db::{Db, DbError};
use coord_types::WalletBalanceId;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("database error: {0}")]
    Db(#[from] DbError),
}

/// A held lock. Carries enough to release itself; callers MUST call
/// [`WalletLock::release`] explicitly once the protected work (and, for
/// execute stages, ownership handoff to the confirm stage) is done —
/// there is no `Drop`-based auto-release since release is an async DB
/// call and a crash before it runs is the expected, recoverable path
/// (§4.3's reclaim-by-TTL rule).
#[derive(Debug, Clone, Copy)]
pub struct LockHandle {
    pub wallet_balance_id: WalletBalanceId,
    pub kind: WalletLockKind,
}

/// Thin wrapper over `coord-db`'s conditional lock primitives, adding
/// the TTL bookkeeping so call sites never compute `now() + ttl`
/// themselves.
#[derive(Debug, Clone)]
pub struct WalletLock {
    db: Db,
}

impl WalletLock {
    pub fn new(db: Db) -> Self {
        WalletLock { db }
    }

    /// Attempts to acquire `kind` on `wallet_balance_id` for `worker_id`,
    /// good until `ttl` from now (§4.3 "Acquire"). Succeeds either from
    /// `idle` or by reclaiming an expired lock of the same kind
    /// (§4.3 "Reclaim expired locks"). Returns `None` on contention —
    /// the caller's cue to back off without penalizing the job's retry
    /// count (§4.5 step 4: "revert job to pending and return without
    /// penalty").
    pub async fn try_acquire(
        &self,
        wallet_balance_id: WalletBalanceId,
        kind: WalletLockKind,
        worker_id: &str,
        ttl: Duration,
    ) -> Result<Option<LockHandle>, LockError> {
        let locked_until = Utc::now() + chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::minutes(10));
        let acquired = self
            .db
            .try_acquire_wallet_lock(wallet_balance_id.get(), kind, worker_id, locked_until)
            .await?;
        if acquired {
            debug!(wallet_balance_id = %wallet_balance_id, ?kind, worker_id, "acquired wallet lock");
            Ok(Some(LockHandle { wallet_balance_id, kind }))
        } else {
            Ok(None)
        }
    }

    /// Releases `handle` back to `idle` (§4.3 "Release"), conditioned on
    /// `worker_id` still being the recorded owner so a worker that lost
    /// its lock to a reclaim can never clobber the new owner's hold.
    pub async fn release(&self, handle: LockHandle, worker_id: &str) -> Result<(), LockError> {
        self.db
            .release_wallet_lock(handle.wallet_balance_id.get(), handle.kind, worker_id)
            .await?;
        debug!(wallet_balance_id = %handle.wallet_balance_id, kind = ?handle.kind, worker_id, "released wallet lock");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_handle_carries_kind_and_id() {
        let handle = LockHandle { wallet_balance_id: WalletBalanceId::new(7), kind: WalletLockKind::Gas };
        assert_eq!(handle.wallet_balance_id.get(), 7);
        assert_eq!(handle.kind, WalletLockKind::Gas);
    }
}
