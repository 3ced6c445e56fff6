//! Consolidation confirm stage (C8, spec §4.6): finalizes a broadcast
//! consolidation, releasing the `coord-wallet-lock` taken by the execute
//! stage either way. On failure `needs_consolidation` is deliberately
//! left set (OQ-2): the rule engine (C9) decides whether to re-queue.

use std::sync::Arc;

use chrono::Utc;
use coord_chain_rpc::ChainRpcClient;
use coord_db::rows::ConsolidationQueueRow;
use coord_runtime::{CycleOutcome, WorkerContext};
use coord_types::{ChainKind, WalletBalanceId};
use coord_wallet_lock::{LockHandle, WalletLock, WalletLockKind};
use tracing::warn;

#[derive(Clone)]
pub struct ConfirmConsolidationDeps {
    pub rpc: Arc<dyn ChainRpcClient>,
    pub locks: WalletLock,
}

pub async fn run_once(ctx: WorkerContext, deps: &ConfirmConsolidationDeps) -> anyhow::Result<CycleOutcome> {
    let mut outcome = CycleOutcome::default();
    let jobs = ctx
        .db
        .list_confirming_consolidation_jobs(ctx.identity.chain_id, ctx.config.confirm_batch_size as i64)
        .await?;

    for job in jobs {
        outcome.processed += 1;
        match process_one(&ctx, deps, &job).await {
            Ok(true) => outcome.succeeded += 1,
            Ok(false) => {}
            Err(e) => {
                warn!(consolidation_queue_id = job.job.id, error = %e, "consolidation confirm failed");
                outcome.failed += 1;
            }
        }
    }
    Ok(outcome)
}

async fn process_one(
    ctx: &WorkerContext,
    deps: &ConfirmConsolidationDeps,
    row: &ConsolidationQueueRow,
) -> anyhow::Result<bool> {
    let job = &row.job;
    let Some(tx_hash) = &job.tx_hash else {
        return Ok(false);
    };

    let chain = ctx.db.get_chain(job.chain_id).await?;
    let receipt = match deps.rpc.get_transaction_receipt(tx_hash).await {
        Ok(Some(r)) => r,
        Ok(None) => return Ok(false),
        Err(e) => {
            warn!(consolidation_queue_id = job.id, error = %e, "receipt lookup failed, will retry next cycle");
            return Ok(false);
        }
    };

    let Some(tx_block) = receipt.block_number else {
        return Ok(false);
    };
    let current_block = deps.rpc.current_block_number().await?;
    if current_block < tx_block {
        return Ok(false);
    }
    let confirmations = current_block - tx_block + 1;
    if confirmations < chain.confirmation_threshold as u64 {
        return Ok(false);
    }

    let succeeded = match ctx.config.chain_kind {
        ChainKind::Evm => receipt.evm_succeeded(),
        ChainKind::AccountModel => receipt.account_model_succeeded(),
    };

    let now = Utc::now();
    let handle = LockHandle { wallet_balance_id: WalletBalanceId::new(row.wallet_balance_id), kind: WalletLockKind::Consolidation };

    if succeeded {
        ctx.db
            .mark_consolidation_confirmed(job.id, now, receipt.gas_used.as_deref(), receipt.gas_price.as_deref())
            .await?;
        ctx.db.set_needs_consolidation(row.wallet_balance_id, false).await?;
    } else {
        ctx.db.fail_consolidation_job(job.id, "on-chain revert", now).await?;
    }

    // The lock was acquired by whichever execute-stage process ran this
    // job, not necessarily this confirm-stage process, so release under
    // the owner recorded on the row rather than this worker's own id.
    let balance = ctx.db.get_wallet_balance(row.wallet_balance_id).await?;
    if let Some(owner) = &balance.consolidation_locked_by {
        deps.locks.release(handle, owner).await?;
    }
    Ok(succeeded)
}
