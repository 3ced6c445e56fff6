//! Gas top-up confirm stage (C8, spec §4.6): finalizes a broadcast gas
//! top-up and releases the `coord-wallet-lock` on the recipient wallet,
//! under whichever owner the execute-stage process recorded.

use std::sync::Arc;

use chrono::Utc;
use coord_chain_rpc::ChainRpcClient;
use coord_db::rows::GasTopupQueueRow;
use coord_runtime::{CycleOutcome, WorkerContext};
use coord_types::{ChainKind, WalletBalanceId};
use coord_wallet_lock::{LockHandle, WalletLock, WalletLockKind};
use tracing::warn;

#[derive(Clone)]
pub struct ConfirmGasTopupDeps {
    pub rpc: Arc<dyn ChainRpcClient>,
    pub locks: WalletLock,
}

pub async fn run_once(ctx: WorkerContext, deps: &ConfirmGasTopupDeps) -> anyhow::Result<CycleOutcome> {
    let mut outcome = CycleOutcome::default();
    let jobs = ctx
        .db
        .list_confirming_gas_topup_jobs(ctx.identity.chain_id, ctx.config.confirm_batch_size as i64)
        .await?;

    for job in jobs {
        outcome.processed += 1;
        match process_one(&ctx, deps, &job).await {
            Ok(true) => outcome.succeeded += 1,
            Ok(false) => {}
            Err(e) => {
                warn!(gas_topup_queue_id = job.job.id, error = %e, "gas top-up confirm failed");
                outcome.failed += 1;
            }
        }
    }
    Ok(outcome)
}

async fn process_one(ctx: &WorkerContext, deps: &ConfirmGasTopupDeps, row: &GasTopupQueueRow) -> anyhow::Result<bool> {
    let job = &row.job;
    let Some(tx_hash) = &job.tx_hash else {
        return Ok(false);
    };

    let chain = ctx.db.get_chain(job.chain_id).await?;
    let receipt = match deps.rpc.get_transaction_receipt(tx_hash).await {
        Ok(Some(r)) => r,
        Ok(None) => return Ok(false),
        Err(e) => {
            warn!(gas_topup_queue_id = job.id, error = %e, "receipt lookup failed, will retry next cycle");
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
    let handle = LockHandle { wallet_balance_id: WalletBalanceId::new(row.wallet_balance_id), kind: WalletLockKind::Gas };

    if succeeded {
        ctx.db
            .mark_gas_topup_confirmed(job.id, now, receipt.gas_used.as_deref(), receipt.gas_price.as_deref())
            .await?;
        ctx.db.set_needs_gas(row.wallet_balance_id, false).await?;
    } else {
        ctx.db.fail_gas_topup_job(job.id, "on-chain revert", now).await?;
    }

    let balance = ctx.db.get_wallet_balance(row.wallet_balance_id).await?;
    if let Some(owner) = &balance.gas_locked_by {
        deps.locks.release(handle, owner).await?;
    }
    Ok(succeeded)
}
