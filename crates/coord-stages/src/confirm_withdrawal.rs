//! Withdrawal confirm stage (C8, spec §4.6): polls `confirming` jobs,
//! evaluates the on-chain receipt once mined and past the chain's
//! confirmation threshold, and finalizes. Withdrawals hold no
//! `coord-wallet-lock`, so there is nothing to release here beyond the
//! request-status side effect.

use std::sync::Arc;

use chrono::Utc;
use coord_chain_rpc::ChainRpcClient;
use coord_db::rows::WithdrawalQueueRow;
use coord_runtime::{CycleOutcome, WorkerContext};
use coord_types::ChainKind;
use tracing::warn;

#[derive(Clone)]
pub struct ConfirmWithdrawalDeps {
    pub rpc: Arc<dyn ChainRpcClient>,
}

pub async fn run_once(ctx: WorkerContext, deps: &ConfirmWithdrawalDeps) -> anyhow::Result<CycleOutcome> {
    let mut outcome = CycleOutcome::default();
    let jobs = ctx
        .db
        .list_confirming_withdrawal_jobs(ctx.identity.chain_id, ctx.config.confirm_batch_size as i64)
        .await?;

    for job in jobs {
        outcome.processed += 1;
        match process_one(&ctx, deps, &job).await {
            Ok(true) => outcome.succeeded += 1,
            Ok(false) => {}
            Err(e) => {
                warn!(withdrawal_queue_id = job.job.id, error = %e, "withdrawal confirm failed");
                outcome.failed += 1;
            }
        }
    }
    Ok(outcome)
}

async fn process_one(ctx: &WorkerContext, deps: &ConfirmWithdrawalDeps, row: &WithdrawalQueueRow) -> anyhow::Result<bool> {
    let job = &row.job;
    let Some(tx_hash) = &job.tx_hash else {
        return Ok(false);
    };

    let chain = ctx.db.get_chain(job.chain_id).await?;
    let receipt = match deps.rpc.get_transaction_receipt(tx_hash).await {
        Ok(Some(r)) => r,
        Ok(None) => return Ok(false),
        Err(e) => {
            warn!(withdrawal_queue_id = job.id, error = %e, "receipt lookup failed, will retry next cycle");
            return Ok(false);
        }
    };

    let Some(tx_block) = receipt.block_number else {
        return Ok(false);
    };

    let current_block = deps.rpc.current_block_number().await?;
    if current_block < tx_block {
        // Possible reorg or clock skew; leave unchanged, do not roll back.
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
    if succeeded {
        ctx.db
            .mark_withdrawal_confirmed(job.id, now, receipt.gas_used.as_deref(), receipt.gas_price.as_deref())
            .await?;
        ctx.db.mark_completed(row.withdrawal_request_id, tx_hash).await?;
    } else {
        ctx.db.fail_withdrawal_job(job.id, "on-chain revert", now).await?;
        ctx.db.mark_failed(row.withdrawal_request_id).await?;
    }
    Ok(succeeded)
}
