//! Gas top-up execute stage (C7, spec §4.5 applied to gas top-up):
//! sends native currency from the chain's hot wallet to a user wallet
//! flagged `needs_gas`, the reverse direction of consolidation. Takes a
//! `coord-wallet-lock` of kind [`WalletLockKind::Gas`] for the duration
//! of broadcast, handed off to the confirm stage on success.

use std::sync::Arc;

use chrono::Utc;
use coord_chain_rpc::ChainRpcClient;
use coord_db::rows::{GasTopupQueueRow, QueueJobRow};
use coord_queue::{decide, sort_candidates, RetryDecision};
use coord_runtime::{CycleOutcome, WorkerContext};
use coord_signer_client::SignerClient;
use coord_types::{ChainKind, ClassifiedError, TxIntent, WalletBalanceId};
use coord_wallet_lock::{validate_for_gas_topup, WalletLock, WalletLockKind};
use tracing::warn;

use crate::{execute_common, nonce::NonceGuard};

#[derive(Clone)]
pub struct ExecuteGasTopupDeps {
    pub rpc: Arc<dyn ChainRpcClient>,
    pub signer: SignerClient,
    pub nonce_guard: NonceGuard,
    pub locks: WalletLock,
}

pub async fn run_once(ctx: WorkerContext, deps: &ExecuteGasTopupDeps) -> anyhow::Result<CycleOutcome> {
    let mut outcome = CycleOutcome::default();
    let mut candidates = ctx
        .db
        .list_claimable_gas_topup_jobs(ctx.identity.chain_id, ctx.config.claim_batch_size as i64)
        .await?;
    sort_candidates(&mut candidates);

    for candidate in candidates {
        let claimed = ctx.db.try_claim_gas_topup_job(candidate.job.id).await?;
        if !claimed {
            continue;
        }
        outcome.processed += 1;
        match process_one(&ctx, deps, &candidate).await {
            Ok(true) => outcome.succeeded += 1,
            Ok(false) => {}
            Err(e) => {
                warn!(gas_topup_queue_id = candidate.job.id, error = %e, "gas top-up execute failed");
                outcome.failed += 1;
            }
        }
    }
    Ok(outcome)
}

async fn process_one(
    ctx: &WorkerContext,
    deps: &ExecuteGasTopupDeps,
    row: &GasTopupQueueRow,
) -> anyhow::Result<bool> {
    let job = &row.job;

    if let Some(tx_hash) = &job.tx_hash {
        ctx.db.record_gas_topup_broadcast(job.id, tx_hash, Utc::now()).await?;
        return Ok(true);
    }

    if job.retry_count >= job.max_retries {
        ctx.db
            .fail_gas_topup_job(job.id, "max attempts exceeded before any broadcast", Utc::now())
            .await?;
        return Ok(false);
    }

    let balance = ctx.db.get_wallet_balance(row.wallet_balance_id).await?;
    if let Err(validation_err) = validate_for_gas_topup(&balance) {
        ctx.db.fail_gas_topup_job(job.id, &validation_err.to_string(), Utc::now()).await?;
        return Ok(false);
    }

    let lock = deps
        .locks
        .try_acquire(
            WalletBalanceId::new(row.wallet_balance_id),
            WalletLockKind::Gas,
            &ctx.identity.worker_id,
            ctx.config.gas_lock_ttl,
        )
        .await?;
    let Some(lock) = lock else {
        ctx.db.revert_gas_topup_to_pending(job.id).await?;
        return Ok(false);
    };

    let chain = ctx.db.get_chain(job.chain_id).await?;
    let recipient_wallet = ctx.db.get_user_wallet_address(row.wallet_id).await?;
    let hot_wallet = ctx.db.get_operation_wallet_address(job.operation_wallet_address_id).await?;

    // Gas top-ups are always a native-currency transfer (never a token),
    // so the intent never needs a contract address.
    let intent = build_intent(ctx.config.chain_kind, &hot_wallet.address, &recipient_wallet.address, &job.amount_raw);

    let result = execute_common::dispatch(
        &ctx.config,
        &deps.rpc,
        &deps.signer,
        &deps.nonce_guard,
        &chain.name,
        &hot_wallet.wallet_group_id,
        hot_wallet.derivation_index,
        intent,
    )
    .await;

    match result {
        Ok(resp) => {
            ctx.db.record_gas_topup_broadcast(job.id, &resp.tx_hash, Utc::now()).await?;
            Ok(true)
        }
        Err(err) => {
            deps.locks.release(lock, &ctx.identity.worker_id).await?;
            reschedule_or_fail(ctx, job, &err).await?;
            Ok(false)
        }
    }
}

async fn reschedule_or_fail(ctx: &WorkerContext, job: &QueueJobRow, err: &ClassifiedError) -> anyhow::Result<()> {
    let next_attempt_at = if err.retryable {
        match decide(
            job.retry_count as u32,
            job.max_retries as u32,
            Utc::now(),
            ctx.config.retry_backoff_base,
            ctx.config.retry_backoff_cap,
        ) {
            RetryDecision::RescheduleAt(at) => Some(at),
            RetryDecision::GiveUp => None,
        }
    } else {
        None
    };
    ctx.db
        .reschedule_or_fail_gas_topup_job(job.id, &err.to_stored_message(), next_attempt_at)
        .await?;
    Ok(())
}

fn build_intent(chain_kind: ChainKind, from: &str, to: &str, amount_raw: &str) -> TxIntent {
    match chain_kind {
        ChainKind::Evm => TxIntent::NativeTransfer {
            from: from.to_string(),
            to: to.to_string(),
            value: amount_raw.to_string(),
            gas_limit: None,
            gas_price_gwei: None,
        },
        ChainKind::AccountModel => TxIntent::AccountNativeTransfer {
            from: from.to_string(),
            to: to.to_string(),
            amount: amount_raw.to_string(),
            fee_cap: coord_types::intent::ACCOUNT_MODEL_FEE_CAP_NATIVE.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_builds_a_native_transfer() {
        let evm = build_intent(ChainKind::Evm, "0xHot", "0xUser", "50");
        assert!(matches!(evm, TxIntent::NativeTransfer { .. }));

        let account = build_intent(ChainKind::AccountModel, "THot", "TUser", "50");
        assert!(matches!(account, TxIntent::AccountNativeTransfer { .. }));
    }
}
