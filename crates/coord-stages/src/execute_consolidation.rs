//! Consolidation execute stage (C7, spec §4.5 applied to consolidation):
//! sweeps a `wallet_balances` row flagged `needs_consolidation` from its
//! user wallet into the chain's rotating hot wallet. Takes a
//! `coord-wallet-lock` for the duration of broadcast; the lock is handed
//! off to the confirm stage on success and released here only on
//! failure (see `coord-wallet-lock`'s `LockHandle` doc comment).

use std::sync::Arc;

use chrono::Utc;
use coord_chain_rpc::ChainRpcClient;
use coord_db::rows::ConsolidationQueueRow;
use coord_queue::{decide, sort_candidates, RetryDecision};
use coord_runtime::{CycleOutcome, WorkerContext};
use coord_signer_client::SignerClient;
use coord_types::{ChainKind, ClassifiedError, TxIntent, WalletBalanceId};
use coord_wallet_lock::{validate_for_consolidation, WalletLock, WalletLockKind};
use tracing::warn;

use crate::{execute_common, nonce::NonceGuard};

#[derive(Clone)]
pub struct ExecuteConsolidationDeps {
    pub rpc: Arc<dyn ChainRpcClient>,
    pub signer: SignerClient,
    pub nonce_guard: NonceGuard,
    pub locks: WalletLock,
}

pub async fn run_once(ctx: WorkerContext, deps: &ExecuteConsolidationDeps) -> anyhow::Result<CycleOutcome> {
    let mut outcome = CycleOutcome::default();
    let mut candidates = ctx
        .db
        .list_claimable_consolidation_jobs(ctx.identity.chain_id, ctx.config.claim_batch_size as i64)
        .await?;
    sort_candidates(&mut candidates);

    for candidate in candidates {
        let claimed = ctx.db.try_claim_consolidation_job(candidate.job.id).await?;
        if !claimed {
            continue;
        }
        outcome.processed += 1;
        match process_one(&ctx, deps, &candidate).await {
            Ok(true) => outcome.succeeded += 1,
            Ok(false) => {}
            Err(e) => {
                warn!(consolidation_queue_id = candidate.job.id, error = %e, "consolidation execute failed");
                outcome.failed += 1;
            }
        }
    }
    Ok(outcome)
}

async fn process_one(
    ctx: &WorkerContext,
    deps: &ExecuteConsolidationDeps,
    row: &ConsolidationQueueRow,
) -> anyhow::Result<bool> {
    let job = &row.job;

    if let Some(tx_hash) = &job.tx_hash {
        ctx.db.record_consolidation_broadcast(job.id, tx_hash, Utc::now()).await?;
        return Ok(true);
    }

    if job.retry_count >= job.max_retries {
        ctx.db
            .fail_consolidation_job(job.id, "max attempts exceeded before any broadcast", Utc::now())
            .await?;
        return Ok(false);
    }

    let balance = ctx.db.get_wallet_balance(row.wallet_balance_id).await?;
    if let Err(validation_err) = validate_for_consolidation(&balance) {
        ctx.db
            .fail_consolidation_job(job.id, &validation_err.to_string(), Utc::now())
            .await?;
        return Ok(false);
    }

    let lock = deps
        .locks
        .try_acquire(
            WalletBalanceId::new(row.wallet_balance_id),
            WalletLockKind::Consolidation,
            &ctx.identity.worker_id,
            ctx.config.consolidation_lock_ttl,
        )
        .await?;
    let Some(lock) = lock else {
        ctx.db.revert_consolidation_to_pending(job.id).await?;
        return Ok(false);
    };

    let chain = ctx.db.get_chain(job.chain_id).await?;
    let asset_on_chain = ctx.db.get_asset_on_chain(job.asset_on_chain_id).await?;
    let source_wallet = ctx.db.get_user_wallet_address(row.wallet_id).await?;
    let hot_wallet = ctx.db.get_operation_wallet_address(job.operation_wallet_address_id).await?;

    let intent = build_intent(
        ctx.config.chain_kind,
        &source_wallet.address,
        &hot_wallet.address,
        &job.amount_raw,
        asset_on_chain.contract_address.as_deref(),
    );

    let result = execute_common::dispatch(
        &ctx.config,
        &deps.rpc,
        &deps.signer,
        &deps.nonce_guard,
        &chain.name,
        &source_wallet.wallet_group_id,
        source_wallet.derivation_index,
        intent,
    )
    .await;

    match result {
        Ok(resp) => {
            ctx.db.record_consolidation_broadcast(job.id, &resp.tx_hash, Utc::now()).await?;
            Ok(true)
        }
        Err(err) => {
            deps.locks.release(lock, &ctx.identity.worker_id).await?;
            reschedule_or_fail(ctx, job, &err).await?;
            Ok(false)
        }
    }
}

async fn reschedule_or_fail(
    ctx: &WorkerContext,
    job: &coord_db::rows::QueueJobRow,
    err: &ClassifiedError,
) -> anyhow::Result<()> {
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
        .reschedule_or_fail_consolidation_job(job.id, &err.to_stored_message(), next_attempt_at)
        .await?;
    Ok(())
}

fn build_intent(chain_kind: ChainKind, from: &str, to: &str, amount_raw: &str, contract_address: Option<&str>) -> TxIntent {
    match (chain_kind, contract_address) {
        (ChainKind::Evm, None) => TxIntent::NativeTransfer {
            from: from.to_string(),
            to: to.to_string(),
            value: amount_raw.to_string(),
            gas_limit: None,
            gas_price_gwei: None,
        },
        (ChainKind::Evm, Some(contract)) => TxIntent::Erc20Transfer {
            from: from.to_string(),
            to: to.to_string(),
            amount: amount_raw.to_string(),
            contract_address: contract.to_string(),
            gas_limit: None,
            gas_price_gwei: None,
        },
        (ChainKind::AccountModel, None) => TxIntent::AccountNativeTransfer {
            from: from.to_string(),
            to: to.to_string(),
            amount: amount_raw.to_string(),
            fee_cap: coord_types::intent::ACCOUNT_MODEL_FEE_CAP_NATIVE.to_string(),
        },
        (ChainKind::AccountModel, Some(contract)) => TxIntent::AccountTokenTransfer {
            from: from.to_string(),
            to: to.to_string(),
            amount: amount_raw.to_string(),
            contract_address: contract.to_string(),
            fee_cap: coord_types::intent::ACCOUNT_MODEL_FEE_CAP_NATIVE.to_string(),
        },
    }
}
