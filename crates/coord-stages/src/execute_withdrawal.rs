//! Withdrawal execute stage (C7, spec §4.5). Withdrawals draw from an
//! `operation_wallet_addresses` hot wallet rather than a
//! `wallet_balances` row, so this stage never takes a `coord-wallet-lock`
//! (see that crate's doc comment for the grounding); serialization comes
//! from the partial unique index on `withdrawal_queue` plus the
//! per-funder nonce mutex (§4.5 step 6).

use std::sync::Arc;

use chrono::Utc;
use coord_chain_rpc::ChainRpcClient;
use coord_db::rows::WithdrawalQueueRow;
use coord_queue::{decide, sort_candidates, RetryDecision};
use coord_runtime::{CycleOutcome, WorkerContext};
use coord_signer_client::SignerClient;
use coord_types::{ChainKind, TxIntent};
use tracing::warn;

use crate::{execute_common, nonce::NonceGuard};

#[derive(Clone)]
pub struct ExecuteWithdrawalDeps {
    pub rpc: Arc<dyn ChainRpcClient>,
    pub signer: SignerClient,
    pub nonce_guard: NonceGuard,
}

pub async fn run_once(ctx: WorkerContext, deps: &ExecuteWithdrawalDeps) -> anyhow::Result<CycleOutcome> {
    let mut outcome = CycleOutcome::default();
    let mut candidates = ctx
        .db
        .list_claimable_withdrawal_jobs(ctx.identity.chain_id, ctx.config.claim_batch_size as i64)
        .await?;
    sort_candidates(&mut candidates);

    for candidate in candidates {
        let claimed = ctx.db.try_claim_withdrawal_job(candidate.job.id).await?;
        if !claimed {
            continue;
        }
        outcome.processed += 1;
        match process_one(&ctx, deps, &candidate).await {
            Ok(true) => outcome.succeeded += 1,
            Ok(false) => {}
            Err(e) => {
                warn!(withdrawal_queue_id = candidate.job.id, error = %e, "withdrawal execute failed");
                outcome.failed += 1;
            }
        }
    }
    Ok(outcome)
}

async fn process_one(
    ctx: &WorkerContext,
    deps: &ExecuteWithdrawalDeps,
    row: &WithdrawalQueueRow,
) -> anyhow::Result<bool> {
    let job = &row.job;

    // Step 1: idempotency gate (§4.5 step 1).
    if let Some(tx_hash) = &job.tx_hash {
        ctx.db.record_withdrawal_broadcast(job.id, tx_hash, Utc::now()).await?;
        return Ok(true);
    }

    // Step 2: max-attempts gate (§4.5 step 2).
    if job.retry_count >= job.max_retries {
        ctx.db
            .fail_withdrawal_job(job.id, "max attempts exceeded before any broadcast", Utc::now())
            .await?;
        return Ok(false);
    }

    // Step 3: load counterparts.
    let chain = ctx.db.get_chain(job.chain_id).await?;
    let asset_on_chain = ctx.db.get_asset_on_chain(job.asset_on_chain_id).await?;
    let hot_wallet = ctx.db.get_operation_wallet_address(job.operation_wallet_address_id).await?;

    // Step 5: build the transfer intent.
    let intent = build_intent(ctx.config.chain_kind, &hot_wallet.address, &row.to_address, &job.amount_raw, asset_on_chain.contract_address.as_deref());

    // Steps 6-7: pre-flight, nonce-serialized sign-and-broadcast.
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
            // Step 8: record tx_hash and transition atomically.
            ctx.db.record_withdrawal_broadcast(job.id, &resp.tx_hash, Utc::now()).await?;
            Ok(true)
        }
        Err(err) => {
            // Step 9: no lock to release here (withdrawals never take
            // one); classify and either reschedule or give up.
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
                .reschedule_or_fail_withdrawal_job(job.id, &err.to_stored_message(), next_attempt_at)
                .await?;
            Ok(false)
        }
    }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_vs_token_intent_selection() {
        let native = build_intent(ChainKind::Evm, "0xA", "0xB", "100", None);
        assert!(matches!(native, TxIntent::NativeTransfer { .. }));

        let token = build_intent(ChainKind::Evm, "0xA", "0xB", "100", Some("0xC"));
        assert!(matches!(token, TxIntent::Erc20Transfer { .. }));

        let account_native = build_intent(ChainKind::AccountModel, "TAcc", "TOther", "100", None);
        assert!(matches!(account_native, TxIntent::AccountNativeTransfer { .. }));
    }
}
