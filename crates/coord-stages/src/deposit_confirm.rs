//! Deposit confirmation observer (C5, spec §4.6 "Deposit confirmation
//! observer"). Unlike the three queue-backed confirm stages this one
//! operates on `deposits` directly, keyed by status rather than a claim
//! column, since nothing else ever writes to a deposit row concurrently
//! except another instance of this same observer.

use std::sync::Arc;

use anyhow::{anyhow, Context};
use chrono::Utc;
use coord_chain_rpc::ChainRpcClient;
use coord_db::rows::DepositRow;
use coord_ledger_client::LedgerClient;
use coord_runtime::{CycleOutcome, WorkerContext};
use coord_types::{AssetId, UserId};
use tracing::warn;

/// Handles this stage needs beyond what [`WorkerContext`] carries.
#[derive(Clone)]
pub struct DepositConfirmDeps {
    pub rpc: Arc<dyn ChainRpcClient>,
    pub ledger: LedgerClient,
}

/// One cycle: advance confirmation counts and flip `pending -> confirmed`
/// for deposits on this process's pinned chain, then credit every
/// `confirmed` deposit that hasn't been credited yet (§4.6 step 4).
pub async fn run_once(ctx: WorkerContext, deps: &DepositConfirmDeps) -> anyhow::Result<CycleOutcome> {
    let chain_id = ctx
        .identity
        .chain_id
        .ok_or_else(|| anyhow!("deposit confirm worker must be pinned to a single chain"))?;

    let mut outcome = CycleOutcome::default();
    advance_confirmations(&ctx, &deps.rpc, chain_id, &mut outcome).await?;
    credit_confirmed(&ctx, &deps.ledger, &mut outcome).await?;
    Ok(outcome)
}

async fn advance_confirmations(
    ctx: &WorkerContext,
    rpc: &Arc<dyn ChainRpcClient>,
    chain_id: i64,
    outcome: &mut CycleOutcome,
) -> anyhow::Result<()> {
    let chain = ctx.db.get_chain(chain_id).await?;
    let pending = ctx
        .db
        .list_pending_deposits(chain_id, ctx.config.claim_batch_size as i64)
        .await?;
    if pending.is_empty() {
        return Ok(());
    }

    // A transport fault here is transient infra (§7 kind 1): log and let
    // the next cycle retry rather than failing every pending deposit.
    let current_block = match rpc.current_block_number().await {
        Ok(b) => b,
        Err(e) => {
            warn!(chain_id, error = %e, "failed to read current block height, skipping confirmation pass");
            return Ok(());
        }
    };

    for deposit in pending {
        outcome.processed += 1;
        if current_block < deposit.block_number as u64 {
            // Possible reorg or clock skew (§4.6 final paragraph): skip
            // without rolling anything back.
            continue;
        }
        let confirmations = (current_block - deposit.block_number as u64 + 1) as i32;
        ctx.db.update_deposit_confirmations(deposit.id, confirmations).await?;

        if confirmations >= chain.confirmation_threshold {
            let won = ctx.db.try_mark_deposit_confirmed(deposit.id, Utc::now()).await?;
            if !won {
                // Another runner already confirmed this row.
                continue;
            }
        }
        outcome.succeeded += 1;
    }
    Ok(())
}

async fn credit_confirmed(
    ctx: &WorkerContext,
    ledger: &LedgerClient,
    outcome: &mut CycleOutcome,
) -> anyhow::Result<()> {
    let candidates = ctx
        .db
        .list_uncredited_confirmed_deposits(ctx.config.confirm_batch_size as i64)
        .await?;

    for candidate in candidates {
        outcome.processed += 1;
        // Re-fetch: another worker may have credited this row since the
        // list query ran (§4.6: "Re-fetch the row; skip if credited_at
        // IS NOT NULL").
        let fresh = ctx.db.get_deposit(candidate.id).await?;
        if fresh.credited_at.is_some() {
            continue;
        }

        match credit_one(ctx, ledger, &fresh).await {
            Ok(()) => outcome.succeeded += 1,
            Err(e) => {
                // Deposits never show as failed (§7): leave credited_at
                // NULL and let the next cycle retry crediting.
                warn!(deposit_id = fresh.id, error = %e, "failed to credit deposit, will retry next cycle");
                outcome.failed += 1;
            }
        }
    }
    Ok(())
}

async fn credit_one(ctx: &WorkerContext, ledger: &LedgerClient, deposit: &DepositRow) -> anyhow::Result<()> {
    let wallet = ctx
        .db
        .find_user_wallet_by_address(deposit.chain_id, &deposit.to_address)
        .await?
        .ok_or_else(|| {
            anyhow!(
                "no user_wallet_addresses row for address {} on chain {}",
                deposit.to_address,
                deposit.chain_id
            )
        })?;
    let asset_on_chain = ctx
        .db
        .get_asset_on_chain(deposit.asset_on_chain_id)
        .await
        .context("resolving asset_on_chain_id for deposit credit")?;

    ledger
        .credit_user_asset_balance(UserId::new(wallet.uid), AssetId::new(asset_on_chain.asset_id), &deposit.amount_human)
        .await?;
    ctx.db.try_mark_deposit_credited(deposit.id, Utc::now()).await?;
    Ok(())
}
