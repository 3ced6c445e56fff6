//! Orchestration / rule-execution stage (C9, spec §4.8). A pure
//! producer: turns `wallet_balances` signals into `consolidation_queue`
//! rows. Never claims, executes, or confirms a job itself.

use coord_runtime::{CycleOutcome, WorkerContext};
use coord_types::raw_to_human;
use tracing::warn;

pub async fn run_once(ctx: WorkerContext) -> anyhow::Result<CycleOutcome> {
    let mut outcome = CycleOutcome::default();
    let candidates = ctx.db.list_consolidation_candidates(ctx.config.claim_batch_size as i64).await?;

    for balance in candidates {
        if balance.needs_gas || balance.processing_status != "idle" {
            continue;
        }
        outcome.processed += 1;
        match enqueue_one(&ctx, &balance).await {
            Ok(true) => outcome.succeeded += 1,
            Ok(false) => {}
            Err(e) => {
                warn!(wallet_balance_id = balance.id, error = %e, "failed to enqueue consolidation job");
                outcome.failed += 1;
            }
        }
    }
    Ok(outcome)
}

async fn enqueue_one(ctx: &WorkerContext, balance: &coord_db::rows::WalletBalanceRow) -> anyhow::Result<bool> {
    let asset_on_chain = ctx.db.get_asset_on_chain(balance.asset_on_chain_id).await?;
    let hot_wallet = ctx
        .db
        .pick_and_touch_hot_wallet(asset_on_chain.chain_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("no active hot wallet for chain {}", asset_on_chain.chain_id))?;

    let amount_human = raw_to_human(&balance.available_raw, asset_on_chain.decimals as u32)?;

    let inserted = ctx
        .db
        .insert_consolidation_job(
            balance.id,
            balance.wallet_id,
            asset_on_chain.chain_id,
            asset_on_chain.id,
            hot_wallet.id,
            &balance.available_raw,
            &amount_human,
        )
        .await;

    match inserted {
        Ok(_) => Ok(true),
        Err(e) if e.is_unique_violation() => Ok(false),
        Err(e) => Err(e.into()),
    }
}
