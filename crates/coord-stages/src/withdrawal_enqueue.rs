//! Withdrawal enqueue stage (C6, spec §4.7): projects approved, unqueued
//! `withdrawal_requests` rows into `withdrawal_queue` jobs.

use anyhow::anyhow;
use chrono::Utc;
use coord_db::rows::WithdrawalRequestRow;
use coord_runtime::{CycleOutcome, WorkerContext};
use coord_types::human_to_raw;
use tracing::warn;

pub async fn run_once(ctx: WorkerContext) -> anyhow::Result<CycleOutcome> {
    let mut outcome = CycleOutcome::default();
    let batch = ctx.db.list_approved_unqueued(ctx.config.claim_batch_size as i64).await?;

    for request in batch {
        outcome.processed += 1;
        match enqueue_one(&ctx, &request).await {
            Ok(true) => outcome.succeeded += 1,
            // Lost a benign race against another projection of the same
            // request (partial unique index, §4.7 final paragraph).
            Ok(false) => {}
            Err(e) => {
                warn!(withdrawal_request_id = request.id, error = %e, "failed to enqueue withdrawal request");
                outcome.failed += 1;
            }
        }
    }
    Ok(outcome)
}

async fn enqueue_one(ctx: &WorkerContext, request: &WithdrawalRequestRow) -> anyhow::Result<bool> {
    // OQ-4: prefer the explicit asset_on_chain_id; fall back to
    // resolving (asset_id, chain_id) only when it is absent.
    let asset_on_chain = match request.asset_on_chain_id {
        Some(id) => ctx.db.get_asset_on_chain(id).await?,
        None => {
            let asset_id = request
                .asset_id
                .ok_or_else(|| anyhow!("withdrawal request {} carries neither asset_on_chain_id nor asset_id", request.id))?;
            ctx.db.find_asset_on_chain(asset_id, request.chain_id).await?
        }
    };

    let hot_wallet = ctx
        .db
        .pick_and_touch_hot_wallet(request.chain_id)
        .await?
        .ok_or_else(|| anyhow!("no active hot wallet for chain {}", request.chain_id))?;

    let amount_raw = human_to_raw(&request.amount_human, asset_on_chain.decimals as u32)?;

    let inserted = ctx
        .db
        .insert_withdrawal_queue_job(
            request.id,
            request.chain_id,
            asset_on_chain.id,
            hot_wallet.id,
            &request.to_address,
            &amount_raw,
            &request.amount_human,
            "normal",
        )
        .await;

    let inserted = match inserted {
        Ok(id) => id,
        Err(e) if e.is_unique_violation() => return Ok(false),
        Err(e) => return Err(e.into()),
    };
    let _ = inserted;

    let queued = ctx.db.try_mark_queued(request.id, Utc::now()).await?;
    Ok(queued)
}
