//! Withdrawal enqueue process (C6, spec §4.7). Chain-agnostic: projects
//! approved `withdrawal_requests` across every chain into
//! `withdrawal_queue` in one pass, so this binary is never pinned to a
//! single `CHAIN_ID` the way the execute/confirm workers are.

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use coord_config::{CliArgs, Config};
use coord_db::Db;
use coord_runtime::{logging, taskmgr::TaskManager, WorkerContext, WorkerIdentity};
use coord_stages::withdrawal_enqueue;
use coord_types::WorkerType;
use tokio::runtime::Builder;

const SHUTDOWN_TIMEOUT_MS: u64 = 5000;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    main_inner(args)
}

fn main_inner(args: CliArgs) -> anyhow::Result<()> {
    let config = Config::from_env(&args)?;
    let json = std::env::var("LOG_JSON").map(|v| v == "1").unwrap_or(false);
    logging::init_logging(&config.log_level, json);

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .thread_name("withdrawal-enqueue-rt")
        .build()?;
    let handle = runtime.handle().clone();

    let ctx = handle.block_on(async {
        let db = Db::connect(&config.db_url).await.context("connecting to database")?;
        let identity = WorkerIdentity::new(WorkerType::WithdrawalEnqueue, config.chain_id);
        let ctx = WorkerContext::new(db, identity, config.clone());
        ctx.register().await.context("registering worker")?;
        Ok::<_, anyhow::Error>(ctx)
    })?;

    let task_manager = TaskManager::new(handle.clone());
    let executor = task_manager.create_executor();

    let cycle_ctx = ctx.clone();
    let cycle_shutdown = task_manager.shutdown_signal();
    executor.spawn_critical_async("withdrawal-enqueue-cycle", async move {
        cycle_ctx.run_loop(cycle_shutdown, withdrawal_enqueue::run_once).await
    });

    let heartbeat_shutdown = task_manager.shutdown_signal();
    executor.spawn_critical_async("heartbeat", async move { ctx.heartbeat_loop(heartbeat_shutdown).await });

    task_manager.start_signal_listeners();
    task_manager.monitor(Some(Duration::from_millis(SHUTDOWN_TIMEOUT_MS)))?;
    Ok(())
}
