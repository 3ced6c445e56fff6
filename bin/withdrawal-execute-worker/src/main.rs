//! Withdrawal execute process (C7, spec §4.5). Pinned to a single chain
//! via `CHAIN_ID`/`--chain-id`; one funder nonce-guard instance lives for
//! the life of this process, since nonce serialization only needs to
//! hold within a single process (§4.5 step 6, §9's re-shaping note).

use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Context};
use clap::Parser;
use coord_chain_rpc::{account::AccountModelRpcClient, evm::EvmRpcClient, ChainRpcClient};
use coord_config::{CliArgs, Config};
use coord_db::Db;
use coord_runtime::{logging, taskmgr::TaskManager, WorkerContext, WorkerIdentity};
use coord_signer_client::{SignerClient, SignerClientConfig};
use coord_stages::{
    execute_withdrawal::{self, ExecuteWithdrawalDeps},
    NonceGuard,
};
use coord_types::{ChainKind, WorkerType};
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
        .thread_name("withdrawal-execute-rt")
        .build()?;
    let handle = runtime.handle().clone();

    let chain_id = config
        .chain_id
        .ok_or_else(|| anyhow!("withdrawal-execute-worker requires CHAIN_ID or --chain-id"))?;

    let (ctx, deps) = handle.block_on(async {
        let db = Db::connect(&config.db_url).await.context("connecting to database")?;
        let chain = db.get_chain(chain_id).await.context("loading pinned chain")?;

        let rpc: Arc<dyn ChainRpcClient> = match config.chain_kind {
            ChainKind::Evm => Arc::new(EvmRpcClient::new(&chain.rpc_url)?),
            ChainKind::AccountModel => Arc::new(AccountModelRpcClient::new(chain.rpc_url.clone())?),
        };
        let signer = SignerClient::new(SignerClientConfig {
            base_url: config.signer_base_url.clone(),
            api_key: config.signer_api_key.clone(),
            service_identity: "withdrawal-execute-worker".to_string(),
            request_timeout: config.signer_timeout,
            health_timeout: config.signer_health_timeout,
        })?;

        let identity = WorkerIdentity::new(WorkerType::WithdrawalExecute, Some(chain_id));
        let ctx = WorkerContext::new(db, identity, config.clone());
        ctx.register().await.context("registering worker")?;

        let deps = ExecuteWithdrawalDeps { rpc, signer, nonce_guard: NonceGuard::new() };
        Ok::<_, anyhow::Error>((ctx, deps))
    })?;

    let task_manager = TaskManager::new(handle.clone());
    let executor = task_manager.create_executor();

    let cycle_ctx = ctx.clone();
    let cycle_shutdown = task_manager.shutdown_signal();
    executor.spawn_critical_async("withdrawal-execute-cycle", async move {
        cycle_ctx
            .run_loop(cycle_shutdown, move |ctx| {
                let deps = deps.clone();
                async move { execute_withdrawal::run_once(ctx, &deps).await }
            })
            .await
    });

    let heartbeat_shutdown = task_manager.shutdown_signal();
    executor.spawn_critical_async("heartbeat", async move { ctx.heartbeat_loop(heartbeat_shutdown).await });

    task_manager.start_signal_listeners();
    task_manager.monitor(Some(Duration::from_millis(SHUTDOWN_TIMEOUT_MS)))?;
    Ok(())
}
