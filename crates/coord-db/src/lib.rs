//! Postgres persistence layer for the custody workload-coordination core
//! (spec §3, §6.1). Grounded on the trait-free repository style of
//! AllanMangeni-sbtc's `signer/src/storage/mod.rs`, adapted to a single
//! `Db` handle with one `impl Db` block per table family rather than a
//! storage trait, since this workspace only ever runs against Postgres.

pub mod error;
pub mod pool;
pub mod rows;

mod assets;
mod chains;
mod consolidation_queue;
mod deposits;
mod gas_topup_queue;
mod wallet_balances;
mod wallets;
mod withdrawal_queue;
mod withdrawal_requests;
mod worker_configs;
mod worker_execution_logs;
mod worker_maintenance;
mod worker_status;

pub use error::DbError;
pub use wallet_balances::WalletLockKind;
pub use worker_configs::INCIDENT_MODE_KEY;

use sqlx::postgres::PgPool;

/// A cheaply-cloneable handle to the coordination database. `PgPool`
/// itself is an `Arc` internally, so cloning `Db` is just a refcount
/// bump, matching how the teacher passes its RPC clients down into
/// worker tasks by value.
#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    pub fn new(pool: PgPool) -> Self {
        Db { pool }
    }

    pub async fn connect(db_url: &str) -> Result<Self, DbError> {
        Ok(Db::new(pool::connect(db_url).await?))
    }

    pub async fn migrate(&self) -> Result<(), DbError> {
        pool::migrate(&self.pool).await
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
