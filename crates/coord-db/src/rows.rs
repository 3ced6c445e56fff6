//! Row structs returned by `sqlx::query_as`. Deliberately separate from
//! `coord_types`'s domain enums: status columns come back as plain
//! `String` here and are parsed into the typed enum by the repository
//! method that reads them, the same seam AllanMangeni-sbtc's storage
//! layer draws between its `sqlx` row types and its domain model.

use chrono::{DateTime, Utc};
use coord_queue::Claimable;
use coord_types::enums::Priority;
use sqlx::FromRow;

fn parse_priority(raw: &str) -> Priority {
    match raw {
        "high" => Priority::High,
        "low" => Priority::Low,
        _ => Priority::Normal,
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ChainRow {
    pub id: i64,
    pub name: String,
    pub rpc_url: String,
    pub confirmation_threshold: i32,
    pub block_time_seconds: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct AssetOnChainRow {
    pub id: i64,
    pub chain_id: i64,
    pub asset_id: i64,
    pub contract_address: Option<String>,
    pub decimals: i32,
    pub is_native: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserWalletAddressRow {
    pub id: i64,
    pub uid: i64,
    pub chain_id: i64,
    pub address: String,
    pub wallet_group_id: String,
    pub derivation_index: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct OperationWalletAddressRow {
    pub id: i64,
    pub chain_id: i64,
    pub address: String,
    pub role: String,
    pub wallet_group_id: String,
    pub derivation_index: i64,
    pub is_active: bool,
    pub last_used_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow)]
pub struct WalletBalanceRow {
    pub id: i64,
    pub wallet_id: i64,
    pub asset_on_chain_id: i64,
    pub available_raw: String,
    pub needs_consolidation: bool,
    pub needs_gas: bool,
    pub processing_status: String,
    pub consolidation_locked_until: Option<DateTime<Utc>>,
    pub consolidation_locked_by: Option<String>,
    pub gas_locked_until: Option<DateTime<Utc>>,
    pub gas_locked_by: Option<String>,
    pub last_processed_at: Option<DateTime<Utc>>,
    pub last_consolidation_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DepositRow {
    pub id: i64,
    pub chain_id: i64,
    pub asset_on_chain_id: i64,
    pub tx_hash: String,
    pub log_index: i32,
    pub to_address: String,
    pub amount_raw: String,
    pub amount_human: String,
    pub block_number: i64,
    pub status: String,
    pub confirmations: i32,
    pub first_seen_block: Option<i64>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub credited_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow)]
pub struct WithdrawalRequestRow {
    pub id: i64,
    pub user_id: i64,
    pub chain_id: i64,
    pub asset_on_chain_id: Option<i64>,
    pub asset_id: Option<i64>,
    pub to_address: String,
    pub amount_human: String,
    pub status: String,
    pub queued_at: Option<DateTime<Utc>>,
    pub final_tx_hash: Option<String>,
}

/// Shared shape of `withdrawal_queue` / `consolidation_queue` /
/// `gas_topup_queue` (§3.3 groups all three under one lifecycle).
#[derive(Debug, Clone, FromRow)]
pub struct QueueJobRow {
    pub id: i64,
    pub chain_id: i64,
    pub asset_on_chain_id: i64,
    pub operation_wallet_address_id: i64,
    pub amount_raw: String,
    pub amount_human: String,
    pub status: String,
    pub priority: String,
    pub tx_hash: Option<String>,
    pub retry_count: i32,
    pub max_retries: i32,
    pub error_message: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub gas_used: Option<String>,
    pub gas_price: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct WithdrawalQueueRow {
    #[sqlx(flatten)]
    pub job: QueueJobRow,
    pub withdrawal_request_id: i64,
    pub to_address: String,
}

impl Claimable for WithdrawalQueueRow {
    fn id(&self) -> i64 {
        self.job.id
    }
    fn priority(&self) -> Priority {
        parse_priority(&self.job.priority)
    }
    fn scheduled_at(&self) -> DateTime<Utc> {
        self.job.scheduled_at
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ConsolidationQueueRow {
    #[sqlx(flatten)]
    pub job: QueueJobRow,
    pub wallet_balance_id: i64,
    pub wallet_id: i64,
}

impl Claimable for ConsolidationQueueRow {
    fn id(&self) -> i64 {
        self.job.id
    }
    fn priority(&self) -> Priority {
        parse_priority(&self.job.priority)
    }
    fn scheduled_at(&self) -> DateTime<Utc> {
        self.job.scheduled_at
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct GasTopupQueueRow {
    #[sqlx(flatten)]
    pub job: QueueJobRow,
    pub wallet_balance_id: i64,
    pub wallet_id: i64,
}

impl Claimable for GasTopupQueueRow {
    fn id(&self) -> i64 {
        self.job.id
    }
    fn priority(&self) -> Priority {
        parse_priority(&self.job.priority)
    }
    fn scheduled_at(&self) -> DateTime<Utc> {
        self.job.scheduled_at
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct WorkerExecutionLogRow {
    pub id: i64,
    pub worker_id: String,
    pub status: String,
    pub duration_ms: i64,
    pub message: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct WorkerConfigRow {
    pub key: String,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, FromRow)]
pub struct WorkerMaintenanceRow {
    pub id: i64,
    pub worker_type: Option<String>,
    pub chain_id: Option<i64>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub reason: Option<String>,
}
