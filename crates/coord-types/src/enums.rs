//! Status, role, and classification enums straight out of §3 and §4.1.

use serde::{Deserialize, Serialize};

/// `operation_wallet_addresses.role` (§3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletRole {
    Hot,
    Gas,
    Cold,
}

/// `wallet_balances.processing_status` (§3.1). `Idle` is the only state
/// in which a new lock may be acquired (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Idle,
    Consolidating,
    GasTopup,
    Withdrawing,
}

impl ProcessingStatus {
    pub fn is_idle(self) -> bool {
        matches!(self, ProcessingStatus::Idle)
    }
}

/// `deposits.status` (§3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositStatus {
    Pending,
    Confirmed,
}

/// `withdrawal_requests.status` (§3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalRequestStatus {
    Pending,
    Approved,
    Queued,
    Completed,
    Failed,
}

/// Shared lifecycle for `withdrawal_queue` / `consolidation_queue` /
/// `gas_topup_queue` (§3.1, §3.3). The sequence
/// `Pending -> Processing -> Confirming -> Confirmed|Failed` is
/// monotonic; only `Pending -> Pending` (a retry) may repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    Pending,
    Processing,
    Confirming,
    Confirmed,
    Failed,
}

/// `*_queue.priority` (§3.1); ordering used by the claim procedure (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Normal,
    Low,
}

impl Priority {
    /// `priority_rank` from §4.2 step 2: lower sorts first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Normal => 1,
            Priority::Low => 2,
        }
    }
}

/// The fixed domain a worker process belongs to, used by the
/// incident-mode permission matrix (§4.1). Distinct from the table of
/// per-stage `worker_type` strings stored in `worker_status`: several
/// worker types (e.g. `withdrawal_execute` and `withdrawal_confirm`)
/// map to the same domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerDomain {
    Balances,
    DepositsListen,
    DepositsConfirm,
    Gas,
    Consolidation,
    Withdrawals,
    Orchestration,
}

/// `worker_status.status` (§3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerLifecycle {
    Starting,
    Running,
    Paused,
    Stopped,
}

/// `worker_status.health_status` (§3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Paused,
    Unknown,
}

/// `worker_configs.incident_mode.mode` (§3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IncidentMode {
    #[default]
    Normal,
    Degraded,
    Emergency,
}

/// The concrete `worker_type` string stored in `worker_status` and
/// `worker_maintenance` (§3.2, §6.5). Distinct from [`WorkerDomain`]:
/// several worker types map to the same domain in the incident-mode
/// permission matrix (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerType {
    DepositConfirm,
    WithdrawalEnqueue,
    WithdrawalExecute,
    WithdrawalConfirm,
    ConsolidationExecute,
    ConsolidationConfirm,
    GasTopupExecute,
    GasTopupConfirm,
    Orchestration,
}

impl WorkerType {
    /// `worker_id = "<worker_type>_<pid>"` (§6.6).
    pub fn as_str(self) -> &'static str {
        match self {
            WorkerType::DepositConfirm => "deposit_confirm",
            WorkerType::WithdrawalEnqueue => "withdrawal_enqueue",
            WorkerType::WithdrawalExecute => "withdrawal_execute",
            WorkerType::WithdrawalConfirm => "withdrawal_confirm",
            WorkerType::ConsolidationExecute => "consolidation_execute",
            WorkerType::ConsolidationConfirm => "consolidation_confirm",
            WorkerType::GasTopupExecute => "gas_topup_execute",
            WorkerType::GasTopupConfirm => "gas_topup_confirm",
            WorkerType::Orchestration => "orchestration",
        }
    }

    /// The fixed `worker_type -> domain` mapping the incident-mode
    /// permission matrix (§4.1) is keyed on. `deposits_listen` has no
    /// corresponding worker type implemented by this workspace (the
    /// scanner is out of scope, §1) but is kept in [`WorkerDomain`] for
    /// completeness of the matrix.
    pub fn domain(self) -> WorkerDomain {
        match self {
            WorkerType::DepositConfirm => WorkerDomain::DepositsConfirm,
            WorkerType::WithdrawalEnqueue
            | WorkerType::WithdrawalExecute
            | WorkerType::WithdrawalConfirm => WorkerDomain::Withdrawals,
            WorkerType::ConsolidationExecute | WorkerType::ConsolidationConfirm => {
                WorkerDomain::Consolidation
            }
            WorkerType::GasTopupExecute | WorkerType::GasTopupConfirm => WorkerDomain::Gas,
            WorkerType::Orchestration => WorkerDomain::Orchestration,
        }
    }
}

impl std::fmt::Display for WorkerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which transaction-encoding family a chain belongs to (§4.4's two
/// `tx_intent` shapes, §4.5's "Chain-specific pre-flight (EVM only)",
/// §4.6 step 5's two success-evaluation rules). `chains` (§3.1) carries
/// no such column, so this is resolved per-process from `CHAIN_KIND`
/// (see `coord-config`) rather than invented as schema the spec never
/// defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainKind {
    Evm,
    AccountModel,
}

impl ChainKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChainKind::Evm => "evm",
            ChainKind::AccountModel => "account_model",
        }
    }
}

impl std::str::FromStr for ChainKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "evm" => Ok(ChainKind::Evm),
            "account_model" => Ok(ChainKind::AccountModel),
            _ => Err(()),
        }
    }
}

/// Per-cycle outcome written to `worker_execution_logs` (§4.1 step 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    Success,
    Fail,
    Skip,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_rank_orders_high_first() {
        let mut ps = [Priority::Low, Priority::High, Priority::Normal];
        ps.sort_by_key(|p| p.rank());
        assert_eq!(ps, [Priority::High, Priority::Normal, Priority::Low]);
    }

    #[test]
    fn processing_status_idle_check() {
        assert!(ProcessingStatus::Idle.is_idle());
        assert!(!ProcessingStatus::Consolidating.is_idle());
    }

    #[test]
    fn worker_type_domain_mapping_matches_matrix() {
        assert_eq!(WorkerType::DepositConfirm.domain(), WorkerDomain::DepositsConfirm);
        assert_eq!(WorkerType::WithdrawalEnqueue.domain(), WorkerDomain::Withdrawals);
        assert_eq!(WorkerType::WithdrawalExecute.domain(), WorkerDomain::Withdrawals);
        assert_eq!(WorkerType::WithdrawalConfirm.domain(), WorkerDomain::Withdrawals);
        assert_eq!(WorkerType::ConsolidationExecute.domain(), WorkerDomain::Consolidation);
        assert_eq!(WorkerType::GasTopupExecute.domain(), WorkerDomain::Gas);
        assert_eq!(WorkerType::Orchestration.domain(), WorkerDomain::Orchestration);
    }

    #[test]
    fn worker_type_as_str_matches_worker_id_convention() {
        assert_eq!(WorkerType::WithdrawalExecute.as_str(), "withdrawal_execute");
        assert_eq!(WorkerType::WithdrawalExecute.to_string(), "withdrawal_execute");
    }
}
