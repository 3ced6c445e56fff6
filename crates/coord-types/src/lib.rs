//! Shared domain primitives for the custody workload-coordination core:
//! row identifiers, status/role enums, the cross-stage classified-error
//! taxonomy, exact decimal/raw amount scaling, and signer transfer
//! intents. Kept free of any storage or transport dependency so every
//! other crate in the workspace can share it without dragging in
//! `sqlx` or `reqwest`.

pub mod amount;
pub mod enums;
pub mod error;
pub mod ids;
pub mod intent;

pub use amount::{human_to_raw, raw_to_human, AmountError};
pub use enums::ChainKind;
pub use enums::{
    CycleStatus, DepositStatus, HealthStatus, IncidentMode, Priority, ProcessingStatus,
    QueueStatus, WalletRole, WithdrawalRequestStatus, WorkerDomain, WorkerLifecycle, WorkerType,
};
pub use error::{ClassifiedError, ErrorKind};
pub use ids::{
    AssetId, AssetOnChainId, ChainId, ConsolidationQueueId, DepositId, GasTopupQueueId,
    OperationWalletAddressId, UserId, UserWalletAddressId, WalletBalanceId, WithdrawalQueueId,
    WithdrawalRequestId,
};
pub use intent::TxIntent;
