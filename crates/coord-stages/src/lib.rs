//! Lifecycle stage implementations (C5-C9, spec §4.5-§4.8): the business
//! logic each `bin/*-worker` cycle closure delegates to. Every `run_once`
//! here takes a [`coord_runtime::WorkerContext`] by value (so it can be
//! handed straight to [`coord_runtime::WorkerContext::run_cycle`]) plus
//! whatever extra long-lived handles that stage needs — a chain RPC
//! client, a signer client, a wallet lock manager — that `WorkerContext`
//! itself doesn't carry.

pub mod confirm_consolidation;
pub mod confirm_gas_topup;
pub mod confirm_withdrawal;
pub mod deposit_confirm;
pub mod execute_consolidation;
pub mod execute_gas_topup;
pub mod execute_withdrawal;
mod execute_common;
pub mod nonce;
pub mod orchestration;
pub mod withdrawal_enqueue;

pub use nonce::NonceGuard;
