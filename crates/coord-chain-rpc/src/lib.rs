//! Opaque per-chain RPC adapters (§6.4): block height, transaction
//! receipt, and log lookups, behind one [`ChainRpcClient`] trait so
//! `coord-stages`'s confirm stages never need to know whether they're
//! talking to an EVM-style node or an account-model chain like TRON.
//! Adapters implement bounded retry with exponential backoff and treat
//! provider rate-limit codes with extended backoff (§6.4).

pub mod account;
pub mod error;
pub mod evm;
pub mod fake;
pub mod receipt;
mod retry;

pub use error::RpcError;
pub use receipt::{LogEntry, TxReceipt};

use async_trait::async_trait;

/// The contract every chain RPC adapter implements (§6.4). Internals —
/// HTTP transport, JSON-RPC vs REST, provider-specific quirks — are
/// deliberately hidden behind this trait; the scanner that produces
/// `get_logs` results into the `deposits` table is out of scope (§1)
/// but the method is kept here since §6.4 specifies its contract.
#[async_trait]
pub trait ChainRpcClient: Send + Sync {
    async fn current_block_number(&self) -> Result<u64, RpcError>;

    /// Current fee/gas price in the chain's gwei-equivalent unit (§4.5
    /// step 6, "Chain-specific pre-flight (EVM only)"). Account-model
    /// adapters still implement this (the trait has one shape) but no
    /// execute stage calls it off an account-model chain.
    async fn current_gas_price(&self) -> Result<u64, RpcError>;

    /// `None` means the transaction has not yet been mined (§4.6 step 3).
    async fn get_transaction_receipt(&self, tx_hash: &str) -> Result<Option<TxReceipt>, RpcError>;

    async fn get_logs(
        &self,
        address: &str,
        from_block: u64,
        to_block: u64,
        topics: &[String],
    ) -> Result<Vec<LogEntry>, RpcError>;
}
