//! In-memory [`ChainRpcClient`] fake for confirm-stage tests (§8's
//! testable properties rely on controlling block height and receipts
//! deterministically, without a live chain).

use std::sync::Mutex;

use async_trait::async_trait;

use crate::{error::RpcError, receipt::TxReceipt, ChainRpcClient, LogEntry};

#[derive(Debug, Default)]
pub struct FakeChainRpc {
    inner: Mutex<FakeState>,
}

#[derive(Debug)]
struct FakeState {
    block_number: u64,
    gas_price: u64,
    receipts: std::collections::HashMap<String, TxReceipt>,
}

impl Default for FakeState {
    fn default() -> Self {
        FakeState { block_number: 0, gas_price: 10, receipts: Default::default() }
    }
}

impl FakeChainRpc {
    pub fn new(block_number: u64) -> Self {
        FakeChainRpc { inner: Mutex::new(FakeState { block_number, ..Default::default() }) }
    }

    pub fn set_block_number(&self, n: u64) {
        self.inner.lock().unwrap().block_number = n;
    }

    pub fn set_gas_price(&self, gwei: u64) {
        self.inner.lock().unwrap().gas_price = gwei;
    }

    pub fn set_receipt(&self, tx_hash: &str, receipt: TxReceipt) {
        self.inner.lock().unwrap().receipts.insert(tx_hash.to_string(), receipt);
    }
}

#[async_trait]
impl ChainRpcClient for FakeChainRpc {
    async fn current_block_number(&self) -> Result<u64, RpcError> {
        Ok(self.inner.lock().unwrap().block_number)
    }

    async fn current_gas_price(&self) -> Result<u64, RpcError> {
        Ok(self.inner.lock().unwrap().gas_price)
    }

    async fn get_transaction_receipt(&self, tx_hash: &str) -> Result<Option<TxReceipt>, RpcError> {
        Ok(self.inner.lock().unwrap().receipts.get(tx_hash).cloned())
    }

    async fn get_logs(&self, _address: &str, _from_block: u64, _to_block: u64, _topics: &[String]) -> Result<Vec<LogEntry>, RpcError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_configured_block_number_and_receipt() {
        let fake = FakeChainRpc::new(100);
        fake.set_receipt("0xabc", TxReceipt { block_number: Some(90), status: Some(1), ..Default::default() });

        assert_eq!(fake.current_block_number().await.unwrap(), 100);
        let receipt = fake.get_transaction_receipt("0xabc").await.unwrap().unwrap();
        assert_eq!(receipt.block_number, Some(90));
        assert!(fake.get_transaction_receipt("0xmissing").await.unwrap().is_none());
    }
}
