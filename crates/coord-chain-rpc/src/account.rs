//! Account-model chain adapter (e.g. a UTXO-less smart-contract
//! platform such as TRON), speaking a REST-over-HTTP API instead of
//! JSON-RPC. Same [`ChainRpcClient`] contract, different wire shape.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::{
    error::RpcError,
    receipt::{LogEntry, TxReceipt},
    retry::with_retry,
    ChainRpcClient,
};

#[derive(Debug)]
pub struct AccountModelRpcClient {
    http: Client,
    base_url: String,
}

impl AccountModelRpcClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, RpcError> {
        let http = Client::builder()
            .build()
            .map_err(|e| RpcError::Transport(format!("failed to build http client: {e}")))?;
        Ok(AccountModelRpcClient { http, base_url: base_url.into() })
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, RpcError> {
        let resp = self
            .http
            .post(format!("{}{path}", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        if resp.status().as_u16() == 429 {
            return Err(RpcError::RateLimited(format!("{path} rate limited")));
        }
        if !resp.status().is_success() {
            return Err(RpcError::Transport(format!("{path} returned {}", resp.status())));
        }
        resp.json().await.map_err(|e| RpcError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl ChainRpcClient for AccountModelRpcClient {
    async fn current_block_number(&self) -> Result<u64, RpcError> {
        with_retry(|| async {
            let v = self.post("/wallet/getnowblock", Value::Null).await?;
            v.get("block_header")
                .and_then(|h| h.get("raw_data"))
                .and_then(|r| r.get("number"))
                .and_then(Value::as_u64)
                .ok_or_else(|| RpcError::Malformed("missing block number in getnowblock response".into()))
        })
        .await
    }

    /// Gas-price preflight is EVM-only (§4.5 step 6); no execute stage
    /// reads this on an account-model chain.
    async fn current_gas_price(&self) -> Result<u64, RpcError> {
        Ok(0)
    }

    async fn get_transaction_receipt(&self, tx_hash: &str) -> Result<Option<TxReceipt>, RpcError> {
        with_retry(|| async {
            let v = self
                .post("/wallet/gettransactioninfobyid", serde_json::json!({ "value": tx_hash }))
                .await?;
            if v.as_object().map(|o| o.is_empty()).unwrap_or(true) {
                return Ok(None);
            }
            let block_number = v.get("blockNumber").and_then(Value::as_u64);
            let result = v
                .get("receipt")
                .and_then(|r| r.get("result"))
                .and_then(Value::as_str)
                .map(str::to_string);
            let fee = v.get("fee").and_then(Value::as_u64).map(|n| n.to_string());
            Ok(Some(TxReceipt { block_number, status: None, result, gas_used: None, gas_price: None, fee }))
        })
        .await
    }

    async fn get_logs(
        &self,
        _address: &str,
        _from_block: u64,
        _to_block: u64,
        _topics: &[String],
    ) -> Result<Vec<LogEntry>, RpcError> {
        // The deposit scanner that would consume this is out of scope
        // (§1); account-model log retrieval goes through a
        // provider-specific event-index endpoint no worker here calls.
        Ok(Vec::new())
    }
}
