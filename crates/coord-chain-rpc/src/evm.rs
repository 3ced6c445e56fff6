//! EVM-style JSON-RPC adapter (`eth_blockNumber`, `eth_getTransactionReceipt`,
//! `eth_getLogs`), built on `jsonrpsee-http-client` the way the teacher's
//! own RPC clients are (`bin/alpen-client/src/rpc_client.rs`).

use async_trait::async_trait;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::rpc_params;
use jsonrpsee_http_client::{HttpClient, HttpClientBuilder};
use serde_json::Value;

use crate::{
    error::RpcError,
    receipt::{LogEntry, TxReceipt},
    retry::{with_retry, RATE_LIMIT_RPC_CODE},
    ChainRpcClient,
};

#[derive(Debug)]
pub struct EvmRpcClient {
    client: HttpClient,
}

impl EvmRpcClient {
    pub fn new(rpc_url: &str) -> Result<Self, RpcError> {
        let client = HttpClientBuilder::default()
            .build(rpc_url)
            .map_err(|e| RpcError::Transport(format!("failed to build http client: {e}")))?;
        Ok(EvmRpcClient { client })
    }

    async fn call(&self, method: &'static str, params: jsonrpsee::core::params::ArrayParams) -> Result<Value, RpcError> {
        self.client.request::<Value, _>(method, params).await.map_err(classify_jsonrpc_error)
    }
}

fn classify_jsonrpc_error(e: jsonrpsee::core::ClientError) -> RpcError {
    if let jsonrpsee::core::ClientError::Call(ref call_err) = e {
        if call_err.code() as i64 == RATE_LIMIT_RPC_CODE {
            return RpcError::RateLimited(call_err.message().to_string());
        }
    }
    RpcError::Transport(e.to_string())
}

fn hex_to_u64(v: &Value) -> Option<u64> {
    v.as_str().and_then(|s| u64::from_str_radix(s.trim_start_matches("0x"), 16).ok())
}

#[async_trait]
impl ChainRpcClient for EvmRpcClient {
    async fn current_block_number(&self) -> Result<u64, RpcError> {
        with_retry(|| async {
            let v = self.call("eth_blockNumber", rpc_params![]).await?;
            hex_to_u64(&v).ok_or_else(|| RpcError::Malformed("non-hex block number".into()))
        })
        .await
    }

    async fn current_gas_price(&self) -> Result<u64, RpcError> {
        with_retry(|| async {
            let v = self.call("eth_gasPrice", rpc_params![]).await?;
            hex_to_u64(&v).ok_or_else(|| RpcError::Malformed("non-hex gas price".into()))
        })
        .await
    }

    async fn get_transaction_receipt(&self, tx_hash: &str) -> Result<Option<TxReceipt>, RpcError> {
        with_retry(|| async {
            let v = self.call("eth_getTransactionReceipt", rpc_params![tx_hash]).await?;
            if v.is_null() {
                return Ok(None);
            }
            let block_number = v.get("blockNumber").and_then(hex_to_u64);
            let status = v.get("status").and_then(hex_to_u64);
            let gas_used = v.get("gasUsed").and_then(Value::as_str).map(str::to_string);
            let gas_price = v.get("effectiveGasPrice").or_else(|| v.get("gasPrice")).and_then(Value::as_str).map(str::to_string);
            Ok(Some(TxReceipt { block_number, status, result: None, gas_used, gas_price, fee: None }))
        })
        .await
    }

    async fn get_logs(
        &self,
        address: &str,
        from_block: u64,
        to_block: u64,
        topics: &[String],
    ) -> Result<Vec<LogEntry>, RpcError> {
        with_retry(|| async {
            let filter = serde_json::json!({
                "address": address,
                "fromBlock": format!("0x{from_block:x}"),
                "toBlock": format!("0x{to_block:x}"),
                "topics": topics,
            });
            let v = self.call("eth_getLogs", rpc_params![filter]).await?;
            let entries = v
                .as_array()
                .ok_or_else(|| RpcError::Malformed("eth_getLogs did not return an array".into()))?
                .iter()
                .filter_map(parse_log_entry)
                .collect();
            Ok(entries)
        })
        .await
    }
}

fn parse_log_entry(v: &Value) -> Option<LogEntry> {
    Some(LogEntry {
        address: v.get("address")?.as_str()?.to_string(),
        topics: v.get("topics")?.as_array()?.iter().filter_map(|t| t.as_str().map(str::to_string)).collect(),
        data: v.get("data")?.as_str().unwrap_or("0x").to_string(),
        block_number: hex_to_u64(v.get("blockNumber")?)?,
        log_index: hex_to_u64(v.get("logIndex")?)? as u32,
        tx_hash: v.get("transactionHash")?.as_str()?.to_string(),
    })
}
