//! Receipt and log shapes shared by every adapter (§6.4). Kept
//! deliberately loose — `status` is EVM-flavored, `result` is
//! account-model-flavored — since §4.6 step 5 evaluates success
//! differently per chain family and a confirm stage only ever reads
//! the field that applies to the chain it was built for.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxReceipt {
    /// Absent means not yet mined (§4.6 step 3).
    pub block_number: Option<u64>,
    /// EVM-style receipt status: `Some(1)` success, `Some(0)` revert
    /// (§4.6 step 5).
    pub status: Option<u64>,
    /// Account-model-style result code: absent, empty, or `"SUCCESS"`
    /// all mean success (§4.6 step 5).
    pub result: Option<String>,
    pub gas_used: Option<String>,
    pub gas_price: Option<String>,
    /// Account-model fee actually charged, when the chain reports one
    /// instead of a gas_used/gas_price pair.
    pub fee: Option<String>,
}

impl TxReceipt {
    /// EVM success rule (§4.6 step 5): `receipt.status == 1`.
    pub fn evm_succeeded(&self) -> bool {
        self.status == Some(1)
    }

    /// Account-model success rule (§4.6 step 5): result is absent,
    /// empty, or `"SUCCESS"`.
    pub fn account_model_succeeded(&self) -> bool {
        match &self.result {
            None => true,
            Some(r) => r.is_empty() || r == "SUCCESS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub address: String,
    pub topics: Vec<String>,
    pub data: String,
    pub block_number: u64,
    pub log_index: u32,
    pub tx_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evm_success_requires_status_one() {
        let mut r = TxReceipt { status: Some(1), ..Default::default() };
        assert!(r.evm_succeeded());
        r.status = Some(0);
        assert!(!r.evm_succeeded());
    }

    #[test]
    fn account_model_success_accepts_absent_empty_or_success() {
        assert!(TxReceipt::default().account_model_succeeded());
        assert!(TxReceipt { result: Some(String::new()), ..Default::default() }.account_model_succeeded());
        assert!(TxReceipt { result: Some("SUCCESS".into()), ..Default::default() }.account_model_succeeded());
        assert!(!TxReceipt { result: Some("REVERT".into()), ..Default::default() }.account_model_succeeded());
    }
}
