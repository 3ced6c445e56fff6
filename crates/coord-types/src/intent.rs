//! Abstract transfer intents passed to the signer (§4.4, GLOSSARY
//! "Intent"). Chain-specific transaction encoding never leaks past
//! this boundary.

use serde::{Deserialize, Serialize};

/// Native-currency fee cap applied to every account-model intent
/// (§4.5 "Native-chain fee limit"), expressed in the chain's native
/// unit as a decimal string.
pub const ACCOUNT_MODEL_FEE_CAP_NATIVE: &str = "2";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TxIntent {
    /// EVM-style native coin transfer.
    NativeTransfer {
        from: String,
        to: String,
        /// Decimal amount in the chain's smallest unit (wei-equivalent).
        value: String,
        gas_limit: Option<u64>,
        /// Explicit gas price the signer should bid, in gwei-equivalent
        /// units (§4.5 step 6's "bump gas price... and re-sign"). `None`
        /// lets the signer pick on the first attempt; set after a
        /// `replacement underpriced` bump on retries.
        gas_price_gwei: Option<u64>,
    },
    /// EVM-style ERC-20 style token transfer.
    Erc20Transfer {
        from: String,
        to: String,
        amount: String,
        contract_address: String,
        gas_limit: Option<u64>,
        gas_price_gwei: Option<u64>,
    },
    /// Account-model native send (e.g. a UTXO-less smart-contract
    /// platform such as TRON).
    AccountNativeTransfer {
        from: String,
        to: String,
        amount: String,
        /// §4.5 "Native-chain fee limit": always present, capped at
        /// [`ACCOUNT_MODEL_FEE_CAP_NATIVE`].
        fee_cap: String,
    },
    /// Account-model token-standard transfer (e.g. TRC-20).
    AccountTokenTransfer {
        from: String,
        to: String,
        amount: String,
        contract_address: String,
        fee_cap: String,
    },
}

impl TxIntent {
    pub fn from_address(&self) -> &str {
        match self {
            TxIntent::NativeTransfer { from, .. }
            | TxIntent::Erc20Transfer { from, .. }
            | TxIntent::AccountNativeTransfer { from, .. }
            | TxIntent::AccountTokenTransfer { from, .. } => from,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_address_extracts_for_every_variant() {
        let intents = vec![
            TxIntent::NativeTransfer {
                from: "0xA".into(),
                to: "0xB".into(),
                value: "1".into(),
                gas_limit: None,
                gas_price_gwei: None,
            },
            TxIntent::AccountNativeTransfer {
                from: "TAcc".into(),
                to: "TOther".into(),
                amount: "1".into(),
                fee_cap: ACCOUNT_MODEL_FEE_CAP_NATIVE.into(),
            },
        ];
        for intent in intents {
            assert!(!intent.from_address().is_empty());
        }
    }

    #[test]
    fn serializes_with_kind_tag() {
        let intent = TxIntent::Erc20Transfer {
            from: "0xA".into(),
            to: "0xB".into(),
            amount: "10".into(),
            contract_address: "0xC".into(),
            gas_limit: Some(60_000),
            gas_price_gwei: None,
        };
        let json = serde_json::to_value(&intent).unwrap();
        assert_eq!(json["kind"], "erc20_transfer");
    }
}
