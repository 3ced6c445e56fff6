//! Success-response parsing (§4.4): the signer's `tx_hash` field comes
//! back under one of several aliases depending on which signer
//! implementation answers, so this is tolerant parsing rather than a
//! plain `#[derive(Deserialize)]` struct.

use coord_types::{ClassifiedError, ErrorKind};
use serde_json::Value;

/// Field names the signer has been observed to use for the broadcast
/// transaction hash (§4.4: "MUST also accept `txHash`,
/// `transactionHash`, `tx_id`, `txid` as aliases").
const TX_HASH_ALIASES: &[&str] = &["tx_hash", "txHash", "transactionHash", "tx_id", "txid"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignResponse {
    pub tx_hash: String,
}

impl SignResponse {
    /// Parses a successful signer response body, trying each alias in
    /// turn and failing if none are present (§4.4: "failing if none
    /// present").
    pub fn from_json(body: &Value) -> Result<Self, ClassifiedError> {
        for key in TX_HASH_ALIASES {
            if let Some(tx_hash) = body.get(*key).and_then(Value::as_str) {
                return Ok(SignResponse { tx_hash: tx_hash.to_string() });
            }
        }
        Err(ClassifiedError::new(
            ErrorKind::SigningFailed,
            "signer response carried no recognized tx_hash field",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_canonical_field() {
        let resp = SignResponse::from_json(&json!({"tx_hash": "0xabc"})).unwrap();
        assert_eq!(resp.tx_hash, "0xabc");
    }

    #[test]
    fn accepts_every_documented_alias() {
        for key in TX_HASH_ALIASES {
            let body = json!({ *key: "0xdead" });
            let resp = SignResponse::from_json(&body).unwrap();
            assert_eq!(resp.tx_hash, "0xdead");
        }
    }

    #[test]
    fn fails_when_no_alias_present() {
        let err = SignResponse::from_json(&json!({"unrelated": true})).unwrap_err();
        assert_eq!(err.kind, ErrorKind::SigningFailed);
    }
}
