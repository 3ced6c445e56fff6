//! The central error taxonomy every cross-stage error path goes
//! through (§4.4, §4.5, §7, §9's re-shaping note on ad-hoc "any" error
//! objects).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of error kinds observed anywhere in the pipeline: the
/// signer's response taxonomy (§4.4) and the execute-stage
/// classification (§4.5) are unified here since both ultimately decide
/// the same retry/backoff branch in `coord-queue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Signer credentials wrong or expired. HTTP 401 or `UNAUTHORIZED`.
    Unauthorized,
    /// Signer's key material store is transiently unavailable.
    VaultUnavailable,
    /// Bad `wallet_group_id` / `derivation_index`.
    DerivationFailed,
    /// Transient signing/broadcast fault inside the signer.
    SigningFailed,
    /// Transport-level fault: network error, timeout, connection abort.
    Network,
    /// Missing source wallet, missing asset, bad decimals, and similar
    /// logical invariant breaches (§7 kind 3).
    InvalidData,
    /// On-chain receipt indicates a revert (§4.6 step 5).
    OnChainRevert,
    /// Source wallet balance insufficient to cover the transfer.
    InsufficientBalance,
    /// Current fee/gas price exceeds the configured ceiling (§4.5 step 6).
    GasSpike,
    /// Two broadcasts raced for the same funding nonce.
    NonceConflict,
    /// Account-model freshness/TAPOS-style rejection.
    StaleReference,
    /// Anything else: defaults to retryable per §4.4's table.
    Unknown,
}

impl ErrorKind {
    /// Whether this kind is retryable absent any other context. Some
    /// kinds (`OnChainRevert`) are never retryable; others
    /// (`Unauthorized`, `DerivationFailed`, `InvalidData`) are
    /// terminal by nature. Everything else defaults to retryable,
    /// matching §4.4's "any other -> retryable (default)" rule.
    pub fn default_retryable(self) -> bool {
        !matches!(
            self,
            ErrorKind::Unauthorized | ErrorKind::DerivationFailed | ErrorKind::InvalidData
                | ErrorKind::OnChainRevert
        )
    }
}

/// A classified, structured error carried across stage boundaries.
/// Never wraps secret payloads (§4.4: "the adapter never logs secret
/// payloads").
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("[{kind:?}] {message}")]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub retryable: bool,
    pub message: String,
}

impl ClassifiedError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let retryable = kind.default_retryable();
        Self {
            kind,
            retryable,
            message: message.into(),
        }
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Renders the `"[errorType] msg"` format §4.2's retry/backoff step
    /// stores into `error_message`.
    pub fn to_stored_message(&self) -> String {
        format!("[{:?}] {}", self.kind, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_defaults_non_retryable() {
        let err = ClassifiedError::new(ErrorKind::Unauthorized, "bad token");
        assert!(!err.retryable);
    }

    #[test]
    fn vault_unavailable_defaults_retryable() {
        let err = ClassifiedError::new(ErrorKind::VaultUnavailable, "vault down");
        assert!(err.retryable);
    }

    #[test]
    fn unknown_defaults_retryable() {
        let err = ClassifiedError::new(ErrorKind::Unknown, "huh");
        assert!(err.retryable);
    }

    #[test]
    fn explicit_override_wins() {
        let err = ClassifiedError::new(ErrorKind::Unknown, "huh").with_retryable(false);
        assert!(!err.retryable);
    }

    #[test]
    fn stored_message_format() {
        let err = ClassifiedError::new(ErrorKind::GasSpike, "25 gwei > 20 gwei");
        assert_eq!(err.to_stored_message(), "[GasSpike] 25 gwei > 20 gwei");
    }
}
