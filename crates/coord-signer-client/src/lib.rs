//! HTTP adapter for the remote signer service (C4, spec §4.4). One call
//! contract: sign-and-broadcast a [`coord_types::TxIntent`] for a
//! `(wallet_group_id, derivation_index)` identity and get back a
//! `tx_hash`, or a [`coord_types::ClassifiedError`] the caller can feed
//! straight into `coord-queue`'s retry decision. The adapter never logs
//! request or response bodies — only status codes and classified error
//! kinds — since both carry signer-identifying material.

mod response;

pub use response::SignResponse;

use std::time::Duration;

use coord_types::{ClassifiedError, ErrorKind, TxIntent};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::warn;

const SIGNER_IDENTITY_HEADER: &str = "X-Service-Identity";

#[derive(Debug, Serialize)]
struct SignRequest<'a> {
    chain: &'a str,
    wallet_group_id: &'a str,
    derivation_index: i64,
    tx_intent: &'a TxIntent,
}

#[derive(Debug, Clone)]
pub struct SignerClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub service_identity: String,
    pub request_timeout: Duration,
    pub health_timeout: Duration,
}

/// A single HTTP client reused across every signer call this process
/// makes (§9's re-shaping note: "each worker opens its own HTTP
/// client", constructed once, not per-call).
#[derive(Debug, Clone)]
pub struct SignerClient {
    http: Client,
    base_url: String,
    api_key: String,
    service_identity: String,
    health_timeout: Duration,
}

impl SignerClient {
    pub fn new(config: SignerClientConfig) -> Result<Self, ClassifiedError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClassifiedError::new(ErrorKind::Network, format!("failed to build http client: {e}")))?;
        Ok(SignerClient {
            http,
            base_url: config.base_url,
            api_key: config.api_key,
            service_identity: config.service_identity,
            health_timeout: config.health_timeout,
        })
    }

    /// Builds and signs `intent` for `(wallet_group_id, derivation_index)`
    /// on `chain`, returning the broadcast `tx_hash` (§4.4).
    pub async fn sign_and_broadcast(
        &self,
        chain: &str,
        wallet_group_id: &str,
        derivation_index: i64,
        intent: &TxIntent,
    ) -> Result<SignResponse, ClassifiedError> {
        let body = SignRequest { chain, wallet_group_id, derivation_index, tx_intent: intent };

        let result = self
            .http
            .post(format!("{}/v1/sign", self.base_url))
            .bearer_auth(&self.api_key)
            .header(SIGNER_IDENTITY_HEADER, &self.service_identity)
            .json(&body)
            .send()
            .await;

        let response = match result {
            Ok(r) => r,
            Err(e) => return Err(classify_transport_error(&e)),
        };

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ClassifiedError::new(ErrorKind::Unauthorized, "signer rejected credentials"));
        }

        if !status.is_success() {
            let body: serde_json::Value = response.json().await.unwrap_or(serde_json::Value::Null);
            return Err(classify_error_body(status, &body));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ClassifiedError::new(ErrorKind::SigningFailed, format!("malformed signer response: {e}")))?;

        SignResponse::from_json(&body)
    }

    /// Health probe with the shorter §4.4 timeout, used by a worker's
    /// own readiness checks (not part of the job-processing path).
    pub async fn health_check(&self) -> Result<(), ClassifiedError> {
        let result = self
            .http
            .get(format!("{}/v1/health", self.base_url))
            .timeout(self.health_timeout)
            .send()
            .await;

        match result {
            Ok(r) if r.status().is_success() => Ok(()),
            Ok(r) => Err(ClassifiedError::new(ErrorKind::VaultUnavailable, format!("signer unhealthy: {}", r.status()))),
            Err(e) => Err(classify_transport_error(&e)),
        }
    }
}

fn classify_transport_error(e: &reqwest::Error) -> ClassifiedError {
    let kind = if e.is_timeout() || e.is_connect() || e.is_request() {
        ErrorKind::Network
    } else {
        ErrorKind::Unknown
    };
    warn!(kind = ?kind, "signer transport error");
    ClassifiedError::new(kind, "signer request failed")
}

/// Maps the signer's `{errorCode, isRetryable, errorType}` error body
/// (§4.4's table) onto [`ClassifiedError`]. An unrecognized
/// `errorCode`, or a body the signer didn't even bother to classify,
/// falls through to `Unknown` (retryable by default).
fn classify_error_body(status: StatusCode, body: &serde_json::Value) -> ClassifiedError {
    let error_code = body.get("errorCode").and_then(|v| v.as_str()).unwrap_or("");
    let message = body
        .get("message")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| format!("signer returned HTTP {status}"));
    let explicit_retryable = body.get("isRetryable").and_then(|v| v.as_bool());

    let kind = match error_code {
        "UNAUTHORIZED" => ErrorKind::Unauthorized,
        "VAULT_UNAVAILABLE" => ErrorKind::VaultUnavailable,
        "DERIVATION_FAILED" => ErrorKind::DerivationFailed,
        "SIGNING_FAILED" => ErrorKind::SigningFailed,
        _ => ErrorKind::Unknown,
    };

    let mut err = ClassifiedError::new(kind, message);
    if let Some(retryable) = explicit_retryable {
        err = err.with_retryable(retryable);
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_known_error_codes() {
        let body = json!({"errorCode": "DERIVATION_FAILED", "message": "bad index"});
        let err = classify_error_body(StatusCode::BAD_REQUEST, &body);
        assert_eq!(err.kind, ErrorKind::DerivationFailed);
        assert!(!err.retryable);
    }

    #[test]
    fn unrecognized_error_code_defaults_to_unknown_retryable() {
        let body = json!({"errorCode": "SOMETHING_NEW"});
        let err = classify_error_body(StatusCode::INTERNAL_SERVER_ERROR, &body);
        assert_eq!(err.kind, ErrorKind::Unknown);
        assert!(err.retryable);
    }

    #[test]
    fn explicit_is_retryable_overrides_kind_default() {
        let body = json!({"errorCode": "SIGNING_FAILED", "isRetryable": false});
        let err = classify_error_body(StatusCode::INTERNAL_SERVER_ERROR, &body);
        assert_eq!(err.kind, ErrorKind::SigningFailed);
        assert!(!err.retryable);
    }
}
