//! Bounded retry with exponential backoff for RPC calls (§6.4: "Adapters
//! MUST implement bounded retry with exponential backoff and MUST treat
//! provider rate-limit codes (e.g. `-32005`) with extended backoff").

use std::time::Duration;

use tracing::warn;

use crate::error::RpcError;

const MAX_ATTEMPTS: u32 = 4;
const BASE_DELAY: Duration = Duration::from_millis(250);
/// Dedicated rate-limit backoff ladder (§7 kind 2: "30 / 45 / 60 s").
const RATE_LIMIT_DELAYS_SECS: [u64; 3] = [30, 45, 60];

/// JSON-RPC error code providers commonly use for "too many requests"
/// (§6.4's example, `-32005`).
pub const RATE_LIMIT_RPC_CODE: i64 = -32005;

pub async fn with_retry<T, F, Fut>(mut call: F) -> Result<T, RpcError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, RpcError>>,
{
    let mut rate_limit_hits = 0usize;
    let mut last_err = None;
    for attempt in 0..MAX_ATTEMPTS {
        let err = match call().await {
            Ok(v) => return Ok(v),
            Err(e) => e,
        };

        if attempt + 1 == MAX_ATTEMPTS {
            last_err = Some(err);
            break;
        }

        match &err {
            RpcError::RateLimited(msg) => {
                let delay_secs = RATE_LIMIT_DELAYS_SECS
                    .get(rate_limit_hits)
                    .copied()
                    .unwrap_or(*RATE_LIMIT_DELAYS_SECS.last().unwrap());
                rate_limit_hits += 1;
                warn!(attempt, delay_secs, "rpc call rate limited: {msg}");
                tokio::time::sleep(Duration::from_secs(delay_secs)).await;
            }
            e => {
                let delay = BASE_DELAY * 2u32.pow(attempt);
                warn!(attempt, ?delay, "rpc call failed, retrying: {e}");
                tokio::time::sleep(delay).await;
            }
        }
        last_err = Some(err);
    }
    Err(last_err.expect("loop runs at least once since MAX_ATTEMPTS > 0"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_until_success() {
        let attempts = AtomicU32::new(0);
        let result = with_retry(|| {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(RpcError::Transport("boom".into()))
                } else {
                    Ok(42)
                }
            }
        })
        .await;
        assert_eq!(result, Ok(42));
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let result: Result<(), RpcError> =
            with_retry(|| async { Err(RpcError::Transport("always fails".into())) }).await;
        assert!(result.is_err());
    }
}
