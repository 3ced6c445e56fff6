//! Per-funder nonce serialization (§4.5 step 6, §5, §9's re-shaping
//! note on the "per-process nonce lock map"): only one concurrent
//! signer call may be in flight for a given funding address, within
//! this process. Keyed on `lower(address)` so case differences in how
//! an address is written never split the lock.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

/// A concurrent map of per-address mutexes. Cheap to clone (wraps an
/// `Arc`); share one instance across every execute-stage cycle in a
/// process.
#[derive(Debug, Clone, Default)]
pub struct NonceGuard {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl NonceGuard {
    pub fn new() -> Self {
        NonceGuard::default()
    }

    /// Holds the mutex for `address` for the duration of `f`, so two
    /// concurrent broadcasts from the same funding address inside this
    /// process never race each other's nonce.
    pub async fn with_lock<T, F, Fut>(&self, address: &str, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = T>,
    {
        let key = address.to_lowercase();
        let mutex = self.locks.entry(key).or_insert_with(|| Arc::new(Mutex::new(()))).clone();
        let _guard = mutex.lock().await;
        f().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn serializes_calls_for_the_same_address_case_insensitively() {
        let guard = NonceGuard::new();
        let counter = Arc::new(AtomicU32::new(0));
        let max_concurrent = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let guard = guard.clone();
            let counter = counter.clone();
            let max_concurrent = max_concurrent.clone();
            handles.push(tokio::spawn(async move {
                guard
                    .with_lock("0xABCDEF", || async {
                        let now = counter.fetch_add(1, Ordering::SeqCst) + 1;
                        max_concurrent.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                        counter.fetch_sub(1, Ordering::SeqCst);
                    })
                    .await;
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(max_concurrent.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn distinct_addresses_do_not_contend() {
        let guard = NonceGuard::new();
        let (a, b) = tokio::join!(
            guard.with_lock("0xAAA", || async { 1 }),
            guard.with_lock("0xBBB", || async { 2 }),
        );
        assert_eq!((a, b), (1, 2));
    }
}
