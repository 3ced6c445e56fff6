//! A small task supervisor modeled on the `strata_tasks::TaskManager`
//! contract observed from `bin/strata-sequencer/src/main.rs`
//! (`create_executor`, `spawn_critical_async`, `start_signal_listeners`,
//! `monitor`), reimplemented here since that crate's own source was not
//! part of the retrieved tree. A worker binary's `main` builds one
//! `TaskManager`, spawns its cycle loop through the executor it hands
//! back, and calls `monitor` to block until shutdown.

use std::time::Duration;

use tokio::{
    runtime::Handle,
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::{error, info, warn};

/// A handle used to spawn tasks whose failure should bring the whole
/// process down, rather than leaving a worker running with half its
/// machinery dead.
#[derive(Clone)]
pub struct Executor {
    handle: Handle,
    failure_tx: mpsc::UnboundedSender<(&'static str, anyhow::Error)>,
}

impl Executor {
    /// Spawns `fut` under `name`. If it returns `Err`, the failure is
    /// reported to the [`TaskManager`] monitoring this executor, which
    /// triggers a coordinated shutdown of every other task.
    pub fn spawn_critical_async<F>(&self, name: &'static str, fut: F) -> JoinHandle<()>
    where
        F: std::future::Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let tx = self.failure_tx.clone();
        self.handle.spawn(async move {
            match fut.await {
                Ok(()) => info!(task = name, "task completed"),
                Err(e) => {
                    error!(task = name, error = %e, "critical task failed");
                    let _ = tx.send((name, e));
                }
            }
        })
    }
}

/// Owns the shutdown signal and the channel critical tasks report
/// failures on.
pub struct TaskManager {
    handle: Handle,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    failure_tx: mpsc::UnboundedSender<(&'static str, anyhow::Error)>,
    failure_rx: mpsc::UnboundedReceiver<(&'static str, anyhow::Error)>,
}

impl TaskManager {
    pub fn new(handle: Handle) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (failure_tx, failure_rx) = mpsc::unbounded_channel();
        TaskManager { handle, shutdown_tx, shutdown_rx, failure_tx, failure_rx }
    }

    pub fn create_executor(&self) -> Executor {
        Executor { handle: self.handle.clone(), failure_tx: self.failure_tx.clone() }
    }

    /// A receiver a long-running loop can poll (`has_changed` /
    /// `borrow`) to notice a requested shutdown without owning the
    /// [`TaskManager`] itself.
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    /// Registers `SIGINT`/`SIGTERM` (`Ctrl+C` and a container orchestrator's
    /// stop signal) as shutdown triggers.
    pub fn start_signal_listeners(&self) {
        let tx = self.shutdown_tx.clone();
        self.handle.spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("received shutdown signal");
                let _ = tx.send(true);
            }
        });

        #[cfg(unix)]
        {
            let tx = self.shutdown_tx.clone();
            self.handle.spawn(async move {
                let mut term = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(s) => s,
                    Err(e) => {
                        warn!(error = %e, "failed to install SIGTERM listener");
                        return;
                    }
                };
                term.recv().await;
                info!("received SIGTERM");
                let _ = tx.send(true);
            });
        }
    }

    /// Blocks until a shutdown signal fires or a critical task reports
    /// failure, then waits up to `timeout` (`None` = forever) for the
    /// process to wind down before returning.
    pub fn monitor(mut self, timeout: Option<Duration>) -> anyhow::Result<()> {
        self.handle.clone().block_on(async move {
            tokio::select! {
                _ = wait_for_shutdown(&mut self.shutdown_rx) => {
                    info!("shutdown requested, draining tasks");
                }
                Some((name, e)) = self.failure_rx.recv() => {
                    error!(task = name, error = %e, "shutting down after critical task failure");
                    let _ = self.shutdown_tx.send(true);
                    return Err(e);
                }
            }

            if let Some(t) = timeout {
                tokio::time::sleep(t).await;
            }
            Ok(())
        })
    }
}

async fn wait_for_shutdown(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow() {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn executor_reports_critical_failure() {
        let handle = Handle::current();
        let tm = TaskManager::new(handle);
        let mut failure_rx = {
            let executor = tm.create_executor();
            executor.spawn_critical_async("boom", async { Err(anyhow::anyhow!("kaboom")) });
            tm.failure_rx
        };
        let (name, err) = failure_rx.recv().await.unwrap();
        assert_eq!(name, "boom");
        assert_eq!(err.to_string(), "kaboom");
    }
}
