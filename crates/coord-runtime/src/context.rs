use std::time::Instant;

use chrono::Utc;
use coord_config::Config;
use coord_db::{Db, INCIDENT_MODE_KEY};
use coord_types::enums::{CycleStatus, HealthStatus, IncidentMode};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{incident::domain_allowed, identity::WorkerIdentity};

/// Why a cycle was not allowed to run this tick (§4.1 step 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allowed,
    Maintenance,
    IncidentMode,
}

/// What a cycle function did, reported back up to the control plane
/// (§4.1 step 3). `succeeded + failed` need not equal `processed`: a job
/// claimed but left `pending` (lost the optimistic race to another
/// worker) counts toward neither.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleOutcome {
    pub processed: i64,
    pub succeeded: i64,
    pub failed: i64,
}

#[derive(Debug, Deserialize, Default)]
struct IncidentModeDoc {
    #[serde(default)]
    mode: IncidentMode,
    /// Only consulted in `Degraded` mode, where §4.1's matrix makes the
    /// `gas` domain conditional rather than fixed (§3.2).
    #[serde(default)]
    degraded_gas_allowed: bool,
}

/// Everything a cycle closure needs, bundled so `bin/*-worker` mains stay
/// thin: construct once at startup, pass by reference into the loop.
#[derive(Clone)]
pub struct WorkerContext {
    pub db: Db,
    pub identity: WorkerIdentity,
    pub config: Config,
}

impl WorkerContext {
    pub fn new(db: Db, identity: WorkerIdentity, config: Config) -> Self {
        WorkerContext { db, identity, config }
    }

    pub async fn register(&self) -> anyhow::Result<()> {
        self.db
            .register_worker(&self.identity.worker_id, self.identity.worker_type.as_str(), self.identity.chain_id)
            .await?;
        Ok(())
    }

    async fn incident_mode(&self) -> IncidentModeDoc {
        match self.db.get_worker_config(INCIDENT_MODE_KEY).await {
            Ok(Some(value)) => serde_json::from_value::<IncidentModeDoc>(value).unwrap_or_default(),
            Ok(None) => IncidentModeDoc::default(),
            Err(e) => {
                warn!(error = %e, "failed to read incident mode, defaulting to normal");
                IncidentModeDoc::default()
            }
        }
    }

    async fn maintenance_active(&self) -> bool {
        let now = Utc::now();
        match self
            .db
            .list_active_maintenance(self.identity.worker_type.as_str(), self.identity.chain_id, now)
            .await
        {
            Ok(windows) => !windows.is_empty(),
            Err(e) => {
                warn!(error = %e, "failed to read maintenance windows, assuming none active");
                false
            }
        }
    }

    /// The gating check every cycle runs before touching a domain's
    /// tables (§4.1 step 1).
    pub async fn gate(&self) -> GateDecision {
        if self.maintenance_active().await {
            return GateDecision::Maintenance;
        }
        let doc = self.incident_mode().await;
        if !domain_allowed(doc.mode, self.identity.worker_type.domain(), doc.degraded_gas_allowed) {
            return GateDecision::IncidentMode;
        }
        GateDecision::Allowed
    }

    /// Runs one gated cycle: checks the gate, invokes `cycle_fn` if
    /// allowed, and writes the execution log plus counter deltas (§4.1
    /// steps 1-3) regardless of outcome.
    pub async fn run_cycle<F, Fut>(&self, cycle_fn: F) -> anyhow::Result<()>
    where
        F: FnOnce(WorkerContext) -> Fut,
        Fut: std::future::Future<Output = anyhow::Result<CycleOutcome>>,
    {
        let started = Instant::now();
        match self.gate().await {
            GateDecision::Maintenance => {
                self.db
                    .log_cycle(&self.identity.worker_id, "skip", 0, Some("maintenance window active"), None)
                    .await?;
                return Ok(());
            }
            GateDecision::IncidentMode => {
                self.db
                    .log_cycle(&self.identity.worker_id, "skip", 0, Some("incident mode denies this domain"), None)
                    .await?;
                return Ok(());
            }
            GateDecision::Allowed => {}
        }

        let outcome = cycle_fn(self.clone()).await;
        let duration_ms = started.elapsed().as_millis() as i64;

        match outcome {
            Ok(o) => {
                self.db
                    .record_cycle_counts(&self.identity.worker_id, o.processed, o.succeeded, o.failed)
                    .await?;
                self.db
                    .log_cycle(&self.identity.worker_id, cycle_status_str(&o), duration_ms, None, None)
                    .await?;
                info!(processed = o.processed, succeeded = o.succeeded, failed = o.failed, "cycle complete");
                Ok(())
            }
            Err(e) => {
                self.db
                    .log_cycle(&self.identity.worker_id, "fail", duration_ms, Some(&e.to_string()), None)
                    .await?;
                Err(e)
            }
        }
    }

    /// Runs [`Self::gate`] + `cycle_fn` on a fixed interval until
    /// `shutdown` fires, sleeping `config.scan_interval` between cycles
    /// (§5's "typically 10-15s").
    pub async fn run_loop<F, Fut>(
        &self,
        mut shutdown: tokio::sync::watch::Receiver<bool>,
        mut cycle_fn: F,
    ) -> anyhow::Result<()>
    where
        F: FnMut(WorkerContext) -> Fut,
        Fut: std::future::Future<Output = anyhow::Result<CycleOutcome>>,
    {
        loop {
            if *shutdown.borrow() {
                return Ok(());
            }
            self.run_cycle(|ctx| cycle_fn(ctx)).await?;

            tokio::select! {
                _ = tokio::time::sleep(self.config.scan_interval) => {}
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Heartbeat task (§4.1 step 2): writes `worker_status` every `H`
    /// until shutdown, reporting the current gate decision as both
    /// `status` and `health`. §4.1 ("causes the worker to set paused")
    /// and scenario §8.5 ("keep heartbeating with `status=paused`") both
    /// require the row's `status` column, not just `health_status`, to
    /// reflect a gated worker.
    pub async fn heartbeat_loop(&self, mut shutdown: tokio::sync::watch::Receiver<bool>) -> anyhow::Result<()> {
        let mut ticker = tokio::time::interval(self.config.heartbeat_interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let decision = self.gate().await;
                    let status = match decision {
                        GateDecision::Allowed => "running",
                        GateDecision::Maintenance | GateDecision::IncidentMode => "paused",
                    };
                    let health = match decision {
                        GateDecision::Allowed => HealthStatus::Healthy,
                        GateDecision::Maintenance => HealthStatus::Paused,
                        GateDecision::IncidentMode => HealthStatus::Degraded,
                    };
                    self.db
                        .heartbeat(&self.identity.worker_id, status, health_str(health), None)
                        .await?;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        self.db.mark_stopped(&self.identity.worker_id).await?;
                        return Ok(());
                    }
                }
            }
        }
    }
}

fn cycle_status_str(o: &CycleOutcome) -> &'static str {
    match status_of(o) {
        CycleStatus::Success => "success",
        CycleStatus::Fail => "fail",
        CycleStatus::Skip => "skip",
    }
}

fn status_of(o: &CycleOutcome) -> CycleStatus {
    if o.processed == 0 {
        CycleStatus::Skip
    } else if o.failed > 0 && o.succeeded == 0 {
        CycleStatus::Fail
    } else {
        CycleStatus::Success
    }
}

fn health_str(h: HealthStatus) -> &'static str {
    match h {
        HealthStatus::Healthy => "healthy",
        HealthStatus::Degraded => "degraded",
        HealthStatus::Paused => "paused",
        HealthStatus::Unknown => "unknown",
    }
}
