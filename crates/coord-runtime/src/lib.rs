//! Worker identity, heartbeat, maintenance gating, and incident-mode
//! control plane (§4.1, §6.6). Every `bin/*-worker` binary builds one
//! [`WorkerContext`] at startup and drives its cycle loop through
//! [`WorkerContext::run_loop`], wiring shutdown through a
//! [`taskmgr::TaskManager`] the way `bin/strata-sequencer` wires its own
//! duty loops through `strata_tasks::TaskManager`.

pub mod context;
pub mod identity;
pub mod incident;
pub mod logging;
pub mod taskmgr;

pub use context::{CycleOutcome, GateDecision, WorkerContext};
pub use identity::WorkerIdentity;
