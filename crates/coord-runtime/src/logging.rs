//! Structured logging setup, grounded on `bin/strata-sequencer`'s
//! `init_logging` but trimmed to what this workspace actually needs: no
//! OTLP exporter, since an outer observability surface is out of scope
//! (§1's Non-goals) — only the env-filtered subscriber that every
//! binary here wires up the same way.

use tracing_subscriber::{fmt, EnvFilter};

/// Installs a global `tracing` subscriber. `json` selects the teacher's
/// machine-readable format for production deployments; plain text is
/// easier to read when running a worker locally.
pub fn init_logging(default_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

    let subscriber = fmt().with_env_filter(filter).with_target(true);
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
