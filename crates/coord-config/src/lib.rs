//! Environment-driven configuration (§6.5), constructed once at
//! process start and passed down explicitly — no process-wide mutable
//! config singleton (§9's re-shaping note on "singleton clients").

use std::{env, str::FromStr, time::Duration};

use clap::Parser;
use coord_types::ChainKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingEnv(&'static str),
    #[error("invalid value for environment variable {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },
}

/// CLI overrides layered on top of the environment (§6.5). Every field
/// is optional: the environment is the source of truth, the CLI only
/// lets an operator override individual tunables for a local run, the
/// same split the teacher's `bin/strata-sequencer` draws between
/// `args.rs` and `config.rs`.
#[derive(Debug, Parser, Default)]
#[command(about = "custody workload-coordination worker")]
pub struct CliArgs {
    /// Restrict this worker process to a single chain id.
    #[arg(long)]
    pub chain_id: Option<i64>,

    /// Override `SCAN_INTERVAL_MS`.
    #[arg(long)]
    pub scan_interval_ms: Option<u64>,

    /// Override `LOG_LEVEL`.
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Fully resolved configuration for one worker process.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_url: String,
    pub db_key: Option<String>,
    pub signer_base_url: String,
    pub signer_api_key: String,
    pub log_level: String,

    /// How long the worker sleeps between cycles (§5: "typically 10-15s").
    pub scan_interval: Duration,
    /// Heartbeat tick period `H` (§4.1, default 30s).
    pub heartbeat_interval: Duration,

    /// `N` in the claim procedure (§4.2 step 1, default 25).
    pub claim_batch_size: u32,
    /// Confirm-stage poll batch size (§4.6, default 10).
    pub confirm_batch_size: u32,

    /// Per-stage max attempts before a job is marked `failed` outright
    /// (§4.5 step 2, "typically 5-8").
    pub max_attempts: u32,

    /// Retry backoff base (§4.2, default 30s).
    pub retry_backoff_base: Duration,
    /// Retry backoff cap (§4.2, default 15 min).
    pub retry_backoff_cap: Duration,

    /// Consolidation lock TTL (§4.3, default 10 min).
    pub consolidation_lock_ttl: Duration,
    /// Gas top-up lock TTL (§4.3, default 5 min).
    pub gas_lock_ttl: Duration,

    /// EVM gas price ceiling in gwei-equivalent units (§4.5, default 20).
    pub max_gas_price_gwei: u64,
    /// Minimum bump applied on `replacement underpriced` (§4.5, default 15%).
    pub gas_bump_percent: u64,

    /// Signer HTTP request timeout (§4.4, default 15s).
    pub signer_timeout: Duration,
    /// Signer health-check timeout (§4.4, default 5s).
    pub signer_health_timeout: Duration,

    pub chain_id: Option<i64>,
    /// Which transfer-intent / pre-flight family this process's pinned
    /// chain belongs to (§4.4, §4.5). Read from `CHAIN_KIND`
    /// (`evm` | `account_model`); defaults to `evm` since most chains
    /// in the fleet are EVM-style.
    pub chain_kind: ChainKind,
}

impl Config {
    /// Builds a [`Config`] by reading the process environment and
    /// layering `args` CLI overrides on top.
    pub fn from_env(args: &CliArgs) -> Result<Self, ConfigError> {
        let db_url = require_env("DB_URL")?;
        let db_key = env::var("DB_KEY").ok();
        let signer_base_url = require_env("SIGNER_BASE_URL")?;
        let signer_api_key = require_env("SIGNER_API_KEY")?;

        let scan_interval_ms = args
            .scan_interval_ms
            .or_else(|| parse_env_u64("SCAN_INTERVAL_MS"))
            .unwrap_or(12_000);

        let log_level = args
            .log_level
            .clone()
            .or_else(|| env::var("LOG_LEVEL").ok())
            .unwrap_or_else(|| "info".to_string());

        let chain_id = args.chain_id.or_else(|| parse_env_i64("CHAIN_ID"));

        Ok(Config {
            db_url,
            db_key,
            signer_base_url,
            signer_api_key,
            log_level,
            scan_interval: Duration::from_millis(scan_interval_ms),
            heartbeat_interval: Duration::from_millis(
                parse_env_u64("HEARTBEAT_INTERVAL_MS").unwrap_or(30_000),
            ),
            claim_batch_size: parse_env_u64("CLAIM_BATCH_SIZE").unwrap_or(25) as u32,
            confirm_batch_size: parse_env_u64("CONFIRM_BATCH_SIZE").unwrap_or(10) as u32,
            max_attempts: parse_env_u64("MAX_ATTEMPTS").unwrap_or(6) as u32,
            retry_backoff_base: Duration::from_secs(
                parse_env_u64("RETRY_BACKOFF_BASE_SECS").unwrap_or(30),
            ),
            retry_backoff_cap: Duration::from_secs(
                parse_env_u64("RETRY_BACKOFF_CAP_SECS").unwrap_or(900),
            ),
            consolidation_lock_ttl: Duration::from_secs(
                parse_env_u64("CONSOLIDATION_LOCK_TTL_SECS").unwrap_or(600),
            ),
            gas_lock_ttl: Duration::from_secs(parse_env_u64("GAS_LOCK_TTL_SECS").unwrap_or(300)),
            max_gas_price_gwei: parse_env_u64("MAX_GAS_PRICE_GWEI").unwrap_or(20),
            gas_bump_percent: parse_env_u64("GAS_BUMP_PERCENT").unwrap_or(15),
            signer_timeout: Duration::from_secs(parse_env_u64("SIGNER_TIMEOUT_SECS").unwrap_or(15)),
            signer_health_timeout: Duration::from_secs(
                parse_env_u64("SIGNER_HEALTH_TIMEOUT_SECS").unwrap_or(5),
            ),
            chain_id,
            chain_kind: env::var("CHAIN_KIND")
                .ok()
                .and_then(|v| ChainKind::from_str(&v).ok())
                .unwrap_or(ChainKind::Evm),
        })
    }
}

fn require_env(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingEnv(name))
}

fn parse_env_u64(name: &'static str) -> Option<u64> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn parse_env_i64(name: &'static str) -> Option<i64> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-global; serialize the tests
    // that touch them so they don't race each other.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for key in [
            "DB_URL",
            "DB_KEY",
            "SIGNER_BASE_URL",
            "SIGNER_API_KEY",
            "SCAN_INTERVAL_MS",
            "LOG_LEVEL",
            "CHAIN_ID",
            "MAX_GAS_PRICE_GWEI",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn missing_required_env_fails() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        let args = CliArgs::default();
        let err = Config::from_env(&args).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv("DB_URL")));
    }

    #[test]
    fn defaults_apply_when_optional_env_absent() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        env::set_var("DB_URL", "postgres://localhost/custody");
        env::set_var("SIGNER_BASE_URL", "https://signer.internal");
        env::set_var("SIGNER_API_KEY", "secret");

        let args = CliArgs::default();
        let cfg = Config::from_env(&args).unwrap();
        assert_eq!(cfg.scan_interval, Duration::from_millis(12_000));
        assert_eq!(cfg.max_gas_price_gwei, 20);
        assert_eq!(cfg.consolidation_lock_ttl, Duration::from_secs(600));
        assert_eq!(cfg.gas_lock_ttl, Duration::from_secs(300));
        clear_env();
    }

    #[test]
    fn cli_args_override_environment() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        env::set_var("DB_URL", "postgres://localhost/custody");
        env::set_var("SIGNER_BASE_URL", "https://signer.internal");
        env::set_var("SIGNER_API_KEY", "secret");
        env::set_var("SCAN_INTERVAL_MS", "1000");

        let args = CliArgs {
            chain_id: Some(7),
            scan_interval_ms: Some(5000),
            log_level: None,
        };
        let cfg = Config::from_env(&args).unwrap();
        assert_eq!(cfg.scan_interval, Duration::from_millis(5000));
        assert_eq!(cfg.chain_id, Some(7));
        clear_env();
    }
}
