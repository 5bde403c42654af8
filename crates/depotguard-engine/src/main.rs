//! depotguard-check
//!
//! Validates a security config file (strict parsing + range checks +
//! `SESSION_TIMEOUT_SECONDS` override) and builds the security core once, so
//! a bad deployment fails here instead of at first request.
//!
//! Usage: `depotguard-check [path]` (default `depotguard.yaml`).

use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use depotguard_core::clock::SystemClock;
use depotguard_engine::{config, SecurityCore};

fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "depotguard.yaml".to_string());

    let cfg = match config::load_from_file(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(%path, code = e.client_code().as_str(), error = %e, "config rejected");
            return ExitCode::FAILURE;
        }
    };

    let core = match SecurityCore::from_config(cfg, Arc::new(SystemClock)) {
        Ok(core) => core,
        Err(e) => {
            tracing::error!(%path, error = %e, "security core failed to start");
            return ExitCode::FAILURE;
        }
    };

    let cfg = core.cfg();
    tracing::info!(
        %path,
        session_ttl_secs = cfg.sessions.ttl_secs,
        lockout_threshold = cfg.lockout.threshold,
        lockout_duration_secs = cfg.lockout.duration_secs,
        login_limit = core.rate_limiter().limit_for("LOGIN"),
        default_limit = cfg.rate_limit.default_limit,
        "config ok"
    );
    core.shutdown();
    ExitCode::SUCCESS
}
