//! Diagnostic logging setup.

/// Overrides the level passed on the command line when set.
pub const LOG_ENV_VAR: &str = "GORKTRADER_LOG";

/// Install the global `tracing` subscriber. Diagnostics go to stderr so that
/// reports on stdout stay machine-readable.
pub fn init_tracing(log_level: &str) -> Result<(), String> {
    let filter = std::env::var(LOG_ENV_VAR).unwrap_or_else(|_| log_level.to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter)
        .map_err(|err| format!("invalid log filter: {err}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| format!("failed to install tracing subscriber: {err}"))
}
