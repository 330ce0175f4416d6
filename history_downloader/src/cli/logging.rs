use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "HISTORY_DOWNLOADER_LOG";

/// Installs the global subscriber, writing to stderr so stdout stays clean
/// for command output. `HISTORY_DOWNLOADER_LOG` overrides `log_level`.
pub fn init_tracing(log_level: &str) -> Result<(), String> {
    let filter = std::env::var(LOG_ENV_VAR).unwrap_or_else(|_| log_level.to_string());
    let env_filter =
        EnvFilter::try_new(filter).map_err(|err| format!("invalid log filter: {err}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| format!("failed to install tracing subscriber: {err}"))
}
