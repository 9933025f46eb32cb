use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_ENV: &str = "GRADEBOOKD_LOG";

/// Installs the global subscriber. Always writes to stderr: stdout carries
/// the IPC responses.
pub fn init(default_level: &str, json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow::anyhow!("invalid log filter {default_level:?}: {e}"))?;

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(false)
        .with_writer(std::io::stderr);

    let res = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    res.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}
