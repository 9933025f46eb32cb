use clap::Parser;
use std::path::PathBuf;

/// Grade-book calculation sidecar. Speaks newline-delimited JSON on
/// stdin/stdout; logs go to stderr.
#[derive(Debug, Clone, Parser)]
#[command(name = "gradebookd")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Config {
    /// Dataset file to load before serving requests
    #[arg(long, env = "GRADEBOOKD_DATASET", value_name = "PATH")]
    pub dataset: Option<PathBuf>,

    /// Default log filter when GRADEBOOKD_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable ones
    #[arg(long, default_value_t = false)]
    pub log_json: bool,
}
