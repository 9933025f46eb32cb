use clap::Parser;
use gradebookd::config::Config;
use gradebookd::{dataset, ipc, logging};
use serde_json::json;
use std::io::{self, BufRead, Write};
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    let cfg = Config::parse();
    logging::init(&cfg.log_level, cfg.log_json)?;

    let mut state = ipc::AppState::default();
    if let Some(path) = cfg.dataset.as_ref() {
        let doc = dataset::read_dataset(path)?;
        state.store = dataset::build_store(doc)?;
        state.dataset = Some(path.clone());
    }
    info!(version = env!("CARGO_PKG_VERSION"), "gradebookd ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                error!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                let resp = json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                let _ = writeln!(stdout, "{}", resp);
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }

    info!("stdin closed; exiting");
    Ok(())
}
