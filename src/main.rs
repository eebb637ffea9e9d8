use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use studytrackd::ipc;

/// Study-tracking sidecar: JSON requests on stdin, one JSON response per line on stdout.
#[derive(Debug, Parser)]
#[command(name = "studytrackd", version)]
struct Cli {
    /// Workspace directory to open at start-up.
    #[arg(long, env = "STUDYTRACKD_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Log debug output to stderr.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = init_tracing(cli.quiet, cli.verbose) {
        eprintln!("studytrackd: {e:#}");
    }

    let mut state = ipc::AppState::default();
    if let Some(path) = cli.workspace.as_deref() {
        // A bad start-up workspace leaves the sidecar usable; the UI can still select one.
        if let Err(e) = ipc::open_workspace(&mut state, path) {
            tracing::error!(error = %format!("{e:#}"), "failed to open start-up workspace");
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "stdin closed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // No request id to answer with.
                let resp = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                let _ = writeln!(stdout, "{resp}");
                let _ = stdout.flush();
                continue;
            }
        };

        tracing::debug!(id = %req.id, method = %req.method, "request");
        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("STUDYTRACKD_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
