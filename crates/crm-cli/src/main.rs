//! `crm` - command-line front-end for the CRM backend.
//!
//! Signs in, keeps the session token between runs, and lists or edits
//! contacts, companies and deals.

mod cli;
mod commands;
mod output;
mod utils;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crm_core::Config;

use cli::Cli;

// ============================================================================
// Constants
// ============================================================================

/// Subdirectory of the data directory holding log files
const LOG_DIR: &str = "logs";

/// Log file name prefix; the appender adds the date
const LOG_FILE_PREFIX: &str = "crm.log";

/// Initialize the tracing subscriber for logging
///
/// Logs go to stderr, filtered by `RUST_LOG` (default `warn`). With
/// `log_to_file` set in the config they are also written to a daily file
/// under the data directory; the returned guard flushes it on drop.
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let mut guard = None;
    let file_layer = if config.log_to_file {
        match config.data_dir() {
            Ok(dir) => {
                let appender = tracing_appender::rolling::daily(dir.join(LOG_DIR), LOG_FILE_PREFIX);
                let (writer, worker) = tracing_appender::non_blocking(appender);
                guard = Some(worker);
                Some(fmt::layer().with_writer(writer).with_ansi(false))
            }
            Err(e) => {
                eprintln!("Warning: file logging disabled: {}", e);
                None
            }
        }
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: {:#}; using default settings", e);
            Config::default()
        }
    };

    let _guard = init_tracing(&config);
    info!(version = env!("CARGO_PKG_VERSION"), "crm starting");

    match commands::run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!(error = ?e, "Command failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
