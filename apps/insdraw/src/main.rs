//! InsDraw command line entry point.

mod app;
mod cli;
mod config;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<ExitCode> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    let config = config::Config::load(cli.config.as_deref())?;
    tracing::debug!(adb = %config.adb_path, "configuration loaded");

    // Build and run the tokio runtime.
    let rt = tokio::runtime::Runtime::new()?;
    let code = match rt.block_on(app::run(cli, config)) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            app::failure_code(&e)
        }
    };

    Ok(exit_code(code))
}

/// Maps a run's return code onto a process exit status.
fn exit_code(code: i32) -> ExitCode {
    match u8::try_from(code) {
        Ok(c) => ExitCode::from(c),
        Err(_) => ExitCode::FAILURE,
    }
}
