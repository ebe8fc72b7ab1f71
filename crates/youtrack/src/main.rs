//! yt CLI binary.

use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use youtrack::cli::Cli;

/// Main entry point for the yt CLI.
///
/// Uses tokio's `current_thread` runtime: every command is a short sequence
/// of I/O-bound requests.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Controlled via RUST_LOG, e.g. RUST_LOG=youtrack=debug shows every request.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("yt=info,youtrack=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting yt CLI");

    let cli = Cli::parse_args();
    match cli.execute().await {
        Ok(()) => {
            tracing::debug!("yt completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
