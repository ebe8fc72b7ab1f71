//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};
use std::time::Duration;
use youtrack::app::App;
use youtrack::cli::Cli;
use youtrack::client::MockTracker;
use youtrack::config::Settings;

/// Environment variables that would leak the developer's own setup into tests.
const SCRUBBED_VARS: [&str; 6] = [
    "YOUTRACK_URL",
    "YOUTRACK_TOKEN",
    "YOUTRACK_PROJECT",
    "YOUTRACK_TIMEOUT",
    "YOUTRACK_CONFIG",
    "RUST_LOG",
];

/// Run the yt binary with `config` as its config file and a clean environment.
pub fn run_yt(config: &Path, args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_yt"));
    for var in SCRUBBED_VARS {
        command.env_remove(var);
    }
    command
        .env("YOUTRACK_CONFIG", config)
        .env("NO_COLOR", "1")
        .args(args)
        .output()
        .expect("Failed to execute yt binary")
}

/// Settings for an app that never leaves the process.
pub fn test_settings() -> Settings {
    Settings {
        base_url: "https://yt.example.com".to_string(),
        token: "perm:test-token".to_string(),
        default_project: Some("DEMO".to_string()),
        timeout: Duration::from_secs(5),
    }
}

/// An app backed by a fresh mock tracker.
pub fn mock_app() -> App {
    App::new(Box::new(MockTracker::new()), test_settings())
}

/// Parse `args` as a yt command line and run it against `app`.
pub async fn run_in(app: &App, args: &[&str]) -> anyhow::Result<()> {
    let argv = std::iter::once("yt").chain(args.iter().copied());
    let cli = Cli::try_parse_from(argv)?;
    cli.run(app).await
}
