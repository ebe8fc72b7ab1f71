//! YouTrack MCP server binary.
//!
//! This binary runs the MCP server using stdio transport. Logs go to stderr
//! so stdout carries nothing but protocol messages.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use youtrack::config::Overrides;
use youtrack_mcp::YouTrackMcpServer;

/// MCP server exposing YouTrack issues over stdio
///
/// Settings come from these flags, then `YOUTRACK_*` environment variables,
/// then the config file written by `yt config init`.
#[derive(Parser, Debug)]
#[command(name = "youtrack-mcp", version, about)]
struct Args {
    /// YouTrack server URL
    #[arg(long)]
    url: Option<String>,

    /// Permanent token
    #[arg(long)]
    token: Option<String>,

    /// Project used when `create_issue` names none
    #[arg(long)]
    project: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

impl Args {
    fn overrides(self) -> Overrides {
        Overrides {
            url: self.url,
            token: self.token,
            project: self.project,
            config: self.config,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("youtrack_mcp=info,youtrack=info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let args = Args::parse();
    tracing::info!("Starting youtrack-mcp server");

    let server = YouTrackMcpServer::connect(&args.overrides()).await?;
    server.run().await?;

    Ok(())
}
