//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for `yt` using clap's derive API.
//! Each command has its own argument struct with validation and helpful error messages.
//!
//! # Commands
//!
//! - `list`, `show`, `create`, `update`, `delete`: issue lifecycle
//! - `command`: apply a raw YouTrack command
//! - `tag`, `comment`, `link`, `worklog`, `attachment`: issue sub-resources
//! - `project`, `user`: directory lookups
//! - `config`: write and inspect the config file
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//! - `--url`, `--token`, `--project`, `--config`: override configured settings
//!
//! # Example
//!
//! ```bash
//! yt config init --url https://example.youtrack.cloud --token perm:xxx --project DEMO
//! yt list --query "#Unresolved for: me"
//! yt create --summary "Fix login" --type Bug --priority Major
//! yt update DEMO-42 --state "In Progress" --assignee me
//! yt worklog add DEMO-42 "1h 30m" --text "Investigation"
//! ```

mod args;
mod execute;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

// Re-export argument structs
pub use args::{
    AttachmentAction, AttachmentArgs, CommandArgs, CommentAction, CommentArgs, ConfigAction,
    ConfigArgs, CreateArgs, DeleteArgs, FieldArgs, LinkAction, LinkArgs, ListArgs, ProjectAction,
    ProjectArgs, ShowArgs, TagAction, TagArgs, UpdateArgs, UserAction, UserArgs, WorklogAction,
    WorklogArgs,
};

// Re-export validators for external use
pub use validators::{
    validate_date, validate_duration, validate_issue_id, validate_link_verb, validate_non_empty,
    validate_summary,
};

use crate::app::App;
use crate::config::Overrides;
use crate::output::OutputMode;

/// yt - command-line client for YouTrack
///
/// Lists, creates and updates issues, and manages comments, tags, links,
/// worklogs and attachments over the YouTrack REST API. Settings come from
/// flags, then `YOUTRACK_*` environment variables, then the config file.
#[derive(Parser, Debug)]
#[command(name = "yt")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// YouTrack server URL (overrides `YOUTRACK_URL` and the config file)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Permanent token (overrides `YOUTRACK_TOKEN` and the config file)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Project short name: filters `list`, targets `create`
    #[arg(long, global = true)]
    pub project: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List issues matching a search query
    ///
    /// Uses YouTrack query syntax. `--project` restricts the search to one
    /// project.
    List(ListArgs),

    /// Show detailed information about an issue
    Show(ShowArgs),

    /// Create a new issue
    ///
    /// The project comes from `--project` or the configured default project.
    /// Custom fields are applied right after creation.
    Create(CreateArgs),

    /// Update an existing issue
    ///
    /// Only provided fields are changed. At least one field is required.
    Update(UpdateArgs),

    /// Delete an issue permanently
    ///
    /// This cannot be undone, so `--force` is required.
    Delete(DeleteArgs),

    /// Apply a YouTrack command to an issue
    Command(CommandArgs),

    /// Manage issue tags
    Tag(TagArgs),

    /// Add or list comments
    Comment(CommentArgs),

    /// Add or list issue links
    Link(LinkArgs),

    /// Log or list spent time
    Worklog(WorklogArgs),

    /// Upload or list attachments
    Attachment(AttachmentArgs),

    /// List or show projects
    Project(ProjectArgs),

    /// List or show users
    User(UserArgs),

    /// Manage the config file
    Config(ConfigArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Settings supplied on the command line.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            url: self.url.clone(),
            token: self.token.clone(),
            project: self.project.clone(),
            config: self.config.clone(),
        }
    }

    fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        }
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Some(Commands::Config(args)) => {
                execute::execute_config(args, &self.overrides(), self.output_mode()).await
            }
            Some(_) => {
                let app = App::connect(&self.overrides()).await?;
                self.run(&app).await
            }
            None => {
                println!("yt - YouTrack command-line client");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }

    /// Execute the command against an existing app.
    ///
    /// `config` commands do not need a connection and are rejected here.
    pub async fn run(&self, app: &App) -> Result<()> {
        let mode = self.output_mode();
        let project = self.project.as_deref();

        match &self.command {
            Some(Commands::List(args)) => execute::execute_list(app, args, project, mode).await,
            Some(Commands::Show(args)) => execute::execute_show(app, args, mode).await,
            Some(Commands::Create(args)) => {
                execute::execute_create(app, args, project, mode).await
            }
            Some(Commands::Update(args)) => execute::execute_update(app, args, mode).await,
            Some(Commands::Delete(args)) => execute::execute_delete(app, args, mode).await,
            Some(Commands::Command(args)) => execute::execute_command(app, args, mode).await,
            Some(Commands::Tag(args)) => execute::execute_tag(app, args, mode).await,
            Some(Commands::Comment(args)) => execute::execute_comment(app, args, mode).await,
            Some(Commands::Link(args)) => execute::execute_link(app, args, mode).await,
            Some(Commands::Worklog(args)) => execute::execute_worklog(app, args, mode).await,
            Some(Commands::Attachment(args)) => {
                execute::execute_attachment(app, args, mode).await
            }
            Some(Commands::Project(args)) => execute::execute_project(app, args, mode).await,
            Some(Commands::User(args)) => execute::execute_user(app, args, mode).await,
            Some(Commands::Config(_)) => {
                anyhow::bail!("config commands run without a server connection")
            }
            None => Ok(()),
        }
    }
}
