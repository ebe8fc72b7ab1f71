//! CLI argument structs for all commands.
//!
//! Each command has its own argument struct with clap derive attributes
//! for parsing and validation.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use super::validators::{
    validate_date, validate_duration, validate_issue_id, validate_link_verb, validate_non_empty,
    validate_summary,
};
use crate::command::LinkVerb;
use crate::domain::{DEFAULT_LIST_LIMIT, FieldChanges};

/// Custom field values shared by `create` and `update`
#[derive(Args, Debug, Clone, Default)]
pub struct FieldArgs {
    /// State (e.g., "Open", "In Progress", "Fixed")
    #[arg(short, long)]
    pub state: Option<String>,

    /// Priority (e.g., "Critical", "Major", "Normal")
    #[arg(short, long)]
    pub priority: Option<String>,

    /// Assignee login ("me" and "Unassigned" are understood by the server)
    #[arg(short, long)]
    pub assignee: Option<String>,

    /// Issue type (e.g., "Bug", "Task", "Feature")
    #[arg(short = 't', long = "type")]
    pub issue_type: Option<String>,
}

impl From<&FieldArgs> for FieldChanges {
    fn from(args: &FieldArgs) -> Self {
        Self {
            state: args.state.clone(),
            priority: args.priority.clone(),
            assignee: args.assignee.clone(),
            issue_type: args.issue_type.clone(),
        }
    }
}

/// Arguments for the `list` command
#[derive(Parser, Debug, Clone)]
pub struct ListArgs {
    /// YouTrack search query (e.g., "#Unresolved for: me")
    #[arg(short, long)]
    pub query: Option<String>,

    /// Maximum number of issues to display
    #[arg(short = 'n', long, default_value_t = DEFAULT_LIST_LIMIT)]
    pub limit: usize,

    /// Number of issues to skip
    #[arg(long, default_value_t = 0)]
    pub skip: usize,
}

/// Arguments for the `show` command
#[derive(Parser, Debug, Clone)]
pub struct ShowArgs {
    /// Issue ID to display (e.g., DEMO-42)
    #[arg(value_parser = validate_issue_id)]
    pub issue_id: String,
}

/// Arguments for the `create` command
#[derive(Parser, Debug, Clone)]
pub struct CreateArgs {
    /// Issue summary (maximum 255 characters)
    #[arg(long, value_parser = validate_summary)]
    pub summary: String,

    /// Detailed description (Markdown)
    #[arg(short = 'D', long)]
    pub description: Option<String>,

    /// Custom fields to set after creation
    #[command(flatten)]
    pub fields: FieldArgs,
}

/// Arguments for the `update` command
#[derive(Parser, Debug, Clone)]
pub struct UpdateArgs {
    /// Issue ID to update
    #[arg(value_parser = validate_issue_id)]
    pub issue_id: String,

    /// New summary (maximum 255 characters)
    #[arg(long, value_parser = validate_summary)]
    pub summary: Option<String>,

    /// New description
    #[arg(short = 'D', long)]
    pub description: Option<String>,

    /// Custom field changes
    #[command(flatten)]
    pub fields: FieldArgs,
}

/// Arguments for the `delete` command
#[derive(Parser, Debug, Clone)]
pub struct DeleteArgs {
    /// Issue ID to delete
    #[arg(value_parser = validate_issue_id)]
    pub issue_id: String,

    /// Confirm the deletion (required)
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the `command` command
#[derive(Parser, Debug, Clone)]
pub struct CommandArgs {
    /// Issue ID to apply the command to
    #[arg(value_parser = validate_issue_id)]
    pub issue_id: String,

    /// Command text (e.g., "State Fixed", "for me", "tag urgent")
    #[arg(value_parser = validate_non_empty)]
    pub command: String,

    /// Comment to add together with the command
    #[arg(short, long)]
    pub comment: Option<String>,
}

/// Arguments for the `tag` command
#[derive(Parser, Debug, Clone)]
pub struct TagArgs {
    /// Tag subcommand
    #[command(subcommand)]
    pub action: TagAction,
}

/// Tag management actions
#[derive(Subcommand, Debug, Clone)]
pub enum TagAction {
    /// Add a tag to an issue
    Add {
        /// Issue ID
        #[arg(value_parser = validate_issue_id)]
        issue_id: String,

        /// Tag name
        #[arg(value_parser = validate_non_empty)]
        tag: String,
    },

    /// Remove a tag from an issue
    Remove {
        /// Issue ID
        #[arg(value_parser = validate_issue_id)]
        issue_id: String,

        /// Tag name
        #[arg(value_parser = validate_non_empty)]
        tag: String,
    },

    /// List tags visible to the current user
    List,
}

/// Arguments for the `comment` command
#[derive(Parser, Debug, Clone)]
pub struct CommentArgs {
    /// Comment subcommand
    #[command(subcommand)]
    pub action: CommentAction,
}

/// Comment actions
#[derive(Subcommand, Debug, Clone)]
pub enum CommentAction {
    /// Add a comment
    Add {
        /// Issue ID
        #[arg(value_parser = validate_issue_id)]
        issue_id: String,

        /// Comment text (Markdown)
        #[arg(value_parser = validate_non_empty)]
        text: String,
    },

    /// List comments, oldest first
    List {
        /// Issue ID
        #[arg(value_parser = validate_issue_id)]
        issue_id: String,
    },
}

/// Arguments for the `link` command
#[derive(Parser, Debug, Clone)]
pub struct LinkArgs {
    /// Link subcommand
    #[command(subcommand)]
    pub action: LinkAction,
}

/// Link actions
#[derive(Subcommand, Debug, Clone)]
pub enum LinkAction {
    /// Link two issues
    Add {
        /// Source issue ID
        #[arg(value_parser = validate_issue_id)]
        issue_id: String,

        /// Link verb: "relates to", "depends on", "is required for",
        /// "duplicates", "is duplicated by", "subtask of" or "parent for"
        ///
        /// Hyphenated forms and aliases such as "blocks" or "child-of" are
        /// accepted too.
        #[arg(value_parser = validate_link_verb)]
        verb: LinkVerb,

        /// Target issue ID
        #[arg(value_parser = validate_issue_id)]
        target: String,
    },

    /// List links of an issue
    List {
        /// Issue ID
        #[arg(value_parser = validate_issue_id)]
        issue_id: String,
    },
}

/// Arguments for the `worklog` command
#[derive(Parser, Debug, Clone)]
pub struct WorklogArgs {
    /// Worklog subcommand
    #[command(subcommand)]
    pub action: WorklogAction,
}

/// Time tracking actions
#[derive(Subcommand, Debug, Clone)]
pub enum WorklogAction {
    /// Log time against an issue
    Add {
        /// Issue ID
        #[arg(value_parser = validate_issue_id)]
        issue_id: String,

        /// Time spent (e.g., "1h 30m", "2d", "45")
        ///
        /// Units: w (5 days), d (8 hours), h, m. A bare number means minutes.
        #[arg(value_parser = validate_duration)]
        duration: u32,

        /// Note
        #[arg(long)]
        text: Option<String>,

        /// Day the work was done (YYYY-MM-DD, default today)
        #[arg(long, value_parser = validate_date)]
        date: Option<NaiveDate>,

        /// Work type name (e.g., "Development")
        #[arg(short = 't', long = "type")]
        work_type: Option<String>,
    },

    /// List work items of an issue
    List {
        /// Issue ID
        #[arg(value_parser = validate_issue_id)]
        issue_id: String,
    },
}

/// Arguments for the `attachment` command
#[derive(Parser, Debug, Clone)]
pub struct AttachmentArgs {
    /// Attachment subcommand
    #[command(subcommand)]
    pub action: AttachmentAction,
}

/// Attachment actions
#[derive(Subcommand, Debug, Clone)]
pub enum AttachmentAction {
    /// Upload a file
    Add {
        /// Issue ID
        #[arg(value_parser = validate_issue_id)]
        issue_id: String,

        /// File to upload
        file: PathBuf,
    },

    /// List attachments of an issue
    List {
        /// Issue ID
        #[arg(value_parser = validate_issue_id)]
        issue_id: String,
    },
}

/// Arguments for the `project` command
#[derive(Parser, Debug, Clone)]
pub struct ProjectArgs {
    /// Project subcommand
    #[command(subcommand)]
    pub action: ProjectAction,
}

/// Project actions
#[derive(Subcommand, Debug, Clone)]
pub enum ProjectAction {
    /// List projects
    List {
        /// Maximum number of projects to display
        #[arg(short = 'n', long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: usize,
    },

    /// Show one project
    Show {
        /// Short name, name or database id
        #[arg(value_parser = validate_non_empty)]
        project: String,
    },
}

/// Arguments for the `user` command
#[derive(Parser, Debug, Clone)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub action: UserAction,
}

/// User actions
#[derive(Subcommand, Debug, Clone)]
pub enum UserAction {
    /// List users
    List {
        /// Search by login, name or email
        #[arg(short, long)]
        query: Option<String>,

        /// Maximum number of users to display
        #[arg(short = 'n', long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: usize,
    },

    /// Show one user
    Show {
        /// Login or database id
        #[arg(value_parser = validate_non_empty)]
        user: String,
    },

    /// Show the user that owns the token
    Me,
}

/// Arguments for the `config` command
#[derive(Parser, Debug, Clone)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Write a config file
    ///
    /// Stores the values of the global `--url`, `--token` and `--project`
    /// flags in the config file so later commands need no flags.
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show effective settings and where each came from
    Show,

    /// Print the config file path
    Path,
}
