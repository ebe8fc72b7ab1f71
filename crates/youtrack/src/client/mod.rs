//! Client abstraction for the YouTrack REST API.
//!
//! The [`IssueTracker`] trait is the seam between the CLI / MCP front ends
//! and the remote server. [`YouTrackClient`] is the real implementation;
//! [`MockTracker`] is an in-memory stand-in for tests.
//!
//! # Test Utilities
//!
//! To use [`MockTracker`] from another crate, enable the `test-util` feature:
//!
//! ```toml
//! [dev-dependencies]
//! youtrack = { version = "...", features = ["test-util"] }
//! ```
//!
//! # Example
//!
//! ```no_run
//! use youtrack::client::{IssueTracker, YouTrackClient};
//! use youtrack::config::{Overrides, Settings};
//! use youtrack::domain::IssueFilter;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load(&Overrides::default()).await?;
//!     let client = YouTrackClient::new(&settings)?;
//!
//!     let filter = IssueFilter {
//!         query: Some("#Unresolved for: me".to_string()),
//!         ..Default::default()
//!     };
//!     for issue in client.list_issues(&filter).await? {
//!         println!("{} {}", issue.display_id(), issue.summary);
//!     }
//!     Ok(())
//! }
//! ```

pub mod fields;
mod http;
#[cfg(any(test, feature = "test-util"))]
mod mock;

pub use http::YouTrackClient;
#[cfg(any(test, feature = "test-util"))]
pub use mock::{MockTracker, RecordedCommand};

use crate::command::{self, LinkVerb};
use crate::domain::{
    Attachment, Comment, Issue, IssueFilter, IssueId, IssueLink, IssueUpdate, NewIssue,
    NewWorkItem, Project, Tag, User, WorkItem,
};
use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Operations exposed by the issue tracker.
///
/// Each method maps to one REST call, occasionally two (resolving a project
/// before creating an issue, re-reading an issue after a command). Nothing
/// is cached between calls.
///
/// # Method Categories
///
/// - **Issues**: `list_issues`, `get_issue`, `create_issue`, `update_issue`, `delete_issue`
/// - **Commands**: `apply_command`, `add_tag`, `remove_tag`, `link_issues`
/// - **Issue sub-resources**: comments, links, work items, attachments
/// - **Directory**: projects, users, tags
///
/// # Errors
///
/// All methods return `Error::NotFound` for unknown ids,
/// `Error::Unauthorized` for a rejected token and `Error::Api` for any
/// other upstream failure.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    // ========== Issues ==========

    /// List issues matching a filter, in server order.
    async fn list_issues(&self, filter: &IssueFilter) -> Result<Vec<Issue>>;

    /// Get one issue with all displayed attributes.
    async fn get_issue(&self, id: &IssueId) -> Result<Issue>;

    /// Create an issue, then apply any custom field values.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if `issue.validate()` fails and
    /// `Error::NotFound` if the project does not exist.
    async fn create_issue(&self, issue: NewIssue) -> Result<Issue>;

    /// Update summary, description and custom fields; returns the refreshed issue.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the update is empty or invalid.
    async fn update_issue(&self, id: &IssueId, update: IssueUpdate) -> Result<Issue>;

    /// Delete an issue permanently.
    async fn delete_issue(&self, id: &IssueId) -> Result<()>;

    // ========== Commands ==========

    /// Apply a raw command (`State Fixed`, `for me`) with an optional comment.
    async fn apply_command(&self, id: &IssueId, command: &str, comment: Option<&str>)
        -> Result<()>;

    /// Add a tag, returning the refreshed issue.
    async fn add_tag(&self, id: &IssueId, tag: &str) -> Result<Issue> {
        self.apply_command(id, &command::tag(tag), None).await?;
        self.get_issue(id).await
    }

    /// Remove a tag, returning the refreshed issue.
    async fn remove_tag(&self, id: &IssueId, tag: &str) -> Result<Issue> {
        self.apply_command(id, &command::untag(tag), None).await?;
        self.get_issue(id).await
    }

    /// Link `source` to `target` with the given verb.
    async fn link_issues(&self, source: &IssueId, verb: LinkVerb, target: &IssueId) -> Result<()> {
        self.apply_command(source, &verb.command(target.as_str()), None)
            .await
    }

    /// List all tags visible to the current user.
    async fn list_tags(&self) -> Result<Vec<Tag>>;

    // ========== Issue sub-resources ==========

    /// List comments on an issue, oldest first.
    async fn list_comments(&self, id: &IssueId) -> Result<Vec<Comment>>;

    /// Add a comment to an issue.
    async fn add_comment(&self, id: &IssueId, text: &str) -> Result<Comment>;

    /// List link groups that contain at least one issue.
    async fn list_links(&self, id: &IssueId) -> Result<Vec<IssueLink>>;

    /// List time-tracking work items.
    async fn list_work_items(&self, id: &IssueId) -> Result<Vec<WorkItem>>;

    /// Log time against an issue.
    async fn add_work_item(&self, id: &IssueId, item: NewWorkItem) -> Result<WorkItem>;

    /// List attachments.
    async fn list_attachments(&self, id: &IssueId) -> Result<Vec<Attachment>>;

    /// Upload a local file as an attachment; returns the created attachments.
    async fn upload_attachment(&self, id: &IssueId, path: &Path) -> Result<Vec<Attachment>>;

    // ========== Directory ==========

    /// List projects.
    async fn list_projects(&self, limit: usize) -> Result<Vec<Project>>;

    /// Get a project by database id, short name or name.
    async fn get_project(&self, id: &str) -> Result<Project>;

    /// List users, optionally filtered by a search query.
    async fn list_users(&self, query: Option<&str>, limit: usize) -> Result<Vec<User>>;

    /// Get a user by database id or login.
    async fn get_user(&self, id: &str) -> Result<User>;

    /// The user that owns the token.
    async fn current_user(&self) -> Result<User>;
}
