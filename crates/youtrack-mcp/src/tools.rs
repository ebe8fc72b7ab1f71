//! MCP tool implementations.
//!
//! Each method validates its arguments, makes the tracker call and converts
//! the result into a response model. The server module only routes.

use crate::error::{Error, Result};
use crate::models::{
    ActionResponse, ConnectionInfo, CreateIssueParams, ListIssuesParams, McpAttachment,
    McpComment, McpIssue, McpLink, McpProject, McpTag, McpUser, McpWorkItem, UpdateIssueParams,
};
use chrono::NaiveDate;
use std::path::Path;
use std::sync::Arc;
use youtrack::client::IssueTracker;
use youtrack::command::LinkVerb;
use youtrack::domain::{
    DEFAULT_LIST_LIMIT, FieldChanges, IssueFilter, IssueId, IssueUpdate, NewIssue, NewWorkItem,
    validate_issue_id,
};
use youtrack::duration::parse_duration;

/// Tool implementations for the YouTrack MCP server.
pub struct Tools {
    tracker: Arc<dyn IssueTracker>,
    base_url: String,
    default_project: Option<String>,
}

fn issue_id(raw: &str) -> Result<IssueId> {
    validate_issue_id(raw)
        .map(IssueId::new)
        .map_err(|reason| Error::InvalidArgument {
            field: "issue_id",
            value: raw.to_string(),
            reason,
        })
}

fn convert<T, U: From<T>>(items: Vec<T>) -> Vec<U> {
    items.into_iter().map(Into::into).collect()
}

impl Tools {
    /// Create a new Tools instance around a tracker.
    pub fn new(
        tracker: Arc<dyn IssueTracker>,
        base_url: impl Into<String>,
        default_project: Option<String>,
    ) -> Self {
        Self {
            tracker,
            base_url: base_url.into(),
            default_project,
        }
    }

    /// Project used when `create_issue` names none.
    #[must_use]
    pub fn default_project(&self) -> Option<&str> {
        self.default_project.as_deref()
    }

    /// List issues matching a query.
    ///
    /// # Errors
    ///
    /// Returns the tracker error if the search fails.
    pub async fn list_issues(&self, params: ListIssuesParams) -> Result<Vec<McpIssue>> {
        let filter = IssueFilter {
            query: params.query,
            project: params.project,
            limit: params.limit.unwrap_or(DEFAULT_LIST_LIMIT),
            skip: params.skip.unwrap_or(0),
        };
        let issues = self.tracker.list_issues(&filter).await?;
        tracing::debug!(count = issues.len(), "list_issues");
        Ok(convert(issues))
    }

    /// Get one issue.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is malformed or the issue does not exist.
    pub async fn get_issue(&self, id: &str) -> Result<McpIssue> {
        let issue = self.tracker.get_issue(&issue_id(id)?).await?;
        Ok(issue.into())
    }

    /// Create an issue in the given or default project.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoProject` when no project can be determined, or the
    /// tracker error if validation or the request fails.
    pub async fn create_issue(&self, params: CreateIssueParams) -> Result<McpIssue> {
        let project = params
            .project
            .as_deref()
            .or(self.default_project.as_deref())
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or(Error::NoProject)?
            .to_string();

        let new_issue = NewIssue {
            project,
            summary: params.summary,
            description: params.description,
            fields: FieldChanges {
                state: params.state,
                priority: params.priority,
                assignee: params.assignee,
                issue_type: params.issue_type,
            },
        };

        let issue = self.tracker.create_issue(new_issue).await?;
        tracing::info!(issue = issue.display_id(), "Created issue");
        Ok(issue.into())
    }

    /// Update the provided fields of an issue.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` when nothing would change, or the
    /// tracker error if the request fails.
    pub async fn update_issue(&self, params: UpdateIssueParams) -> Result<McpIssue> {
        let id = issue_id(&params.issue_id)?;
        let update = IssueUpdate {
            summary: params.summary,
            description: params.description,
            fields: FieldChanges {
                state: params.state,
                priority: params.priority,
                assignee: params.assignee,
                issue_type: params.issue_type,
            },
        };
        if update.is_empty() {
            return Err(Error::InvalidArgument {
                field: "update",
                value: params.issue_id,
                reason: "Provide at least one of summary, description, state, priority, assignee, issue_type".to_string(),
            });
        }

        let issue = self.tracker.update_issue(&id, update).await?;
        tracing::info!(issue = issue.display_id(), "Updated issue");
        Ok(issue.into())
    }

    /// Delete an issue.
    ///
    /// # Errors
    ///
    /// Returns the tracker error if the issue cannot be deleted.
    pub async fn delete_issue(&self, id: &str) -> Result<ActionResponse> {
        let id = issue_id(id)?;
        self.tracker.delete_issue(&id).await?;
        tracing::info!(issue = %id, "Deleted issue");
        Ok(ActionResponse {
            message: format!("Deleted issue {id}"),
            issue_id: id.0,
        })
    }

    /// Apply a command and return the issue as it is afterwards.
    ///
    /// # Errors
    ///
    /// Returns the tracker error if the command is rejected.
    pub async fn apply_command(
        &self,
        id: &str,
        command: &str,
        comment: Option<&str>,
    ) -> Result<McpIssue> {
        let id = issue_id(id)?;
        if command.trim().is_empty() {
            return Err(Error::InvalidArgument {
                field: "command",
                value: command.to_string(),
                reason: "Command cannot be empty".to_string(),
            });
        }
        self.tracker
            .apply_command(&id, command.trim(), comment)
            .await?;
        Ok(self.tracker.get_issue(&id).await?.into())
    }

    /// Tag an issue.
    ///
    /// # Errors
    ///
    /// Returns the tracker error if tagging fails.
    pub async fn add_tag(&self, id: &str, tag: &str) -> Result<McpIssue> {
        Ok(self.tracker.add_tag(&issue_id(id)?, tag).await?.into())
    }

    /// Remove a tag from an issue.
    ///
    /// # Errors
    ///
    /// Returns the tracker error if untagging fails.
    pub async fn remove_tag(&self, id: &str, tag: &str) -> Result<McpIssue> {
        Ok(self.tracker.remove_tag(&issue_id(id)?, tag).await?.into())
    }

    /// List tags visible to the token's owner.
    ///
    /// # Errors
    ///
    /// Returns the tracker error if the request fails.
    pub async fn list_tags(&self) -> Result<Vec<McpTag>> {
        Ok(convert(self.tracker.list_tags().await?))
    }

    /// Comment on an issue.
    ///
    /// # Errors
    ///
    /// Returns the tracker error if the comment is rejected.
    pub async fn add_comment(&self, id: &str, text: &str) -> Result<McpComment> {
        Ok(self.tracker.add_comment(&issue_id(id)?, text).await?.into())
    }

    /// List the comments of an issue.
    ///
    /// # Errors
    ///
    /// Returns the tracker error if the request fails.
    pub async fn list_comments(&self, id: &str) -> Result<Vec<McpComment>> {
        Ok(convert(self.tracker.list_comments(&issue_id(id)?).await?))
    }

    /// List the links of an issue.
    ///
    /// # Errors
    ///
    /// Returns the tracker error if the request fails.
    pub async fn list_links(&self, id: &str) -> Result<Vec<McpLink>> {
        Ok(convert(self.tracker.list_links(&issue_id(id)?).await?))
    }

    /// Link two issues.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown verb or when the tracker rejects the link.
    pub async fn link_issues(&self, id: &str, link: &str, target: &str) -> Result<ActionResponse> {
        let source = issue_id(id)?;
        let target = issue_id(target)?;
        let verb: LinkVerb = link.parse()?;

        self.tracker.link_issues(&source, verb, &target).await?;
        tracing::info!(source = %source, verb = verb.as_str(), target = %target, "Linked issues");
        Ok(ActionResponse {
            message: format!("{source} {verb} {target}"),
            issue_id: source.0,
        })
    }

    /// List the work items of an issue.
    ///
    /// # Errors
    ///
    /// Returns the tracker error if the request fails.
    pub async fn list_work_items(&self, id: &str) -> Result<Vec<McpWorkItem>> {
        Ok(convert(self.tracker.list_work_items(&issue_id(id)?).await?))
    }

    /// Log time against an issue.
    ///
    /// # Errors
    ///
    /// Returns an error for an unparsable duration or date, or the tracker
    /// error if the work item is rejected.
    pub async fn add_work_item(
        &self,
        id: &str,
        duration: &str,
        text: Option<String>,
        date: Option<&str>,
        work_type: Option<String>,
    ) -> Result<McpWorkItem> {
        let id = issue_id(id)?;
        let minutes = parse_duration(duration)?;
        let date = date
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(|d| {
                NaiveDate::parse_from_str(d, "%Y-%m-%d").map_err(|_| Error::InvalidArgument {
                    field: "date",
                    value: d.to_string(),
                    reason: "Expected YYYY-MM-DD".to_string(),
                })
            })
            .transpose()?;

        let item = NewWorkItem {
            minutes,
            text,
            date,
            work_type,
        };
        let created = self.tracker.add_work_item(&id, item).await?;
        tracing::info!(issue = %id, minutes, "Logged work");
        Ok(created.into())
    }

    /// List the attachments of an issue.
    ///
    /// # Errors
    ///
    /// Returns the tracker error if the request fails.
    pub async fn list_attachments(&self, id: &str) -> Result<Vec<McpAttachment>> {
        Ok(convert(self.tracker.list_attachments(&issue_id(id)?).await?))
    }

    /// Upload a local file to an issue.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if the file does not exist, or the
    /// tracker error if the upload fails.
    pub async fn upload_attachment(&self, id: &str, path: &str) -> Result<Vec<McpAttachment>> {
        let id = issue_id(id)?;
        let file = Path::new(path);
        if !tokio::fs::try_exists(file).await.unwrap_or(false) {
            return Err(Error::InvalidArgument {
                field: "path",
                value: path.to_string(),
                reason: "File not found".to_string(),
            });
        }
        Ok(convert(self.tracker.upload_attachment(&id, file).await?))
    }

    /// List projects.
    ///
    /// # Errors
    ///
    /// Returns the tracker error if the request fails.
    pub async fn list_projects(&self, limit: Option<usize>) -> Result<Vec<McpProject>> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT);
        Ok(convert(self.tracker.list_projects(limit).await?))
    }

    /// Get one project by short name, name or id.
    ///
    /// # Errors
    ///
    /// Returns the tracker error if the project does not exist.
    pub async fn get_project(&self, project: &str) -> Result<McpProject> {
        Ok(self.tracker.get_project(project).await?.into())
    }

    /// List users.
    ///
    /// # Errors
    ///
    /// Returns the tracker error if the request fails.
    pub async fn list_users(
        &self,
        query: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<McpUser>> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT);
        Ok(convert(self.tracker.list_users(query, limit).await?))
    }

    /// Get one user by login or id.
    ///
    /// # Errors
    ///
    /// Returns the tracker error if the user does not exist.
    pub async fn get_user(&self, user: &str) -> Result<McpUser> {
        Ok(self.tracker.get_user(user).await?.into())
    }

    /// The user the token belongs to.
    ///
    /// # Errors
    ///
    /// Returns the tracker error if the token is rejected.
    pub async fn current_user(&self) -> Result<McpUser> {
        Ok(self.tracker.current_user().await?.into())
    }

    /// Server, default project and account in use.
    ///
    /// # Errors
    ///
    /// Returns the tracker error if the server cannot be reached or the
    /// token is rejected.
    pub async fn connection_info(&self) -> Result<ConnectionInfo> {
        let user = self.current_user().await?;
        Ok(ConnectionInfo {
            base_url: self.base_url.clone(),
            default_project: self.default_project.clone(),
            user,
        })
    }
}
