//! MCP parameter and response models.
//!
//! Parameter structs describe tool arguments (their doc comments become the
//! JSON schema descriptions an assistant sees). Response structs flatten
//! YouTrack resources into plain fields: custom fields become a
//! `name -> value` map and timestamps become RFC 3339 strings.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use youtrack::domain::{
    Attachment, Comment, Issue, IssueLink, LinkDirection, Project, Tag, User, WorkItem, timestamp,
};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for `list_issues`.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListIssuesParams {
    /// YouTrack search query (e.g. "#Unresolved for: me", "State: Open").
    pub query: Option<String>,

    /// Restrict to one project (short name, e.g. "DEMO").
    pub project: Option<String>,

    /// Maximum number of issues to return (default 50).
    pub limit: Option<usize>,

    /// Number of matching issues to skip, for paging.
    pub skip: Option<usize>,
}

/// Parameters for tools that act on a single issue.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct IssueParams {
    /// Issue id, readable ("DEMO-42") or database ("2-17").
    pub issue_id: String,
}

/// Parameters for `create_issue`.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct CreateIssueParams {
    /// One-line summary (maximum 255 characters).
    pub summary: String,

    /// Description in Markdown.
    pub description: Option<String>,

    /// Project short name. Falls back to the server's default project.
    pub project: Option<String>,

    /// State, e.g. "Open".
    pub state: Option<String>,

    /// Priority, e.g. "Major".
    pub priority: Option<String>,

    /// Assignee login, "me", or "Unassigned".
    pub assignee: Option<String>,

    /// Issue type, e.g. "Bug".
    pub issue_type: Option<String>,
}

/// Parameters for `update_issue`. Only provided fields change.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct UpdateIssueParams {
    /// Issue id to update.
    pub issue_id: String,

    /// New summary.
    pub summary: Option<String>,

    /// New description.
    pub description: Option<String>,

    /// New state.
    pub state: Option<String>,

    /// New priority.
    pub priority: Option<String>,

    /// New assignee login, "me", or "Unassigned".
    pub assignee: Option<String>,

    /// New issue type.
    pub issue_type: Option<String>,
}

/// Parameters for `apply_command`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ApplyCommandParams {
    /// Issue id.
    pub issue_id: String,

    /// Command text, e.g. "State Fixed" or "for me".
    pub command: String,

    /// Comment to post together with the command.
    pub comment: Option<String>,
}

/// Parameters for `add_tag` and `remove_tag`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TagParams {
    /// Issue id.
    pub issue_id: String,

    /// Tag name.
    pub tag: String,
}

/// Parameters for `add_comment`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AddCommentParams {
    /// Issue id.
    pub issue_id: String,

    /// Comment text in Markdown.
    pub text: String,
}

/// Parameters for `link_issues`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LinkIssuesParams {
    /// Source issue id.
    pub issue_id: String,

    /// Link verb: "relates to", "depends on", "is required for",
    /// "duplicates", "is duplicated by", "subtask of" or "parent for".
    pub link: String,

    /// Target issue id.
    pub target: String,
}

/// Parameters for `add_work_item`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AddWorkItemParams {
    /// Issue id.
    pub issue_id: String,

    /// Time spent, e.g. "1h 30m", "2d" or "45" (minutes).
    /// A day is 8 hours and a week is 5 days.
    pub duration: String,

    /// Note describing the work.
    pub text: Option<String>,

    /// Day the work was done, YYYY-MM-DD (default today).
    pub date: Option<String>,

    /// Work type name, e.g. "Development".
    pub work_type: Option<String>,
}

/// Parameters for `upload_attachment`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UploadAttachmentParams {
    /// Issue id.
    pub issue_id: String,

    /// Path of a local file readable by the server process.
    pub path: String,
}

/// Parameters for `list_projects`.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListProjectsParams {
    /// Maximum number of projects to return (default 50).
    pub limit: Option<usize>,
}

/// Parameters for `get_project`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetProjectParams {
    /// Short name, name, or database id.
    pub project: String,
}

/// Parameters for `list_users`.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListUsersParams {
    /// Search by login, name or email.
    pub query: Option<String>,

    /// Maximum number of users to return (default 50).
    pub limit: Option<usize>,
}

/// Parameters for `get_user`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetUserParams {
    /// Login or database id.
    pub user: String,
}

// ============================================================================
// Responses
// ============================================================================

fn rfc3339(time: Option<DateTime<Utc>>) -> Option<String> {
    time.map(|t| t.to_rfc3339())
}

/// Issue representation for MCP responses.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpIssue {
    /// Database id.
    pub id: String,

    /// Readable id, e.g. "DEMO-42".
    pub id_readable: String,

    /// Summary line.
    pub summary: String,

    /// Description, if any.
    pub description: Option<String>,

    /// Project short name.
    pub project: Option<String>,

    /// Reporter login.
    pub reporter: Option<String>,

    /// State field value.
    pub state: Option<String>,

    /// Priority field value.
    pub priority: Option<String>,

    /// Type field value.
    pub issue_type: Option<String>,

    /// Assignee field value.
    pub assignee: Option<String>,

    /// Whether the issue is resolved.
    pub resolved: bool,

    /// Tag names.
    pub tags: Vec<String>,

    /// Every custom field that has a value, by name.
    pub custom_fields: BTreeMap<String, String>,

    /// Creation timestamp (RFC 3339).
    pub created_at: Option<String>,

    /// Last update timestamp (RFC 3339).
    pub updated_at: Option<String>,

    /// Resolution timestamp (RFC 3339), if resolved.
    pub resolved_at: Option<String>,
}

impl From<Issue> for McpIssue {
    fn from(issue: Issue) -> Self {
        let custom_fields = issue
            .custom_fields
            .iter()
            .filter_map(|f| f.display_value().map(|v| (f.name.clone(), v)))
            .collect();

        Self {
            state: issue.state(),
            priority: issue.priority(),
            issue_type: issue.issue_type(),
            assignee: issue.assignee(),
            resolved: issue.is_resolved(),
            tags: issue.tag_names(),
            created_at: rfc3339(issue.created_at()),
            updated_at: rfc3339(issue.updated_at()),
            resolved_at: rfc3339(issue.resolved_at()),
            custom_fields,
            project: issue.project.map(|p| p.short_name),
            reporter: issue.reporter.map(|u| u.login),
            id: issue.id,
            id_readable: issue.id_readable,
            summary: issue.summary,
            description: issue.description,
        }
    }
}

/// Comment representation for MCP responses.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpComment {
    /// Database id.
    pub id: String,

    /// Comment text.
    pub text: String,

    /// Author login.
    pub author: Option<String>,

    /// Creation timestamp (RFC 3339).
    pub created_at: Option<String>,
}

impl From<Comment> for McpComment {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            text: comment.text.unwrap_or_default(),
            author: comment.author.map(|u| u.login),
            created_at: rfc3339(timestamp(comment.created)),
        }
    }
}

/// Issue reference inside a link.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpLinkedIssue {
    /// Readable id.
    pub id_readable: String,

    /// Summary line.
    pub summary: String,

    /// Whether the linked issue is resolved.
    pub resolved: bool,
}

/// Link representation for MCP responses.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpLink {
    /// Link type name, e.g. "Depend".
    pub link_type: String,

    /// "outward", "inward" or "both".
    pub direction: String,

    /// Verb as read from this issue, e.g. "depends on".
    pub verb: String,

    /// Linked issues.
    pub issues: Vec<McpLinkedIssue>,
}

impl From<IssueLink> for McpLink {
    fn from(link: IssueLink) -> Self {
        let direction = match link.direction {
            LinkDirection::Outward => "outward",
            LinkDirection::Inward => "inward",
            LinkDirection::Both => "both",
        };
        Self {
            verb: link.label().to_string(),
            direction: direction.to_string(),
            link_type: link.link_type.name,
            issues: link
                .issues
                .into_iter()
                .map(|issue| McpLinkedIssue {
                    resolved: issue.is_resolved(),
                    id_readable: issue.id_readable,
                    summary: issue.summary,
                })
                .collect(),
        }
    }
}

/// Work item representation for MCP responses.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpWorkItem {
    /// Database id.
    pub id: String,

    /// Author login.
    pub author: Option<String>,

    /// Day of the work (YYYY-MM-DD).
    pub date: Option<String>,

    /// Duration in minutes.
    pub minutes: u32,

    /// Duration as YouTrack renders it, e.g. "1h 30m".
    pub duration: String,

    /// Note.
    pub text: Option<String>,

    /// Work type name.
    pub work_type: Option<String>,
}

impl From<WorkItem> for McpWorkItem {
    fn from(item: WorkItem) -> Self {
        Self {
            id: item.id,
            author: item.author.map(|u| u.login),
            date: timestamp(item.date).map(|t| t.date_naive().to_string()),
            minutes: item.duration.minutes,
            duration: item
                .duration
                .presentation
                .unwrap_or_else(|| youtrack::duration::format_minutes(item.duration.minutes)),
            text: item.text,
            work_type: item.work_type.map(|t| t.name),
        }
    }
}

/// Attachment representation for MCP responses.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpAttachment {
    /// Database id.
    pub id: String,

    /// File name.
    pub name: String,

    /// Size in bytes.
    pub size: u64,

    /// MIME type.
    pub mime_type: Option<String>,

    /// Download path relative to the server URL.
    pub url: Option<String>,

    /// Upload timestamp (RFC 3339).
    pub created_at: Option<String>,

    /// Uploader login.
    pub author: Option<String>,
}

impl From<Attachment> for McpAttachment {
    fn from(attachment: Attachment) -> Self {
        Self {
            id: attachment.id,
            name: attachment.name,
            size: attachment.size,
            mime_type: attachment.mime_type,
            url: attachment.url,
            created_at: rfc3339(timestamp(attachment.created)),
            author: attachment.author.map(|u| u.login),
        }
    }
}

/// Project representation for MCP responses.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpProject {
    /// Database id.
    pub id: String,

    /// Short name used in issue ids.
    pub short_name: String,

    /// Full name.
    pub name: String,

    /// Description.
    pub description: Option<String>,

    /// Whether the project is archived.
    pub archived: bool,

    /// Project lead login.
    pub leader: Option<String>,
}

impl From<Project> for McpProject {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            short_name: project.short_name,
            name: project.name,
            description: project.description,
            archived: project.archived,
            leader: project.leader.map(|u| u.login),
        }
    }
}

/// User representation for MCP responses.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpUser {
    /// Database id.
    pub id: String,

    /// Login.
    pub login: String,

    /// Full name.
    pub full_name: Option<String>,

    /// Email address.
    pub email: Option<String>,

    /// Whether the account is banned.
    pub banned: bool,
}

impl From<User> for McpUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            login: user.login,
            full_name: user.full_name,
            email: user.email,
            banned: user.banned,
        }
    }
}

/// Tag representation for MCP responses.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpTag {
    /// Database id.
    pub id: Option<String>,

    /// Tag name.
    pub name: String,
}

impl From<Tag> for McpTag {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
        }
    }
}

/// Result of a tool that changes state but returns no resource.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ActionResponse {
    /// Issue the action applied to.
    pub issue_id: String,

    /// What happened.
    pub message: String,
}

/// Response from the `connection_info` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConnectionInfo {
    /// Server URL in use.
    pub base_url: String,

    /// Project used when `create_issue` names none.
    pub default_project: Option<String>,

    /// The account the token belongs to.
    pub user: McpUser,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use youtrack::domain::{CustomField, LinkType};

    fn issue() -> Issue {
        Issue {
            id: "2-7".to_string(),
            id_readable: "DEMO-7".to_string(),
            summary: "Crash on start".to_string(),
            created: Some(1_710_460_800_000),
            custom_fields: vec![
                CustomField {
                    name: "State".to_string(),
                    value: json!({ "name": "Open" }),
                },
                CustomField {
                    name: "Assignee".to_string(),
                    value: json!({ "login": "jdoe", "fullName": "Jane Doe" }),
                },
                CustomField {
                    name: "Fix versions".to_string(),
                    value: json!([{ "name": "1.0" }, { "name": "1.1" }]),
                },
                CustomField {
                    name: "Estimation".to_string(),
                    value: serde_json::Value::Null,
                },
            ],
            tags: vec![Tag {
                id: None,
                name: "urgent".to_string(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_issue_custom_fields_are_flattened() {
        let mcp = McpIssue::from(issue());
        assert_eq!(mcp.state.as_deref(), Some("Open"));
        assert_eq!(mcp.assignee.as_deref(), Some("Jane Doe"));
        assert_eq!(mcp.custom_fields["Fix versions"], "1.0, 1.1");
        assert!(!mcp.custom_fields.contains_key("Estimation"));
        assert_eq!(mcp.tags, vec!["urgent"]);
        assert!(!mcp.resolved);
    }

    #[test]
    fn test_timestamps_are_rfc3339() {
        let mcp = McpIssue::from(issue());
        assert_eq!(mcp.created_at.as_deref(), Some("2024-03-15T00:00:00+00:00"));
        assert!(mcp.resolved_at.is_none());
    }

    #[test]
    fn test_link_uses_verb_for_direction() {
        let link = IssueLink {
            direction: LinkDirection::Inward,
            link_type: LinkType {
                name: "Depend".to_string(),
                source_to_target: Some("depends on".to_string()),
                target_to_source: Some("is required for".to_string()),
            },
            issues: vec![issue()],
        };
        let mcp = McpLink::from(link);
        assert_eq!(mcp.direction, "inward");
        assert_eq!(mcp.verb, "is required for");
        assert_eq!(mcp.issues[0].id_readable, "DEMO-7");
    }

    #[test]
    fn test_params_accept_minimal_json() {
        let params: ListIssuesParams = serde_json::from_value(json!({})).unwrap();
        assert!(params.query.is_none());

        let params: CreateIssueParams =
            serde_json::from_value(json!({ "summary": "Fix it" })).unwrap();
        assert_eq!(params.summary, "Fix it");
        assert!(params.project.is_none());
    }
}
