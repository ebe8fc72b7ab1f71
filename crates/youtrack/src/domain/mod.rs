//! Domain types for YouTrack REST resources.
//!
//! These types mirror the JSON entities returned by the YouTrack REST API.
//! Only the attributes named in the `fields` selectors of [`crate::client`]
//! are ever populated, so almost everything is optional or defaulted.

mod request;

pub use request::{
    FieldChanges, IssueFilter, IssueUpdate, NewIssue, NewWorkItem, validate_issue_id,
    validate_summary, DEFAULT_LIST_LIMIT, MAX_SUMMARY_LENGTH,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifier for an issue: readable (`PRJ-123`) or database (`2-17`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssueId(pub String);

impl IssueId {
    /// Create a new issue ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for IssueId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for IssueId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Convert YouTrack's epoch-millisecond timestamps.
pub fn timestamp(millis: Option<i64>) -> Option<DateTime<Utc>> {
    millis.and_then(DateTime::from_timestamp_millis)
}

/// An issue as returned by `/api/issues`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Database id (`2-17`)
    #[serde(default)]
    pub id: String,

    /// Readable id (`PRJ-123`)
    #[serde(default)]
    pub id_readable: String,

    /// One-line summary
    #[serde(default)]
    pub summary: String,

    /// Markdown description
    pub description: Option<String>,

    /// Creation time (epoch millis)
    pub created: Option<i64>,

    /// Last update time (epoch millis)
    pub updated: Option<i64>,

    /// Resolution time (epoch millis), set once the issue is resolved
    pub resolved: Option<i64>,

    /// Owning project
    pub project: Option<Project>,

    /// User who reported the issue
    pub reporter: Option<User>,

    /// Tags attached to the issue
    #[serde(default)]
    pub tags: Vec<Tag>,

    /// Project-specific custom fields (State, Priority, Assignee, ...)
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
}

impl Issue {
    /// Readable id when present, database id otherwise.
    pub fn display_id(&self) -> &str {
        if self.id_readable.is_empty() {
            &self.id
        } else {
            &self.id_readable
        }
    }

    /// Display value of the named custom field (case-insensitive).
    pub fn field(&self, name: &str) -> Option<String> {
        self.custom_fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
            .and_then(CustomField::display_value)
    }

    /// Value of the `State` field.
    pub fn state(&self) -> Option<String> {
        self.field("State")
    }

    /// Value of the `Priority` field.
    pub fn priority(&self) -> Option<String> {
        self.field("Priority")
    }

    /// Value of the `Type` field.
    pub fn issue_type(&self) -> Option<String> {
        self.field("Type")
    }

    /// Value of the `Assignee` field.
    pub fn assignee(&self) -> Option<String> {
        self.field("Assignee")
    }

    /// Whether the issue has a resolution timestamp.
    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    /// Tag names in server order.
    pub fn tag_names(&self) -> Vec<String> {
        self.tags.iter().map(|t| t.name.clone()).collect()
    }

    /// Creation time as a UTC datetime.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        timestamp(self.created)
    }

    /// Update time as a UTC datetime.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        timestamp(self.updated)
    }

    /// Resolution time as a UTC datetime.
    pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
        timestamp(self.resolved)
    }
}

/// A custom field with its raw, polymorphic value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    /// Field name as configured in the project
    #[serde(default)]
    pub name: String,

    /// Raw value: null, object, array of objects, string or number
    #[serde(default)]
    pub value: Value,
}

impl CustomField {
    /// Render the field value for display, `None` when unset.
    pub fn display_value(&self) -> Option<String> {
        render_value(&self.value)
    }
}

fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(render_value).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        Value::Object(map) => ["presentation", "fullName", "name", "login", "text"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .or_else(|| map.get("minutes").and_then(render_value)),
    }
}

/// A project as returned by `/api/admin/projects`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Database id
    #[serde(default)]
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Short name used as issue id prefix
    #[serde(default)]
    pub short_name: String,

    /// Project description
    pub description: Option<String>,

    /// Whether the project is archived
    #[serde(default)]
    pub archived: bool,

    /// Project lead
    pub leader: Option<User>,
}

/// A user account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Database id
    #[serde(default)]
    pub id: String,

    /// Login name
    #[serde(default)]
    pub login: String,

    /// Full display name
    pub full_name: Option<String>,

    /// Email address
    pub email: Option<String>,

    /// Whether the account is banned
    #[serde(default)]
    pub banned: bool,
}

impl User {
    /// Full name when set, login otherwise.
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.login)
    }
}

/// An issue tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Database id
    pub id: Option<String>,

    /// Tag name
    #[serde(default)]
    pub name: String,
}

/// A comment on an issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Database id
    #[serde(default)]
    pub id: String,

    /// Markdown text
    pub text: Option<String>,

    /// Comment author
    pub author: Option<User>,

    /// Creation time (epoch millis)
    pub created: Option<i64>,

    /// Last edit time (epoch millis)
    pub updated: Option<i64>,
}

/// Time spent on a work item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkDuration {
    /// Duration in minutes
    #[serde(default)]
    pub minutes: u32,

    /// Server-side rendering (`1h 30m`)
    pub presentation: Option<String>,
}

/// Named work item type (Development, Testing, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemType {
    /// Database id
    pub id: Option<String>,

    /// Type name
    #[serde(default)]
    pub name: String,
}

/// A time-tracking work item (worklog entry).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Database id
    #[serde(default)]
    pub id: String,

    /// Who logged the time
    pub author: Option<User>,

    /// Day the work was done (epoch millis)
    pub date: Option<i64>,

    /// Time spent
    #[serde(default)]
    pub duration: WorkDuration,

    /// Free-form note
    pub text: Option<String>,

    /// Work type
    #[serde(rename = "type")]
    pub work_type: Option<WorkItemType>,
}

/// A file attached to an issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Database id
    #[serde(default)]
    pub id: String,

    /// File name
    #[serde(default)]
    pub name: String,

    /// Size in bytes
    #[serde(default)]
    pub size: u64,

    /// MIME type
    pub mime_type: Option<String>,

    /// Download URL, relative to the server root
    pub url: Option<String>,

    /// Upload time (epoch millis)
    pub created: Option<i64>,

    /// Uploader
    pub author: Option<User>,
}

/// Direction of a link relative to the issue it was fetched from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LinkDirection {
    /// This issue is the source
    #[default]
    Outward,
    /// This issue is the target
    Inward,
    /// Undirected link
    Both,
}

/// A configured link type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkType {
    /// Link type name (`Depend`, `Relates`, ...)
    #[serde(default)]
    pub name: String,

    /// Verb read from source to target (`is required for`)
    pub source_to_target: Option<String>,

    /// Verb read from target to source (`depends on`)
    pub target_to_source: Option<String>,
}

/// A group of issues linked to an issue through one link type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueLink {
    /// Direction relative to the queried issue
    #[serde(default)]
    pub direction: LinkDirection,

    /// Link type
    #[serde(default)]
    pub link_type: LinkType,

    /// Linked issues
    #[serde(default)]
    pub issues: Vec<Issue>,
}

impl IssueLink {
    /// The verb that describes this link from the queried issue's side.
    pub fn label(&self) -> &str {
        let verb = match self.direction {
            LinkDirection::Outward | LinkDirection::Both => self.link_type.source_to_target.as_deref(),
            LinkDirection::Inward => self.link_type.target_to_source.as_deref(),
        };
        verb.filter(|v| !v.is_empty())
            .unwrap_or(&self.link_type.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn sample_issue() -> Issue {
        serde_json::from_value(json!({
            "$type": "Issue",
            "id": "2-17",
            "idReadable": "DEMO-17",
            "summary": "Crash on save",
            "description": null,
            "created": 1_700_000_000_000_i64,
            "updated": 1_700_000_600_000_i64,
            "resolved": null,
            "project": {"$type": "Project", "shortName": "DEMO", "name": "Demo"},
            "reporter": {"login": "alice", "fullName": "Alice A"},
            "tags": [{"name": "regression"}],
            "customFields": [
                {"$type": "StateIssueCustomField", "name": "State", "value": {"name": "Open"}},
                {"name": "Priority", "value": {"name": "Critical"}},
                {"name": "Assignee", "value": {"login": "bob", "fullName": "Bob B"}},
                {"name": "Estimation", "value": {"minutes": 90, "presentation": "1h 30m"}},
                {"name": "Fix versions", "value": [{"name": "1.0"}, {"name": "1.1"}]},
                {"name": "Story points", "value": 3},
                {"name": "Type", "value": null}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_deserialize_issue_ignores_type_markers() {
        let issue = sample_issue();
        assert_eq!(issue.display_id(), "DEMO-17");
        assert_eq!(issue.project.as_ref().unwrap().short_name, "DEMO");
        assert_eq!(issue.reporter.as_ref().unwrap().display_name(), "Alice A");
        assert_eq!(issue.tag_names(), vec!["regression"]);
        assert!(!issue.is_resolved());
    }

    #[rstest]
    #[case::enum_value("State", Some("Open"))]
    #[case::case_insensitive("priority", Some("Critical"))]
    #[case::user_prefers_full_name("Assignee", Some("Bob B"))]
    #[case::period_presentation("Estimation", Some("1h 30m"))]
    #[case::multi_value("Fix versions", Some("1.0, 1.1"))]
    #[case::number("Story points", Some("3"))]
    #[case::null_value("Type", None)]
    #[case::missing("Severity", None)]
    fn test_custom_field_display(#[case] name: &str, #[case] expected: Option<&str>) {
        assert_eq!(sample_issue().field(name).as_deref(), expected);
    }

    #[test]
    fn test_timestamps_convert_from_millis() {
        let issue = sample_issue();
        let created = issue.created_at().unwrap();
        assert_eq!(created.timestamp(), 1_700_000_000);
        assert!(issue.resolved_at().is_none());
    }

    #[test]
    fn test_display_id_falls_back_to_database_id() {
        let issue = Issue {
            id: "2-5".to_string(),
            ..Default::default()
        };
        assert_eq!(issue.display_id(), "2-5");
    }

    #[test]
    fn test_user_display_name_falls_back_to_login() {
        let user = User {
            login: "carol".to_string(),
            full_name: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(user.display_name(), "carol");
    }

    #[rstest]
    #[case::outward(LinkDirection::Outward, "is required for")]
    #[case::inward(LinkDirection::Inward, "depends on")]
    #[case::both(LinkDirection::Both, "is required for")]
    fn test_link_label_follows_direction(#[case] direction: LinkDirection, #[case] expected: &str) {
        let link = IssueLink {
            direction,
            link_type: LinkType {
                name: "Depend".to_string(),
                source_to_target: Some("is required for".to_string()),
                target_to_source: Some("depends on".to_string()),
            },
            issues: vec![],
        };
        assert_eq!(link.label(), expected);
    }

    #[test]
    fn test_link_label_falls_back_to_type_name() {
        let link: IssueLink = serde_json::from_value(json!({
            "direction": "BOTH",
            "linkType": {"name": "Relates", "sourceToTarget": ""},
            "issues": [{"idReadable": "DEMO-2", "summary": "Other"}]
        }))
        .unwrap();
        assert_eq!(link.label(), "Relates");
        assert_eq!(link.issues[0].display_id(), "DEMO-2");
    }

    #[test]
    fn test_work_item_type_field_is_renamed() {
        let item: WorkItem = serde_json::from_value(json!({
            "id": "8-1",
            "duration": {"minutes": 45, "presentation": "45m"},
            "type": {"name": "Development"}
        }))
        .unwrap();
        assert_eq!(item.duration.minutes, 45);
        assert_eq!(item.work_type.unwrap().name, "Development");
    }
}
