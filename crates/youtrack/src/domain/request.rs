//! Request shapes and input validation.
//!
//! Everything here is validated locally so that obviously bad input never
//! costs a round trip to the server.

use crate::command;
use crate::error::{Error, Result};
use chrono::NaiveDate;

/// Maximum accepted summary length, in characters.
pub const MAX_SUMMARY_LENGTH: usize = 255;

/// Default page size for list operations.
pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Changes to the well-known custom fields, applied through a command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldChanges {
    /// New `State` value
    pub state: Option<String>,

    /// New `Priority` value
    pub priority: Option<String>,

    /// New `Assignee` login (`me` and `Unassigned` are accepted upstream)
    pub assignee: Option<String>,

    /// New `Type` value
    pub issue_type: Option<String>,
}

impl FieldChanges {
    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.state.is_none()
            && self.priority.is_none()
            && self.assignee.is_none()
            && self.issue_type.is_none()
    }

    /// Render as a YouTrack command, e.g. `State {In Progress} Assignee jdoe`.
    ///
    /// Returns `None` when nothing is set.
    pub fn to_command(&self) -> Option<String> {
        let parts: Vec<String> = [
            ("State", &self.state),
            ("Priority", &self.priority),
            ("Assignee", &self.assignee),
            ("Type", &self.issue_type),
        ]
        .into_iter()
        .filter_map(|(name, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| format!("{name} {}", command::quote(v)))
        })
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// Data for creating a new issue.
#[derive(Debug, Clone, Default)]
pub struct NewIssue {
    /// Project short name or database id
    pub project: String,

    /// Issue summary
    pub summary: String,

    /// Issue description
    pub description: Option<String>,

    /// Custom fields to set right after creation
    pub fields: FieldChanges,
}

impl NewIssue {
    /// Validate before sending.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for an empty project or a bad summary.
    pub fn validate(&self) -> Result<()> {
        if self.project.trim().is_empty() {
            return Err(Error::invalid("project", "project is required"));
        }
        validate_summary(&self.summary).map_err(|e| Error::invalid("summary", e))?;
        Ok(())
    }
}

/// Data for updating an existing issue.
#[derive(Debug, Clone, Default)]
pub struct IssueUpdate {
    /// New summary (if updating)
    pub summary: Option<String>,

    /// New description (if updating)
    pub description: Option<String>,

    /// Custom field changes (if updating)
    pub fields: FieldChanges,
}

impl IssueUpdate {
    /// Whether the update would change nothing.
    pub fn is_empty(&self) -> bool {
        self.summary.is_none() && self.description.is_none() && self.fields.is_empty()
    }

    /// Whether summary or description is set (these go through `POST issues/{id}`).
    pub fn has_text_changes(&self) -> bool {
        self.summary.is_some() || self.description.is_some()
    }

    /// Command for the custom field part of the update.
    pub fn to_command(&self) -> Option<String> {
        self.fields.to_command()
    }

    /// Validate before sending.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` when empty or when the summary is bad.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::invalid("update", "no fields to update"));
        }
        if let Some(summary) = &self.summary {
            validate_summary(summary).map_err(|e| Error::invalid("summary", e))?;
        }
        Ok(())
    }
}

/// Filter for listing issues.
#[derive(Debug, Clone)]
pub struct IssueFilter {
    /// YouTrack search query
    pub query: Option<String>,

    /// Restrict to one project (folded into the query)
    pub project: Option<String>,

    /// Page size (`$top`)
    pub limit: usize,

    /// Offset (`$skip`)
    pub skip: usize,
}

impl Default for IssueFilter {
    fn default() -> Self {
        Self {
            query: None,
            project: None,
            limit: DEFAULT_LIST_LIMIT,
            skip: 0,
        }
    }
}

impl IssueFilter {
    /// Combined search query, `None` when neither project nor query is set.
    pub fn effective_query(&self) -> Option<String> {
        let project = self
            .project
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| format!("project: {}", command::quote(p)));
        let query = self
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);

        match (project, query) {
            (Some(p), Some(q)) => Some(format!("{p} {q}")),
            (p, q) => p.or(q),
        }
    }
}

/// Data for logging time against an issue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewWorkItem {
    /// Time spent, in minutes
    pub minutes: u32,

    /// Note
    pub text: Option<String>,

    /// Day the work was done; the server uses today when absent
    pub date: Option<NaiveDate>,

    /// Work type name
    pub work_type: Option<String>,
}

/// Validate an issue summary.
///
/// Summary must be non-empty, single-line, free of control characters and
/// at most [`MAX_SUMMARY_LENGTH`] characters.
///
/// # Errors
///
/// Returns a human-readable reason on failure.
pub fn validate_summary(s: &str) -> std::result::Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Summary cannot be empty".to_string());
    }

    let len = s.chars().count();
    if len > MAX_SUMMARY_LENGTH {
        return Err(format!(
            "Summary cannot exceed {MAX_SUMMARY_LENGTH} characters, got {len} characters"
        ));
    }

    if s.contains('\n') || s.contains('\r') {
        return Err("Summary cannot contain newline characters".to_string());
    }

    if let Some(pos) = s.chars().position(|c| {
        let code = c as u32;
        (code < 0x20 && code != 0x09) || (0x7F..=0x9F).contains(&code)
    }) {
        return Err(format!(
            "Summary contains invalid control character at position {pos}"
        ));
    }

    Ok(s.to_string())
}

/// Validate an issue id.
///
/// Accepts readable ids (`PRJ-123`, `MY_PROJ-7`) and database ids (`2-17`):
/// an alphanumeric/underscore prefix, a hyphen, then digits.
///
/// # Errors
///
/// Returns a human-readable reason on failure.
pub fn validate_issue_id(s: &str) -> std::result::Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Issue ID cannot be empty".to_string());
    }

    let Some((prefix, number)) = s.rsplit_once('-') else {
        return Err(format!(
            "Invalid issue ID format: '{s}'. Expected PROJECT-NUMBER (e.g., DEMO-42)"
        ));
    };

    if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!(
            "Invalid issue ID prefix in '{s}': use letters, digits and underscores"
        ));
    }

    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("Invalid issue ID number in '{s}': expected digits"));
    }

    Ok(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_field_changes_command_order_and_quoting() {
        let changes = FieldChanges {
            state: Some("In Progress".to_string()),
            priority: Some("Major".to_string()),
            assignee: Some("jdoe".to_string()),
            issue_type: Some("Bug".to_string()),
        };
        assert_eq!(
            changes.to_command().as_deref(),
            Some("State {In Progress} Priority Major Assignee jdoe Type Bug")
        );
    }

    #[test]
    fn test_field_changes_skips_blank_values() {
        let changes = FieldChanges {
            state: Some("  ".to_string()),
            assignee: Some("me".to_string()),
            ..Default::default()
        };
        assert_eq!(changes.to_command().as_deref(), Some("Assignee me"));
        assert_eq!(FieldChanges::default().to_command(), None);
    }

    #[test]
    fn test_issue_update_requires_a_field() {
        let err = IssueUpdate::default().validate().unwrap_err();
        assert!(err.to_string().contains("no fields to update"));
    }

    #[test]
    fn test_issue_update_classifies_changes() {
        let update = IssueUpdate {
            description: Some("new".to_string()),
            ..Default::default()
        };
        assert!(update.has_text_changes());
        assert!(update.to_command().is_none());
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_new_issue_requires_project() {
        let issue = NewIssue {
            summary: "Something".to_string(),
            ..Default::default()
        };
        let err = issue.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidInput { field: "project", .. }));
    }

    #[rstest]
    #[case::nothing(None, None, None)]
    #[case::query_only(None, Some("#Unresolved"), Some("#Unresolved"))]
    #[case::project_only(Some("DEMO"), None, Some("project: DEMO"))]
    #[case::both(Some("DEMO"), Some("for: me"), Some("project: DEMO for: me"))]
    #[case::project_with_space(Some("My App"), None, Some("project: {My App}"))]
    #[case::blank_query(Some("DEMO"), Some("  "), Some("project: DEMO"))]
    fn test_effective_query(
        #[case] project: Option<&str>,
        #[case] query: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        let filter = IssueFilter {
            project: project.map(str::to_string),
            query: query.map(str::to_string),
            ..Default::default()
        };
        assert_eq!(filter.effective_query().as_deref(), expected);
    }

    #[rstest]
    #[case::valid("Fix the login page", true)]
    #[case::trimmed("  padded  ", true)]
    #[case::empty("", false)]
    #[case::whitespace("   ", false)]
    #[case::newline("line one\nline two", false)]
    #[case::control("bell\u{7}", false)]
    #[case::tab_ok("tab\there", true)]
    fn test_validate_summary(#[case] input: &str, #[case] ok: bool) {
        assert_eq!(validate_summary(input).is_ok(), ok);
    }

    #[test]
    fn test_validate_summary_length_counts_chars() {
        let at_limit = "é".repeat(MAX_SUMMARY_LENGTH);
        assert!(validate_summary(&at_limit).is_ok());
        let over = "a".repeat(MAX_SUMMARY_LENGTH + 1);
        assert!(validate_summary(&over).unwrap_err().contains("cannot exceed"));
    }

    #[rstest]
    #[case::readable("DEMO-42", true)]
    #[case::underscore("MY_PROJ-7", true)]
    #[case::database("2-17", true)]
    #[case::lowercase("demo-1", true)]
    #[case::no_hyphen("DEMO42", false)]
    #[case::no_number("DEMO-", false)]
    #[case::no_prefix("-42", false)]
    #[case::letters_after("DEMO-abc", false)]
    #[case::bad_prefix("DE MO-1", false)]
    #[case::empty("", false)]
    fn test_validate_issue_id(#[case] input: &str, #[case] ok: bool) {
        assert_eq!(validate_issue_id(input).is_ok(), ok, "input: {input:?}");
    }
}
