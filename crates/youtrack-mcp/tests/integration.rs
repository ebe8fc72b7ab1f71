//! Integration tests for youtrack-mcp tools.
//!
//! These tests exercise the MCP tools against the in-memory tracker to
//! verify end-to-end behavior including:
//! - Complete issue lifecycle (create -> update -> command -> delete)
//! - Default project handling
//! - Argument validation and error responses
//! - Sub-resources (tags, links, comments, work items, attachments)

use rmcp::ErrorData as McpError;
use rmcp::model::ErrorCode;
use rstest::rstest;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use youtrack::client::MockTracker;
use youtrack_mcp::error::Error;
use youtrack_mcp::models::{CreateIssueParams, ListIssuesParams, McpIssue, UpdateIssueParams};
use youtrack_mcp::tools::Tools;

mod helpers {
    use super::*;

    pub const BASE_URL: &str = "https://yt.example.com";

    /// Tools over a fresh mock with `DEMO` as the default project.
    pub fn create_tools() -> (Tools, Arc<MockTracker>) {
        create_tools_with(MockTracker::new(), Some("DEMO"))
    }

    /// Tools over the given mock and default project.
    pub fn create_tools_with(
        mock: MockTracker,
        default_project: Option<&str>,
    ) -> (Tools, Arc<MockTracker>) {
        let mock = Arc::new(mock);
        let tools = Tools::new(
            mock.clone(),
            BASE_URL,
            default_project.map(str::to_string),
        );
        (tools, mock)
    }

    /// Create an issue in the default project and return it.
    pub async fn create_issue(tools: &Tools, summary: &str) -> McpIssue {
        tools
            .create_issue(CreateIssueParams {
                summary: summary.to_string(),
                description: Some(format!("Description for {summary}")),
                ..Default::default()
            })
            .await
            .expect("create should succeed")
    }
}

use helpers::{create_issue, create_tools, create_tools_with};

// ============================================================================
// Issue Lifecycle
// ============================================================================

#[tokio::test]
async fn test_issue_lifecycle() {
    let (tools, mock) = create_tools();

    let created = tools
        .create_issue(CreateIssueParams {
            summary: "Login fails".to_string(),
            issue_type: Some("Bug".to_string()),
            priority: Some("Critical".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(created.id_readable, "DEMO-1");
    assert_eq!(created.project.as_deref(), Some("DEMO"));
    assert_eq!(created.issue_type.as_deref(), Some("Bug"));
    assert_eq!(created.custom_fields["Priority"], "Critical");
    assert!(created.created_at.is_some());

    let updated = tools
        .update_issue(UpdateIssueParams {
            issue_id: "DEMO-1".to_string(),
            state: Some("In Progress".to_string()),
            assignee: Some("admin".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(updated.state.as_deref(), Some("In Progress"));
    assert_eq!(updated.assignee.as_deref(), Some("admin"));

    let fetched = tools
        .apply_command("DEMO-1", "State Fixed", Some("Done"))
        .await
        .unwrap();
    assert_eq!(fetched.id_readable, "DEMO-1");
    let commands = mock.commands();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].command, "State Fixed");
    assert_eq!(commands[0].comment.as_deref(), Some("Done"));

    let deleted = tools.delete_issue("DEMO-1").await.unwrap();
    assert_eq!(deleted.issue_id, "DEMO-1");

    let err = tools.get_issue("DEMO-1").await.unwrap_err();
    assert!(matches!(
        err,
        Error::Tracker(youtrack::error::Error::NotFound(_))
    ));
}

#[tokio::test]
async fn test_list_issues_filters() {
    let (tools, _mock) =
        create_tools_with(MockTracker::new().with_project("OPS", "Operations"), Some("DEMO"));
    create_issue(&tools, "Crash on start").await;
    create_issue(&tools, "Typo in docs").await;
    tools
        .create_issue(CreateIssueParams {
            summary: "Crash in deploy".to_string(),
            project: Some("OPS".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    let all = tools.list_issues(ListIssuesParams::default()).await.unwrap();
    assert_eq!(all.len(), 3);

    let crashes = tools
        .list_issues(ListIssuesParams {
            query: Some("crash".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(crashes.len(), 2);

    let ops = tools
        .list_issues(ListIssuesParams {
            project: Some("OPS".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].project.as_deref(), Some("OPS"));

    let page = tools
        .list_issues(ListIssuesParams {
            limit: Some(1),
            skip: Some(1),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].summary, "Typo in docs");
}

// ============================================================================
// Default Project
// ============================================================================

#[tokio::test]
async fn test_create_without_any_project_fails() {
    let (tools, _mock) = create_tools_with(MockTracker::new(), None);
    let err = tools
        .create_issue(CreateIssueParams {
            summary: "Orphan".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoProject));
    assert_eq!(McpError::from(err).code, ErrorCode::INVALID_PARAMS);
}

#[tokio::test]
async fn test_explicit_project_beats_default() {
    let (tools, _mock) =
        create_tools_with(MockTracker::new().with_project("OPS", "Operations"), Some("DEMO"));
    let issue = tools
        .create_issue(CreateIssueParams {
            summary: "Rotate keys".to_string(),
            project: Some("OPS".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(issue.id_readable, "OPS-1");
}

#[tokio::test]
async fn test_unknown_project_returns_upstream_error() {
    let (tools, _mock) = create_tools_with(MockTracker::new(), Some("NOPE"));
    let err = tools
        .create_issue(CreateIssueParams {
            summary: "Lost".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    let mcp = McpError::from(err);
    assert_eq!(mcp.code, ErrorCode::INTERNAL_ERROR);
    assert!(mcp.message.contains("NOPE"));
}

// ============================================================================
// Argument Validation
// ============================================================================

#[rstest]
#[case::no_number("DEMO")]
#[case::empty("")]
#[case::spaces("DEMO 1")]
#[tokio::test]
async fn test_malformed_issue_id_is_rejected(#[case] id: &str) {
    let (tools, _mock) = create_tools();
    let err = tools.get_issue(id).await.unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidArgument {
            field: "issue_id",
            ..
        }
    ));
}

#[tokio::test]
async fn test_update_without_fields_is_rejected() {
    let (tools, _mock) = create_tools();
    create_issue(&tools, "Unchanged").await;

    let err = tools
        .update_issue(UpdateIssueParams {
            issue_id: "DEMO-1".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("at least one"));
}

#[tokio::test]
async fn test_summary_validation_comes_from_client() {
    let (tools, _mock) = create_tools();
    let err = tools
        .create_issue(CreateIssueParams {
            summary: "x".repeat(300),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(err.is_invalid_params());
}

#[tokio::test]
async fn test_empty_command_is_rejected() {
    let (tools, mock) = create_tools();
    create_issue(&tools, "Target").await;
    let err = tools.apply_command("DEMO-1", "  ", None).await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { field: "command", .. }));
    assert!(mock.commands().is_empty());
}

// ============================================================================
// Sub-resources
// ============================================================================

#[tokio::test]
async fn test_tags() {
    let (tools, mock) = create_tools();
    create_issue(&tools, "Tagged").await;

    let issue = tools.add_tag("DEMO-1", "needs review").await.unwrap();
    assert_eq!(issue.tags, vec!["needs review"]);
    assert_eq!(mock.commands()[0].command, "tag {needs review}");

    let tags = tools.list_tags().await.unwrap();
    assert!(tags.iter().any(|t| t.name == "needs review"));

    let issue = tools.remove_tag("DEMO-1", "needs review").await.unwrap();
    assert!(issue.tags.is_empty());
}

#[tokio::test]
async fn test_comments() {
    let (tools, _mock) = create_tools();
    create_issue(&tools, "Discussed").await;

    let comment = tools.add_comment("DEMO-1", "First!").await.unwrap();
    assert_eq!(comment.text, "First!");
    assert_eq!(comment.author.as_deref(), Some("admin"));

    tools.add_comment("DEMO-1", "Second").await.unwrap();
    let comments = tools.list_comments("DEMO-1").await.unwrap();
    let texts: Vec<&str> = comments.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["First!", "Second"]);
}

#[rstest]
#[case::canonical("depends on", "depends on DEMO-2")]
#[case::hyphenated("subtask-of", "subtask of DEMO-2")]
#[case::alias("relates", "relates to DEMO-2")]
#[tokio::test]
async fn test_link_issues(#[case] link: &str, #[case] expected_command: &str) {
    let (tools, mock) = create_tools();
    create_issue(&tools, "Source").await;
    create_issue(&tools, "Target").await;

    let response = tools.link_issues("DEMO-1", link, "DEMO-2").await.unwrap();
    assert_eq!(response.issue_id, "DEMO-1");
    assert_eq!(mock.commands()[0].command, expected_command);

    let links = tools.list_links("DEMO-1").await.unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].issues[0].id_readable, "DEMO-2");
}

#[tokio::test]
async fn test_link_with_unknown_verb_lists_valid_ones() {
    let (tools, mock) = create_tools();
    create_issue(&tools, "Source").await;
    create_issue(&tools, "Target").await;

    let err = tools
        .link_issues("DEMO-1", "eats", "DEMO-2")
        .await
        .unwrap_err();
    assert!(err.is_invalid_params());
    assert!(err.to_string().contains("depends on"));
    assert!(mock.commands().is_empty());
}

#[tokio::test]
async fn test_work_items() {
    let (tools, _mock) = create_tools();
    create_issue(&tools, "Timed").await;

    let item = tools
        .add_work_item(
            "DEMO-1",
            "1h 30m",
            Some("Investigation".to_string()),
            Some("2024-03-15"),
            Some("Development".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(item.minutes, 90);
    assert_eq!(item.duration, "1h 30m");
    assert_eq!(item.date.as_deref(), Some("2024-03-15"));
    assert_eq!(item.work_type.as_deref(), Some("Development"));

    let items = tools.list_work_items("DEMO-1").await.unwrap();
    assert_eq!(items.len(), 1);
}

#[rstest]
#[case::bad_duration("soon", None)]
#[case::zero_duration("0m", None)]
#[case::bad_date("1h", Some("15/03/2024"))]
#[tokio::test]
async fn test_work_item_validation(#[case] duration: &str, #[case] date: Option<&str>) {
    let (tools, _mock) = create_tools();
    create_issue(&tools, "Timed").await;

    let err = tools
        .add_work_item("DEMO-1", duration, None, date, None)
        .await
        .unwrap_err();
    assert!(err.is_invalid_params(), "unexpected error: {err}");
    assert!(tools.list_work_items("DEMO-1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_attachments() {
    let (tools, _mock) = create_tools();
    create_issue(&tools, "With file").await;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"0123456789").unwrap();
    let path = file.path().to_str().unwrap();

    let uploaded = tools.upload_attachment("DEMO-1", path).await.unwrap();
    assert_eq!(uploaded.len(), 1);
    assert_eq!(uploaded[0].size, 10);

    let listed = tools.list_attachments("DEMO-1").await.unwrap();
    assert_eq!(listed[0].name, uploaded[0].name);

    let err = tools
        .upload_attachment("DEMO-1", "/definitely/not/here.log")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { field: "path", .. }));
}

// ============================================================================
// Directory
// ============================================================================

#[tokio::test]
async fn test_projects() {
    let (tools, _mock) =
        create_tools_with(MockTracker::new().with_project("OPS", "Operations"), Some("DEMO"));

    let projects = tools.list_projects(None).await.unwrap();
    assert_eq!(projects.len(), 2);
    assert_eq!(tools.list_projects(Some(1)).await.unwrap().len(), 1);

    let ops = tools.get_project("operations").await.unwrap();
    assert_eq!(ops.short_name, "OPS");
    assert!(tools.get_project("NOPE").await.is_err());
}

#[tokio::test]
async fn test_users() {
    let (tools, _mock) =
        create_tools_with(MockTracker::new().with_user("jdoe", "Jane Doe"), Some("DEMO"));

    assert_eq!(tools.list_users(None, None).await.unwrap().len(), 2);
    let found = tools.list_users(Some("jane"), None).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].login, "jdoe");

    assert_eq!(tools.get_user("jdoe").await.unwrap().full_name.as_deref(), Some("Jane Doe"));
    assert_eq!(tools.current_user().await.unwrap().login, "admin");
}

#[tokio::test]
async fn test_connection_info() {
    let (tools, _mock) = create_tools();
    let info = tools.connection_info().await.unwrap();
    assert_eq!(info.base_url, helpers::BASE_URL);
    assert_eq!(info.default_project.as_deref(), Some("DEMO"));
    assert_eq!(info.user.login, "admin");
}
