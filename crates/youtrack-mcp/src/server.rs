//! MCP server implementation.
//!
//! This module contains the main server setup using rmcp.

use crate::error::{self, Error};
use crate::models::{
    AddCommentParams, AddWorkItemParams, ApplyCommandParams, CreateIssueParams, GetProjectParams,
    GetUserParams, IssueParams, LinkIssuesParams, ListIssuesParams, ListProjectsParams,
    ListUsersParams, TagParams, UpdateIssueParams, UploadAttachmentParams,
};
use crate::tools::Tools;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::transport::stdio;
use rmcp::{
    ErrorData as McpError, ServiceExt, handler::server::ServerHandler, tool, tool_handler,
    tool_router,
};
use serde::Serialize;
use std::sync::Arc;
use youtrack::client::{IssueTracker, YouTrackClient};
use youtrack::config::{Overrides, Settings};

/// Wrap a tool outcome as JSON content, or as an MCP error carrying its message.
fn json_result<T: Serialize>(result: error::Result<T>) -> std::result::Result<CallToolResult, McpError> {
    match result {
        Ok(value) => Ok(CallToolResult::success(vec![Content::json(value)?])),
        Err(e) => {
            tracing::warn!(error = %e, "Tool call failed");
            Err(e.into())
        }
    }
}

/// The YouTrack MCP server.
///
/// Provides MCP protocol handling over stdio transport.
#[derive(Clone)]
pub struct YouTrackMcpServer {
    /// Tool implementations.
    tools: Arc<Tools>,
    /// Tool router for MCP dispatch.
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl YouTrackMcpServer {
    /// List issues.
    #[tool(
        description = "Search issues with YouTrack query syntax (e.g. '#Unresolved for: me'). Optional project filter, limit (default 50) and skip."
    )]
    async fn list_issues(
        &self,
        Parameters(params): Parameters<ListIssuesParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        json_result(self.tools.list_issues(params).await)
    }

    /// Get issue details.
    #[tool(
        description = "Get one issue with its summary, description, tags and all custom fields."
    )]
    async fn get_issue(
        &self,
        Parameters(params): Parameters<IssueParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        json_result(self.tools.get_issue(&params.issue_id).await)
    }

    /// Create an issue.
    #[tool(
        description = "Create an issue. Project defaults to the server's configured project. State, priority, assignee and type are applied right after creation."
    )]
    async fn create_issue(
        &self,
        Parameters(params): Parameters<CreateIssueParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        json_result(self.tools.create_issue(params).await)
    }

    /// Update an issue.
    #[tool(
        description = "Update an issue's summary, description, state, priority, assignee or type. Only provided fields change."
    )]
    async fn update_issue(
        &self,
        Parameters(params): Parameters<UpdateIssueParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        json_result(self.tools.update_issue(params).await)
    }

    /// Delete an issue.
    #[tool(description = "Delete an issue permanently. This cannot be undone.")]
    async fn delete_issue(
        &self,
        Parameters(params): Parameters<IssueParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        json_result(self.tools.delete_issue(&params.issue_id).await)
    }

    /// Apply a command.
    #[tool(
        description = "Apply a YouTrack command to an issue (e.g. 'State Fixed', 'for me', 'Priority Critical'), optionally with a comment."
    )]
    async fn apply_command(
        &self,
        Parameters(params): Parameters<ApplyCommandParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        json_result(
            self.tools
                .apply_command(&params.issue_id, &params.command, params.comment.as_deref())
                .await,
        )
    }

    /// Tag an issue.
    #[tool(description = "Add a tag to an issue.")]
    async fn add_tag(
        &self,
        Parameters(params): Parameters<TagParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        json_result(self.tools.add_tag(&params.issue_id, &params.tag).await)
    }

    /// Untag an issue.
    #[tool(description = "Remove a tag from an issue.")]
    async fn remove_tag(
        &self,
        Parameters(params): Parameters<TagParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        json_result(self.tools.remove_tag(&params.issue_id, &params.tag).await)
    }

    /// List tags.
    #[tool(description = "List the tags visible to the current user.")]
    async fn list_tags(&self) -> std::result::Result<CallToolResult, McpError> {
        json_result(self.tools.list_tags().await)
    }

    /// Comment on an issue.
    #[tool(description = "Add a Markdown comment to an issue.")]
    async fn add_comment(
        &self,
        Parameters(params): Parameters<AddCommentParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        json_result(self.tools.add_comment(&params.issue_id, &params.text).await)
    }

    /// List comments.
    #[tool(description = "List the comments of an issue, oldest first.")]
    async fn list_comments(
        &self,
        Parameters(params): Parameters<IssueParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        json_result(self.tools.list_comments(&params.issue_id).await)
    }

    /// List links.
    #[tool(description = "List the links of an issue (dependencies, duplicates, subtasks).")]
    async fn list_links(
        &self,
        Parameters(params): Parameters<IssueParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        json_result(self.tools.list_links(&params.issue_id).await)
    }

    /// Link two issues.
    #[tool(
        description = "Link two issues. Verbs: relates to, depends on, is required for, duplicates, is duplicated by, subtask of, parent for."
    )]
    async fn link_issues(
        &self,
        Parameters(params): Parameters<LinkIssuesParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        json_result(
            self.tools
                .link_issues(&params.issue_id, &params.link, &params.target)
                .await,
        )
    }

    /// List work items.
    #[tool(description = "List the time tracking work items of an issue.")]
    async fn list_work_items(
        &self,
        Parameters(params): Parameters<IssueParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        json_result(self.tools.list_work_items(&params.issue_id).await)
    }

    /// Log time.
    #[tool(
        description = "Log spent time on an issue. Duration like '1h 30m', '2d' or '45' (minutes); a day is 8h, a week 5d."
    )]
    async fn add_work_item(
        &self,
        Parameters(params): Parameters<AddWorkItemParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        json_result(
            self.tools
                .add_work_item(
                    &params.issue_id,
                    &params.duration,
                    params.text,
                    params.date.as_deref(),
                    params.work_type,
                )
                .await,
        )
    }

    /// List attachments.
    #[tool(description = "List the files attached to an issue.")]
    async fn list_attachments(
        &self,
        Parameters(params): Parameters<IssueParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        json_result(self.tools.list_attachments(&params.issue_id).await)
    }

    /// Upload an attachment.
    #[tool(description = "Attach a local file (path on the server's machine) to an issue.")]
    async fn upload_attachment(
        &self,
        Parameters(params): Parameters<UploadAttachmentParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        json_result(
            self.tools
                .upload_attachment(&params.issue_id, &params.path)
                .await,
        )
    }

    /// List projects.
    #[tool(description = "List projects, with their short names used in issue ids.")]
    async fn list_projects(
        &self,
        Parameters(params): Parameters<ListProjectsParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        json_result(self.tools.list_projects(params.limit).await)
    }

    /// Get a project.
    #[tool(description = "Get one project by short name, name or id.")]
    async fn get_project(
        &self,
        Parameters(params): Parameters<GetProjectParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        json_result(self.tools.get_project(&params.project).await)
    }

    /// List users.
    #[tool(description = "List users, optionally filtered by login, name or email.")]
    async fn list_users(
        &self,
        Parameters(params): Parameters<ListUsersParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        json_result(
            self.tools
                .list_users(params.query.as_deref(), params.limit)
                .await,
        )
    }

    /// Get a user.
    #[tool(description = "Get one user by login or id.")]
    async fn get_user(
        &self,
        Parameters(params): Parameters<GetUserParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        json_result(self.tools.get_user(&params.user).await)
    }

    /// Get the current user.
    #[tool(description = "Get the user the configured token belongs to.")]
    async fn current_user(&self) -> std::result::Result<CallToolResult, McpError> {
        json_result(self.tools.current_user().await)
    }

    /// Show connection details.
    #[tool(
        description = "Show the YouTrack URL, default project and account in use. Useful for debugging."
    )]
    async fn connection_info(&self) -> std::result::Result<CallToolResult, McpError> {
        json_result(self.tools.connection_info().await)
    }
}

impl YouTrackMcpServer {
    /// Create a server around an existing tracker.
    #[must_use]
    pub fn new(
        tracker: Arc<dyn IssueTracker>,
        base_url: impl Into<String>,
        default_project: Option<String>,
    ) -> Self {
        Self {
            tools: Arc::new(Tools::new(tracker, base_url, default_project)),
            tool_router: Self::tool_router(),
        }
    }

    /// Resolve settings the same way the CLI does and build the REST client.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL or token is missing or the client cannot
    /// be built.
    pub async fn connect(overrides: &Overrides) -> error::Result<Self> {
        let settings = Settings::load(overrides).await?;
        let client = YouTrackClient::new(&settings)?;
        tracing::info!(url = %settings.base_url, project = ?settings.default_project, "Using YouTrack");
        Ok(Self::new(
            Arc::new(client),
            settings.base_url,
            settings.default_project,
        ))
    }

    /// Get a reference to the tools.
    #[must_use]
    pub fn tools(&self) -> &Arc<Tools> {
        &self.tools
    }

    /// Serve MCP over stdin/stdout until the client disconnects.
    ///
    /// # Errors
    ///
    /// Returns `Error::Mcp` if the handshake or the session fails.
    pub async fn run(self) -> error::Result<()> {
        let service = self
            .serve(stdio())
            .await
            .map_err(|e| Error::Mcp(e.to_string()))?;
        let reason = service
            .waiting()
            .await
            .map_err(|e| Error::Mcp(e.to_string()))?;
        tracing::info!(?reason, "MCP session ended");
        Ok(())
    }
}

#[tool_handler]
impl ServerHandler for YouTrackMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "youtrack-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "YouTrack MCP server. Issues are addressed by readable id such as DEMO-42. \
                 Call connection_info to see which server and default project are in use."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::handler::server::ServerHandler;
    use youtrack::client::MockTracker;

    fn server() -> YouTrackMcpServer {
        YouTrackMcpServer::new(
            Arc::new(MockTracker::new()),
            "https://yt.example.com",
            Some("DEMO".to_string()),
        )
    }

    #[test]
    fn test_server_info() {
        let info = server().get_info();
        assert_eq!(info.server_info.name, "youtrack-mcp");
        assert!(!info.server_info.version.is_empty());
        assert!(info.instructions.is_some());
        assert!(info.capabilities.tools.is_some());
    }

    #[test]
    fn test_tool_router_has_all_tools() {
        let server = server();
        let tools = server.tool_router.list_all();
        let tool_names: Vec<&str> = tools.iter().map(|t| &*t.name).collect();

        for expected in [
            "list_issues",
            "get_issue",
            "create_issue",
            "update_issue",
            "delete_issue",
            "apply_command",
            "add_tag",
            "remove_tag",
            "list_tags",
            "add_comment",
            "list_comments",
            "list_links",
            "link_issues",
            "list_work_items",
            "add_work_item",
            "list_attachments",
            "upload_attachment",
            "list_projects",
            "get_project",
            "list_users",
            "get_user",
            "current_user",
            "connection_info",
        ] {
            assert!(tool_names.contains(&expected), "missing tool {expected}");
        }
        assert_eq!(tools.len(), 23);
    }

    #[test]
    fn test_tool_schemas_describe_parameters() {
        let server = server();
        let tools = server.tool_router.list_all();
        let create = tools
            .iter()
            .find(|t| t.name == "create_issue")
            .expect("create_issue registered");
        let schema = serde_json::to_string(&create.input_schema).unwrap();
        assert!(schema.contains("summary"));
        assert!(schema.contains("issue_type"));
    }

    #[tokio::test]
    async fn test_json_result_maps_errors() {
        let ok = json_result(server().tools().current_user().await).unwrap();
        assert_eq!(ok.is_error, Some(false));

        let err = json_result::<()>(Err(Error::NoProject)).unwrap_err();
        assert!(err.message.contains("default project"));
    }
}
