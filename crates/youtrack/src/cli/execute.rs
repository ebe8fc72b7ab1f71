//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands. Every
//! function takes the [`App`] so that tests can run them against a mock
//! tracker.

use anyhow::{Context, Result};
use std::slice;

use super::args::{
    AttachmentAction, AttachmentArgs, CommandArgs, CommentAction, CommentArgs, ConfigAction,
    ConfigArgs, CreateArgs, DeleteArgs, LinkAction, LinkArgs, ListArgs, ProjectAction,
    ProjectArgs, ShowArgs, TagAction, TagArgs, UpdateArgs, UserAction, UserArgs, WorklogAction,
    WorklogArgs,
};
use crate::app::App;
use crate::config::{config_file_path, normalize_base_url, ConfigFile, Layered, Overrides};
use crate::domain::{IssueFilter, IssueId, IssueUpdate, NewIssue, NewWorkItem};
use crate::output::{self, OutputConfig, OutputMode};

/// Print a confirmation in text mode, or the resource itself in JSON mode.
fn confirm<T: serde::Serialize + ?Sized>(message: &str, value: &T, mode: OutputMode) -> Result<()> {
    match mode {
        OutputMode::Json => output::print_json(value)?,
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            output::print_message(&output::success(message, &config))?;
        }
    }
    Ok(())
}

/// Execute the list command
pub async fn execute_list(
    app: &App,
    args: &ListArgs,
    project: Option<&str>,
    output_mode: OutputMode,
) -> Result<()> {
    let filter = IssueFilter {
        query: args.query.clone(),
        project: project.map(str::to_string),
        limit: args.limit,
        skip: args.skip,
    };

    let issues = app.tracker().list_issues(&filter).await?;
    tracing::debug!(count = issues.len(), "Listed issues");
    output::print_issues(&issues, output_mode)?;
    Ok(())
}

/// Execute the show command
pub async fn execute_show(app: &App, args: &ShowArgs, output_mode: OutputMode) -> Result<()> {
    let issue = app.tracker().get_issue(&IssueId::new(&args.issue_id)).await?;
    output::print_issue_details(&issue, output_mode)?;
    Ok(())
}

/// Execute the create command
pub async fn execute_create(
    app: &App,
    args: &CreateArgs,
    project: Option<&str>,
    output_mode: OutputMode,
) -> Result<()> {
    let new_issue = NewIssue {
        project: app.project_or_default(project)?,
        summary: args.summary.clone(),
        description: args.description.clone(),
        fields: (&args.fields).into(),
    };

    let issue = app.tracker().create_issue(new_issue).await?;
    tracing::info!(issue = issue.display_id(), "Created issue");

    if output_mode == OutputMode::Text {
        let config = OutputConfig::from_env();
        output::print_message(&output::success(
            &format!("Created issue {}", issue.display_id()),
            &config,
        ))?;
    }
    output::print_issue_details(&issue, output_mode)?;
    Ok(())
}

/// Execute the update command
pub async fn execute_update(app: &App, args: &UpdateArgs, output_mode: OutputMode) -> Result<()> {
    let update = IssueUpdate {
        summary: args.summary.clone(),
        description: args.description.clone(),
        fields: (&args.fields).into(),
    };
    if update.is_empty() {
        anyhow::bail!(
            "No fields to update. Use --summary, --description, --state, --priority, --assignee or --type"
        );
    }

    let id = IssueId::new(&args.issue_id);
    let issue = app.tracker().update_issue(&id, update).await?;
    tracing::info!(issue = issue.display_id(), "Updated issue");
    output::print_issue_details(&issue, output_mode)?;
    Ok(())
}

/// Execute the delete command
pub async fn execute_delete(app: &App, args: &DeleteArgs, output_mode: OutputMode) -> Result<()> {
    if !args.force {
        anyhow::bail!(
            "Refusing to delete {} without --force (deletion cannot be undone)",
            args.issue_id
        );
    }

    let id = IssueId::new(&args.issue_id);
    app.tracker().delete_issue(&id).await?;
    tracing::info!(issue = %id, "Deleted issue");
    confirm(
        &format!("Deleted issue {id}"),
        &serde_json::json!({ "deleted": id.as_str() }),
        output_mode,
    )
}

/// Execute the command command
pub async fn execute_command(app: &App, args: &CommandArgs, output_mode: OutputMode) -> Result<()> {
    let id = IssueId::new(&args.issue_id);
    app.tracker()
        .apply_command(&id, &args.command, args.comment.as_deref())
        .await?;
    let issue = app.tracker().get_issue(&id).await?;
    confirm(
        &format!("Applied '{}' to {}", args.command, issue.display_id()),
        &issue,
        output_mode,
    )
}

/// Execute the tag command
pub async fn execute_tag(app: &App, args: &TagArgs, output_mode: OutputMode) -> Result<()> {
    match &args.action {
        TagAction::Add { issue_id, tag } => {
            let issue = app.tracker().add_tag(&IssueId::new(issue_id), tag).await?;
            confirm(
                &format!("Tagged {} with '{tag}'", issue.display_id()),
                &issue.tags,
                output_mode,
            )
        }
        TagAction::Remove { issue_id, tag } => {
            let issue = app
                .tracker()
                .remove_tag(&IssueId::new(issue_id), tag)
                .await?;
            confirm(
                &format!("Removed tag '{tag}' from {}", issue.display_id()),
                &issue.tags,
                output_mode,
            )
        }
        TagAction::List => {
            let tags = app.tracker().list_tags().await?;
            output::print_tags(&tags, output_mode)?;
            Ok(())
        }
    }
}

/// Execute the comment command
pub async fn execute_comment(app: &App, args: &CommentArgs, output_mode: OutputMode) -> Result<()> {
    match &args.action {
        CommentAction::Add { issue_id, text } => {
            let comment = app
                .tracker()
                .add_comment(&IssueId::new(issue_id), text)
                .await?;
            output::print_comments(slice::from_ref(&comment), output_mode)?;
        }
        CommentAction::List { issue_id } => {
            let comments = app.tracker().list_comments(&IssueId::new(issue_id)).await?;
            output::print_comments(&comments, output_mode)?;
        }
    }
    Ok(())
}

/// Execute the link command
pub async fn execute_link(app: &App, args: &LinkArgs, output_mode: OutputMode) -> Result<()> {
    match &args.action {
        LinkAction::Add {
            issue_id,
            verb,
            target,
        } => {
            let verb = *verb;
            app.tracker()
                .link_issues(&IssueId::new(issue_id), verb, &IssueId::new(target))
                .await?;
            confirm(
                &format!("Linked {issue_id} {verb} {target}"),
                &serde_json::json!({
                    "source": issue_id,
                    "verb": verb.as_str(),
                    "target": target,
                }),
                output_mode,
            )
        }
        LinkAction::List { issue_id } => {
            let links = app.tracker().list_links(&IssueId::new(issue_id)).await?;
            output::print_links(&links, output_mode)?;
            Ok(())
        }
    }
}

/// Execute the worklog command
pub async fn execute_worklog(app: &App, args: &WorklogArgs, output_mode: OutputMode) -> Result<()> {
    match &args.action {
        WorklogAction::Add {
            issue_id,
            duration,
            text,
            date,
            work_type,
        } => {
            let item = NewWorkItem {
                minutes: *duration,
                text: text.clone(),
                date: *date,
                work_type: work_type.clone(),
            };
            let created = app
                .tracker()
                .add_work_item(&IssueId::new(issue_id), item)
                .await?;
            output::print_work_items(slice::from_ref(&created), output_mode)?;
        }
        WorklogAction::List { issue_id } => {
            let items = app.tracker().list_work_items(&IssueId::new(issue_id)).await?;
            output::print_work_items(&items, output_mode)?;
        }
    }
    Ok(())
}

/// Execute the attachment command
pub async fn execute_attachment(
    app: &App,
    args: &AttachmentArgs,
    output_mode: OutputMode,
) -> Result<()> {
    match &args.action {
        AttachmentAction::Add { issue_id, file } => {
            if !tokio::fs::try_exists(file).await.unwrap_or(false) {
                anyhow::bail!("File not found: {}", file.display());
            }
            let attachments = app
                .tracker()
                .upload_attachment(&IssueId::new(issue_id), file)
                .await?;
            output::print_attachments(&attachments, output_mode)?;
        }
        AttachmentAction::List { issue_id } => {
            let attachments = app
                .tracker()
                .list_attachments(&IssueId::new(issue_id))
                .await?;
            output::print_attachments(&attachments, output_mode)?;
        }
    }
    Ok(())
}

/// Execute the project command
pub async fn execute_project(app: &App, args: &ProjectArgs, output_mode: OutputMode) -> Result<()> {
    match &args.action {
        ProjectAction::List { limit } => {
            let projects = app.tracker().list_projects(*limit).await?;
            output::print_projects(&projects, output_mode)?;
        }
        ProjectAction::Show { project } => {
            let project = app.tracker().get_project(project).await?;
            output::print_project_details(&project, output_mode)?;
        }
    }
    Ok(())
}

/// Execute the user command
pub async fn execute_user(app: &App, args: &UserArgs, output_mode: OutputMode) -> Result<()> {
    let user = match &args.action {
        UserAction::List { query, limit } => {
            let users = app.tracker().list_users(query.as_deref(), *limit).await?;
            output::print_users(&users, output_mode)?;
            return Ok(());
        }
        UserAction::Show { user } => app.tracker().get_user(user).await?,
        UserAction::Me => app.tracker().current_user().await?,
    };
    output::print_user_details(&user, output_mode)?;
    Ok(())
}

/// Execute the config command
pub async fn execute_config(
    args: &ConfigArgs,
    overrides: &Overrides,
    output_mode: OutputMode,
) -> Result<()> {
    match &args.action {
        ConfigAction::Init { force } => {
            let path = config_file_path(overrides)?;
            let file = init_config_file(overrides, &path, *force).await?;
            tracing::info!(path = %path.display(), "Wrote config file");
            confirm(
                &format!("Wrote {}", path.display()),
                &serde_json::json!({
                    "path": path.display().to_string(),
                    "url": file.url,
                    "default_project": file.default_project,
                }),
                output_mode,
            )
        }
        ConfigAction::Show => {
            let layered = Layered::load(overrides).await?;
            output::print_config(&layered, output_mode)?;
            Ok(())
        }
        ConfigAction::Path => {
            let path = config_file_path(overrides)?;
            match output_mode {
                OutputMode::Json => output::print_json(&serde_json::json!({
                    "path": path.display().to_string(),
                }))?,
                OutputMode::Text => output::print_message(&path.display().to_string())?,
            }
            Ok(())
        }
    }
}

async fn init_config_file(
    overrides: &Overrides,
    path: &std::path::Path,
    force: bool,
) -> Result<ConfigFile> {
    let url = overrides
        .url
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .context("config init needs --url")?;
    let token = overrides
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .context("config init needs --token")?;

    if !force && tokio::fs::try_exists(path).await.unwrap_or(false) {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite",
            path.display()
        );
    }

    let file = ConfigFile {
        url: Some(normalize_base_url(url)?),
        token: Some(token.to_string()),
        default_project: overrides
            .project
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string),
        timeout_secs: None,
    };
    file.save(path).await?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::FieldArgs;
    use crate::client::MockTracker;
    use crate::config::Settings;
    use std::time::Duration;
    use tempfile::TempDir;

    fn app() -> App {
        let settings = Settings {
            base_url: "https://yt.example.com".to_string(),
            token: "perm:test".to_string(),
            default_project: Some("DEMO".to_string()),
            timeout: Duration::from_secs(5),
        };
        App::new(Box::new(MockTracker::new()), settings)
    }

    fn create_args(summary: &str) -> CreateArgs {
        CreateArgs {
            summary: summary.to_string(),
            description: None,
            fields: FieldArgs::default(),
        }
    }

    #[tokio::test]
    async fn test_create_uses_default_project() {
        let app = app();
        execute_create(&app, &create_args("First"), None, OutputMode::Json)
            .await
            .unwrap();

        let issue = app.tracker().get_issue(&IssueId::new("DEMO-1")).await.unwrap();
        assert_eq!(issue.summary, "First");
    }

    #[tokio::test]
    async fn test_update_without_fields_fails() {
        let app = app();
        let args = UpdateArgs {
            issue_id: "DEMO-1".to_string(),
            summary: None,
            description: None,
            fields: FieldArgs::default(),
        };
        let err = execute_update(&app, &args, OutputMode::Json).await.unwrap_err();
        assert!(err.to_string().contains("No fields to update"));
    }

    #[tokio::test]
    async fn test_delete_requires_force() {
        let app = app();
        execute_create(&app, &create_args("Doomed"), None, OutputMode::Json)
            .await
            .unwrap();

        let args = DeleteArgs {
            issue_id: "DEMO-1".to_string(),
            force: false,
        };
        let err = execute_delete(&app, &args, OutputMode::Json).await.unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert!(app.tracker().get_issue(&IssueId::new("DEMO-1")).await.is_ok());

        let args = DeleteArgs { force: true, ..args };
        execute_delete(&app, &args, OutputMode::Json).await.unwrap();
        assert!(app.tracker().get_issue(&IssueId::new("DEMO-1")).await.is_err());
    }

    #[tokio::test]
    async fn test_config_init_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("youtrack").join("config.yaml");
        let overrides = Overrides {
            url: Some("https://yt.example.com/api/".to_string()),
            token: Some("perm:abc".to_string()),
            project: Some("DEMO".to_string()),
            config: Some(path.clone()),
        };

        let file = init_config_file(&overrides, &path, false).await.unwrap();
        assert_eq!(file.url.as_deref(), Some("https://yt.example.com"));
        assert_eq!(file.default_project.as_deref(), Some("DEMO"));

        let err = init_config_file(&overrides, &path, false).await.unwrap_err();
        assert!(err.to_string().contains("--force"));
        init_config_file(&overrides, &path, true).await.unwrap();
    }

    #[tokio::test]
    async fn test_config_init_requires_token() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        let overrides = Overrides {
            url: Some("https://yt.example.com".to_string()),
            ..Default::default()
        };
        let err = init_config_file(&overrides, &path, false).await.unwrap_err();
        assert!(err.to_string().contains("--token"));
        assert!(!path.exists());
    }
}
