//! Output formatting for CLI commands.
//!
//! Every printer has two renditions: human-readable text written to any
//! [`Write`], and pretty JSON of the underlying resource for scripting.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers (semantic colors, icons)

pub mod color;

use crate::config::{mask_token, Layered, Sourced};
use crate::domain::{
    timestamp, Attachment, Comment, Issue, IssueLink, Project, Tag, User, WorkItem,
};
use crate::duration::format_minutes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::env;
use std::io::{self, Write};

pub use color::success;

use color::{
    bold, colorize_id, colorize_priority, colorize_state, colorize_tags, dimmed, error, info,
    resolution_icon, warning,
};

// ============================================================================
// Output Configuration
// ============================================================================

const DEFAULT_TERMINAL_WIDTH: u16 = 80;
const DEFAULT_MAX_CONTENT_WIDTH: usize = 100;

/// Custom fields already shown in the issue header.
const HEADER_FIELDS: [&str; 4] = ["State", "Priority", "Type", "Assignee"];

/// Configuration for output formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Maximum content width for text wrapping.
    pub max_width: usize,
    /// Whether to use ASCII-only icons instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new `OutputConfig` with explicit values.
    pub fn new(max_width: usize, use_ascii: bool, use_colors: bool) -> Self {
        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }

    /// Create an `OutputConfig` by reading from environment variables.
    ///
    /// Reads:
    /// - `YOUTRACK_MAX_WIDTH`: Maximum content width (default: 100)
    /// - `YOUTRACK_ASCII`: Set to "1" or "true" for ASCII-only icons
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `YOUTRACK_COLOR`: Set to "0" or "false" to disable colors
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_width = match lookup("YOUTRACK_MAX_WIDTH") {
            Some(s) if !s.is_empty() => match s.parse() {
                Ok(width) if width > 0 => width,
                _ => {
                    tracing::warn!(
                        env_var = "YOUTRACK_MAX_WIDTH",
                        value = %s,
                        default = DEFAULT_MAX_CONTENT_WIDTH,
                        "Invalid value, using default"
                    );
                    DEFAULT_MAX_CONTENT_WIDTH
                }
            },
            _ => DEFAULT_MAX_CONTENT_WIDTH,
        };

        let use_ascii = match lookup("YOUTRACK_ASCII") {
            Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Some(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
            Some(v) => {
                tracing::warn!(
                    env_var = "YOUTRACK_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            None => false,
        };

        // https://no-color.org/
        let use_colors = lookup("NO_COLOR").is_none()
            && lookup("YOUTRACK_COLOR")
                .is_none_or(|v| v != "0" && !v.eq_ignore_ascii_case("false"));

        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }

    fn content_width(&self) -> usize {
        get_terminal_width().min(self.max_width)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_CONTENT_WIDTH,
            use_ascii: false,
            use_colors: true,
        }
    }
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

/// Get the current terminal width, falling back to default if detection fails.
fn get_terminal_width() -> usize {
    terminal_size::terminal_size()
        .map_or(usize::from(DEFAULT_TERMINAL_WIDTH), |(w, _)| usize::from(w.0))
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

fn emit<T, F>(value: &T, mode: OutputMode, text: F) -> io::Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(&mut io::StdoutLock<'static>, &OutputConfig) -> io::Result<()>,
{
    let mut handle = io::stdout().lock();
    match mode {
        OutputMode::Text => text(&mut handle, &OutputConfig::from_env()),
        OutputMode::Json => write_json(&mut handle, value),
    }
}

/// Print a list of issues
pub fn print_issues(issues: &[Issue], mode: OutputMode) -> io::Result<()> {
    emit(issues, mode, |w, config| print_issues_text(w, issues, config))
}

/// Print an issue with all details (for show, create and update)
pub fn print_issue_details(issue: &Issue, mode: OutputMode) -> io::Result<()> {
    emit(issue, mode, |w, config| {
        print_issue_details_text(w, issue, config)
    })
}

/// Print comments
pub fn print_comments(comments: &[Comment], mode: OutputMode) -> io::Result<()> {
    emit(comments, mode, |w, config| {
        print_comments_text(w, comments, config)
    })
}

/// Print link groups
pub fn print_links(links: &[IssueLink], mode: OutputMode) -> io::Result<()> {
    emit(links, mode, |w, config| print_links_text(w, links, config))
}

/// Print work items with a total
pub fn print_work_items(items: &[WorkItem], mode: OutputMode) -> io::Result<()> {
    emit(items, mode, |w, config| print_work_items_text(w, items, config))
}

/// Print attachments
pub fn print_attachments(attachments: &[Attachment], mode: OutputMode) -> io::Result<()> {
    emit(attachments, mode, |w, config| {
        print_attachments_text(w, attachments, config)
    })
}

/// Print a list of projects
pub fn print_projects(projects: &[Project], mode: OutputMode) -> io::Result<()> {
    emit(projects, mode, |w, config| {
        print_projects_text(w, projects, config)
    })
}

/// Print one project
pub fn print_project_details(project: &Project, mode: OutputMode) -> io::Result<()> {
    emit(project, mode, |w, config| {
        print_project_details_text(w, project, config)
    })
}

/// Print a list of users
pub fn print_users(users: &[User], mode: OutputMode) -> io::Result<()> {
    emit(users, mode, |w, config| print_users_text(w, users, config))
}

/// Print one user
pub fn print_user_details(user: &User, mode: OutputMode) -> io::Result<()> {
    emit(user, mode, |w, config| print_user_details_text(w, user, config))
}

/// Print tags
pub fn print_tags(tags: &[Tag], mode: OutputMode) -> io::Result<()> {
    emit(tags, mode, |w, config| print_tags_text(w, tags, config))
}

/// Print effective configuration with the layer each value came from.
///
/// The token is always masked, in both modes.
pub fn print_config(layered: &Layered, mode: OutputMode) -> io::Result<()> {
    let value = config_json(layered);
    emit(&value, mode, |w, config| {
        print_config_text(w, layered, config)
    })
}

/// Print a simple message
pub fn print_message(msg: &str) -> io::Result<()> {
    let mut handle = io::stdout().lock();
    writeln!(handle, "{msg}")
}

/// Print a JSON-formatted result for any serializable value
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let mut handle = io::stdout().lock();
    write_json(&mut handle, value)
}

fn write_json<W: Write, T: Serialize + ?Sized>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(w, "{json}")
}

// ============================================================================
// Text Formatting
// ============================================================================

fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string())
}

#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let size = bytes as f64;
    if size < KB {
        format!("{bytes} B")
    } else if size < KB * KB {
        format!("{:.1} KB", size / KB)
    } else {
        format!("{:.1} MB", size / (KB * KB))
    }
}

/// Wrap text to fit within a given width, preserving existing line breaks.
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    text.lines()
        .flat_map(|line| {
            if line.trim().is_empty() {
                vec![String::new()]
            } else {
                textwrap::wrap(line, max_width.max(1))
                    .into_iter()
                    .map(std::borrow::Cow::into_owned)
                    .collect()
            }
        })
        .collect()
}

/// Print a text section with a bold title and wrapped, indented content.
fn print_text_section<W: Write>(
    w: &mut W,
    title: &str,
    content: &str,
    width: usize,
    config: &OutputConfig,
) -> io::Result<()> {
    if content.trim().is_empty() {
        return Ok(());
    }
    writeln!(w)?;
    writeln!(w, "{}:", bold(title, config))?;
    for line in wrap_text(content, width.saturating_sub(2)) {
        writeln!(w, "  {line}")?;
    }
    Ok(())
}

fn print_issues_text<W: Write>(
    w: &mut W,
    issues: &[Issue],
    config: &OutputConfig,
) -> io::Result<()> {
    if issues.is_empty() {
        writeln!(w, "No issues found.")?;
        return Ok(());
    }

    writeln!(w, "Found {} issue(s):", issues.len())?;
    writeln!(w)?;

    let id_width = issues
        .iter()
        .map(|i| i.display_id().chars().count())
        .max()
        .unwrap_or(0);
    let state_width = issues
        .iter()
        .map(|i| i.state().map_or(1, |s| s.chars().count()))
        .max()
        .unwrap_or(1);

    for issue in issues {
        let id = format!("{:<id_width$}", issue.display_id());
        let state = format!("{:<state_width$}", issue.state().unwrap_or_else(|| "-".into()));
        let priority = issue.priority().unwrap_or_else(|| "-".into());
        write!(
            w,
            "{} {}  {}  {}  {}",
            resolution_icon(issue.is_resolved(), config),
            colorize_id(&id, config),
            colorize_state(&state, issue.is_resolved(), config),
            colorize_priority(&priority, config),
            issue.summary
        )?;
        let tags = issue.tag_names();
        if tags.is_empty() {
            writeln!(w)?;
        } else {
            writeln!(w, "  [{}]", colorize_tags(&tags, config))?;
        }
    }

    Ok(())
}

fn print_issue_details_text<W: Write>(
    w: &mut W,
    issue: &Issue,
    config: &OutputConfig,
) -> io::Result<()> {
    let content_width = config.content_width();
    let dash = || "-".to_string();

    writeln!(
        w,
        "{} {}: {}",
        resolution_icon(issue.is_resolved(), config),
        colorize_id(issue.display_id(), config),
        issue.summary
    )?;

    if let Some(project) = &issue.project {
        writeln!(
            w,
            "{} {} ({})",
            dimmed("Project:", config),
            project.name,
            colorize_id(&project.short_name, config)
        )?;
    }

    writeln!(
        w,
        "{} {}    {} {}    {} {}",
        dimmed("State:", config),
        colorize_state(&issue.state().unwrap_or_else(dash), issue.is_resolved(), config),
        dimmed("Priority:", config),
        colorize_priority(&issue.priority().unwrap_or_else(dash), config),
        dimmed("Type:", config),
        issue.issue_type().unwrap_or_else(dash)
    )?;

    writeln!(
        w,
        "{} {}",
        dimmed("Assignee:", config),
        issue.assignee().unwrap_or_else(|| "Unassigned".to_string())
    )?;

    if let Some(reporter) = &issue.reporter {
        writeln!(w, "{} {}", dimmed("Reporter:", config), reporter.display_name())?;
    }

    let tags = issue.tag_names();
    if !tags.is_empty() {
        writeln!(w, "{} {}", dimmed("Tags:", config), colorize_tags(&tags, config))?;
    }

    writeln!(
        w,
        "{} {}    {} {}",
        dimmed("Created:", config),
        format_time(issue.created_at()),
        dimmed("Updated:", config),
        format_time(issue.updated_at())
    )?;

    if let Some(resolved) = issue.resolved_at() {
        writeln!(w, "{} {}", dimmed("Resolved:", config), format_time(Some(resolved)))?;
    }

    let extra: Vec<(String, String)> = issue
        .custom_fields
        .iter()
        .filter(|f| !HEADER_FIELDS.iter().any(|h| h.eq_ignore_ascii_case(&f.name)))
        .filter_map(|f| f.display_value().map(|v| (f.name.clone(), v)))
        .collect();
    if !extra.is_empty() {
        writeln!(w)?;
        writeln!(w, "{}:", bold("Fields", config))?;
        for (name, value) in extra {
            writeln!(w, "  {} {value}", dimmed(&format!("{name}:"), config))?;
        }
    }

    if let Some(description) = &issue.description {
        print_text_section(w, "Description", description, content_width, config)?;
    }

    Ok(())
}

fn print_comments_text<W: Write>(
    w: &mut W,
    comments: &[Comment],
    config: &OutputConfig,
) -> io::Result<()> {
    if comments.is_empty() {
        writeln!(w, "No comments.")?;
        return Ok(());
    }

    let width = config.content_width();
    for (i, comment) in comments.iter().enumerate() {
        if i > 0 {
            writeln!(w)?;
        }
        let author = comment.author.as_ref().map_or("unknown", User::display_name);
        writeln!(
            w,
            "{} {}",
            bold(author, config),
            dimmed(&format_time(timestamp(comment.created)), config)
        )?;
        for line in wrap_text(comment.text.as_deref().unwrap_or_default(), width.saturating_sub(2)) {
            writeln!(w, "  {line}")?;
        }
    }
    Ok(())
}

fn print_links_text<W: Write>(
    w: &mut W,
    links: &[IssueLink],
    config: &OutputConfig,
) -> io::Result<()> {
    if links.is_empty() {
        writeln!(w, "No links.")?;
        return Ok(());
    }

    for link in links {
        writeln!(w, "{} ({}):", bold(link.label(), config), link.issues.len())?;
        for issue in &link.issues {
            writeln!(
                w,
                "  {} {} {}",
                resolution_icon(issue.is_resolved(), config),
                colorize_id(issue.display_id(), config),
                issue.summary
            )?;
        }
    }
    Ok(())
}

fn print_work_items_text<W: Write>(
    w: &mut W,
    items: &[WorkItem],
    config: &OutputConfig,
) -> io::Result<()> {
    if items.is_empty() {
        writeln!(w, "No work items.")?;
        return Ok(());
    }

    for item in items {
        let date = timestamp(item.date)
            .map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string());
        let duration = item
            .duration
            .presentation
            .clone()
            .unwrap_or_else(|| format_minutes(item.duration.minutes));
        let author = item.author.as_ref().map_or("unknown", User::display_name);
        write!(w, "{}  {duration:>8}  {author}", dimmed(&date, config))?;
        if let Some(kind) = &item.work_type {
            write!(w, "  [{}]", kind.name)?;
        }
        match item.text.as_deref().filter(|t| !t.is_empty()) {
            Some(text) => writeln!(w, "  {text}")?,
            None => writeln!(w)?,
        }
    }

    let total: u32 = items
        .iter()
        .map(|i| i.duration.minutes)
        .fold(0, u32::saturating_add);
    writeln!(w)?;
    writeln!(w, "{} {}", bold("Total:", config), format_minutes(total))?;
    Ok(())
}

fn print_attachments_text<W: Write>(
    w: &mut W,
    attachments: &[Attachment],
    config: &OutputConfig,
) -> io::Result<()> {
    if attachments.is_empty() {
        writeln!(w, "No attachments.")?;
        return Ok(());
    }

    for attachment in attachments {
        let author = attachment
            .author
            .as_ref()
            .map_or("unknown", User::display_name);
        writeln!(
            w,
            "{}  {}  {} {}",
            bold(&attachment.name, config),
            format_size(attachment.size),
            author,
            dimmed(&format_time(timestamp(attachment.created)), config)
        )?;
        if let Some(url) = &attachment.url {
            writeln!(w, "  {}", dimmed(url, config))?;
        }
    }
    Ok(())
}

fn print_projects_text<W: Write>(
    w: &mut W,
    projects: &[Project],
    config: &OutputConfig,
) -> io::Result<()> {
    if projects.is_empty() {
        writeln!(w, "No projects found.")?;
        return Ok(());
    }

    let width = projects
        .iter()
        .map(|p| p.short_name.chars().count())
        .max()
        .unwrap_or(0);
    for project in projects {
        let short = format!("{:<width$}", project.short_name);
        write!(w, "{}  {}", colorize_id(&short, config), project.name)?;
        if project.archived {
            write!(w, " {}", dimmed("(archived)", config))?;
        }
        writeln!(w)?;
    }
    Ok(())
}

fn print_project_details_text<W: Write>(
    w: &mut W,
    project: &Project,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{}: {}",
        colorize_id(&project.short_name, config),
        project.name
    )?;
    writeln!(w, "{} {}", dimmed("ID:", config), project.id)?;
    if let Some(leader) = &project.leader {
        writeln!(w, "{} {}", dimmed("Leader:", config), leader.display_name())?;
    }
    if project.archived {
        writeln!(w, "{}", warning("Archived", config))?;
    }
    if let Some(description) = &project.description {
        print_text_section(w, "Description", description, config.content_width(), config)?;
    }
    Ok(())
}

fn print_users_text<W: Write>(w: &mut W, users: &[User], config: &OutputConfig) -> io::Result<()> {
    if users.is_empty() {
        writeln!(w, "No users found.")?;
        return Ok(());
    }

    let width = users
        .iter()
        .map(|u| u.login.chars().count())
        .max()
        .unwrap_or(0);
    for user in users {
        let login = format!("{:<width$}", user.login);
        write!(w, "{}  {}", info(&login, config), user.display_name())?;
        if let Some(email) = &user.email {
            write!(w, " {}", dimmed(&format!("<{email}>"), config))?;
        }
        if user.banned {
            write!(w, " {}", error("(banned)", config))?;
        }
        writeln!(w)?;
    }
    Ok(())
}

fn print_user_details_text<W: Write>(
    w: &mut W,
    user: &User,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(w, "{} ({})", bold(user.display_name(), config), user.login)?;
    writeln!(w, "{} {}", dimmed("ID:", config), user.id)?;
    if let Some(email) = &user.email {
        writeln!(w, "{} {email}", dimmed("Email:", config))?;
    }
    if user.banned {
        writeln!(w, "{}", error("Banned", config))?;
    }
    Ok(())
}

fn print_tags_text<W: Write>(w: &mut W, tags: &[Tag], config: &OutputConfig) -> io::Result<()> {
    if tags.is_empty() {
        writeln!(w, "No tags.")?;
        return Ok(());
    }
    for tag in tags {
        writeln!(w, "{}", colorize_tags(std::slice::from_ref(&tag.name), config))?;
    }
    Ok(())
}

fn config_json(layered: &Layered) -> serde_json::Value {
    fn entry(value: Option<&Sourced<String>>, mask: bool) -> serde_json::Value {
        match value {
            Some(s) => json!({
                "value": if mask { mask_token(&s.value) } else { s.value.clone() },
                "source": s.source.to_string(),
            }),
            None => serde_json::Value::Null,
        }
    }

    json!({
        "config_path": layered.config_path.display().to_string(),
        "config_found": layered.config_found,
        "url": entry(layered.url.as_ref(), false),
        "token": entry(layered.token.as_ref(), true),
        "project": entry(layered.project.as_ref(), false),
        "timeout_secs": {
            "value": layered.timeout_secs.value,
            "source": layered.timeout_secs.source.to_string(),
        },
    })
}

fn print_config_text<W: Write>(
    w: &mut W,
    layered: &Layered,
    config: &OutputConfig,
) -> io::Result<()> {
    let line = |w: &mut W, label: &str, value: Option<&Sourced<String>>, mask: bool| {
        let label = format!("{label:<9}");
        match value {
            Some(s) => {
                let shown = if mask { mask_token(&s.value) } else { s.value.clone() };
                writeln!(w, "{} {shown} {}", dimmed(&label, config), dimmed(&format!("({})", s.source), config))
            }
            None => writeln!(w, "{} {}", dimmed(&label, config), warning("(not set)", config)),
        }
    };

    let found = if layered.config_found {
        String::new()
    } else {
        format!(" {}", dimmed("(not found)", config))
    };
    writeln!(
        w,
        "{} {}{found}",
        dimmed(&format!("{:<9}", "Config:"), config),
        layered.config_path.display()
    )?;
    line(w, "URL:", layered.url.as_ref(), false)?;
    line(w, "Token:", layered.token.as_ref(), true)?;
    line(w, "Project:", layered.project.as_ref(), false)?;
    writeln!(
        w,
        "{} {}s {}",
        dimmed(&format!("{:<9}", "Timeout:"), config),
        layered.timeout_secs.value,
        dimmed(&format!("({})", layered.timeout_secs.source), config)
    )
}
