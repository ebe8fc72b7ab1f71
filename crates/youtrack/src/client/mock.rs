//! In-memory [`IssueTracker`] for tests.

use super::IssueTracker;
use crate::command::LinkVerb;
use crate::domain::{
    Attachment, Comment, CustomField, FieldChanges, Issue, IssueFilter, IssueId, IssueLink,
    IssueUpdate, LinkDirection, LinkType, NewIssue, NewWorkItem, Project, Tag, User,
    WorkDuration, WorkItem,
};
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// A command recorded by [`MockTracker::apply_command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCommand {
    /// Target issue
    pub issue: String,
    /// Command text
    pub command: String,
    /// Optional comment
    pub comment: Option<String>,
}

#[derive(Debug, Default)]
struct State {
    issues: Vec<Issue>,
    projects: Vec<Project>,
    users: Vec<User>,
    tags: Vec<Tag>,
    comments: HashMap<String, Vec<Comment>>,
    links: HashMap<String, Vec<IssueLink>>,
    work_items: HashMap<String, Vec<WorkItem>>,
    attachments: HashMap<String, Vec<Attachment>>,
    commands: Vec<RecordedCommand>,
    next_id: u32,
}

impl State {
    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn issue_index(&self, id: &IssueId) -> Result<usize> {
        self.issues
            .iter()
            .position(|i| i.id_readable == id.as_str() || i.id == id.as_str())
            .ok_or_else(|| Error::NotFound(format!("issue {id}")))
    }

    fn project(&self, id: &str) -> Result<Project> {
        self.projects
            .iter()
            .find(|p| {
                p.id == id || p.short_name.eq_ignore_ascii_case(id) || p.name.eq_ignore_ascii_case(id)
            })
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("project {id}")))
    }

    fn me(&self) -> User {
        self.users.first().cloned().unwrap_or_default()
    }
}

/// Stateful in-memory tracker.
///
/// Seeded with project `DEMO` (`0-1`) and current user `admin`. Issues get
/// readable ids `DEMO-1`, `DEMO-2`, ... in creation order.
///
/// # Behavior
///
/// - `list_issues`: the query is matched as a case-insensitive substring of
///   the summary; the project filter compares short names
/// - `apply_command`: recorded, see [`MockTracker::commands`]; tags and
///   links are applied to the stored issue
/// - Custom field changes are stored as `{"name": value}` objects
#[derive(Debug)]
pub struct MockTracker {
    state: Mutex<State>,
}

impl Default for MockTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTracker {
    /// Create a tracker with one project and one user.
    pub fn new() -> Self {
        let state = State {
            projects: vec![Project {
                id: "0-1".to_string(),
                name: "Demo".to_string(),
                short_name: "DEMO".to_string(),
                description: Some("Demo project".to_string()),
                archived: false,
                leader: None,
            }],
            users: vec![User {
                id: "1-1".to_string(),
                login: "admin".to_string(),
                full_name: Some("Admin User".to_string()),
                email: Some("admin@example.com".to_string()),
                banned: false,
            }],
            ..Default::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    /// Add another project.
    #[must_use]
    pub fn with_project(self, short_name: &str, name: &str) -> Self {
        {
            let mut state = self.lock();
            let n = state.projects.len() + 1;
            state.projects.push(Project {
                id: format!("0-{n}"),
                name: name.to_string(),
                short_name: short_name.to_string(),
                ..Default::default()
            });
        }
        self
    }

    /// Add another user.
    #[must_use]
    pub fn with_user(self, login: &str, full_name: &str) -> Self {
        {
            let mut state = self.lock();
            let n = state.users.len() + 1;
            state.users.push(User {
                id: format!("1-{n}"),
                login: login.to_string(),
                full_name: Some(full_name.to_string()),
                ..Default::default()
            });
        }
        self
    }

    /// Commands applied so far, oldest first.
    pub fn commands(&self) -> Vec<RecordedCommand> {
        self.lock().commands.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A poisoned lock only means another test thread panicked.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

fn now() -> i64 {
    Utc::now().timestamp_millis()
}

fn apply_fields(issue: &mut Issue, fields: &FieldChanges) {
    let changes = [
        ("State", &fields.state, "name"),
        ("Priority", &fields.priority, "name"),
        ("Assignee", &fields.assignee, "login"),
        ("Type", &fields.issue_type, "name"),
    ];
    for (name, value, key) in changes {
        let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) else {
            continue;
        };
        let value = if key == "login" && value.eq_ignore_ascii_case("unassigned") {
            serde_json::Value::Null
        } else {
            json!({ key: value })
        };
        match issue.custom_fields.iter_mut().find(|f| f.name == name) {
            Some(field) => field.value = value,
            None => issue.custom_fields.push(CustomField {
                name: name.to_string(),
                value,
            }),
        }
    }
}

#[async_trait]
impl IssueTracker for MockTracker {
    async fn list_issues(&self, filter: &IssueFilter) -> Result<Vec<Issue>> {
        let state = self.lock();
        let query = filter.query.as_deref().map(str::to_lowercase);
        Ok(state
            .issues
            .iter()
            .filter(|i| match &filter.project {
                Some(p) => i
                    .project
                    .as_ref()
                    .is_some_and(|proj| proj.short_name.eq_ignore_ascii_case(p)),
                None => true,
            })
            .filter(|i| match &query {
                Some(q) => i.summary.to_lowercase().contains(q.as_str()),
                None => true,
            })
            .skip(filter.skip)
            .take(filter.limit)
            .cloned()
            .collect())
    }

    async fn get_issue(&self, id: &IssueId) -> Result<Issue> {
        let state = self.lock();
        let index = state.issue_index(id)?;
        Ok(state.issues[index].clone())
    }

    async fn create_issue(&self, new: NewIssue) -> Result<Issue> {
        new.validate()?;
        let mut state = self.lock();
        let project = state.project(new.project.trim())?;
        let n = state.next();
        let reporter = state.me();
        let created = now();

        let mut issue = Issue {
            id: format!("2-{n}"),
            id_readable: format!("{}-{n}", project.short_name),
            summary: new.summary.trim().to_string(),
            description: new.description,
            created: Some(created),
            updated: Some(created),
            resolved: None,
            project: Some(project),
            reporter: Some(reporter),
            tags: vec![],
            custom_fields: vec![],
        };
        apply_fields(&mut issue, &new.fields);
        state.issues.push(issue.clone());
        Ok(issue)
    }

    async fn update_issue(&self, id: &IssueId, update: IssueUpdate) -> Result<Issue> {
        update.validate()?;
        let mut state = self.lock();
        let index = state.issue_index(id)?;
        let issue = &mut state.issues[index];

        if let Some(summary) = update.summary {
            issue.summary = summary.trim().to_string();
        }
        if let Some(description) = update.description {
            issue.description = Some(description);
        }
        apply_fields(issue, &update.fields);
        issue.updated = Some(now());
        Ok(issue.clone())
    }

    async fn delete_issue(&self, id: &IssueId) -> Result<()> {
        let mut state = self.lock();
        let index = state.issue_index(id)?;
        let removed = state.issues.remove(index);
        state.comments.remove(&removed.id_readable);
        state.work_items.remove(&removed.id_readable);
        state.attachments.remove(&removed.id_readable);
        state.links.remove(&removed.id_readable);
        Ok(())
    }

    async fn apply_command(
        &self,
        id: &IssueId,
        command: &str,
        comment: Option<&str>,
    ) -> Result<()> {
        let mut state = self.lock();
        let index = state.issue_index(id)?;
        let issue = state.issues[index].id_readable.clone();
        state.commands.push(RecordedCommand {
            issue,
            command: command.to_string(),
            comment: comment.map(str::to_string),
        });
        Ok(())
    }

    async fn add_tag(&self, id: &IssueId, tag: &str) -> Result<Issue> {
        self.apply_command(id, &crate::command::tag(tag), None)
            .await?;
        let mut state = self.lock();
        let index = state.issue_index(id)?;
        let tag = tag.trim().to_string();

        if !state.tags.iter().any(|t| t.name == tag) {
            let n = state.next();
            state.tags.push(Tag {
                id: Some(format!("6-{n}")),
                name: tag.clone(),
            });
        }
        let known = state.tags.iter().find(|t| t.name == tag).cloned();

        let issue = &mut state.issues[index];
        if let Some(known) = known.filter(|_| !issue.tags.iter().any(|t| t.name == tag)) {
            issue.tags.push(known);
        }
        Ok(issue.clone())
    }

    async fn remove_tag(&self, id: &IssueId, tag: &str) -> Result<Issue> {
        self.apply_command(id, &crate::command::untag(tag), None)
            .await?;
        let mut state = self.lock();
        let index = state.issue_index(id)?;
        let issue = &mut state.issues[index];
        issue.tags.retain(|t| t.name != tag.trim());
        Ok(issue.clone())
    }

    async fn link_issues(&self, source: &IssueId, verb: LinkVerb, target: &IssueId) -> Result<()> {
        self.apply_command(source, &verb.command(target.as_str()), None)
            .await?;
        let mut state = self.lock();
        let source_index = state.issue_index(source)?;
        let target_index = state.issue_index(target)?;
        let source_key = state.issues[source_index].id_readable.clone();
        let linked = state.issues[target_index].clone();

        state.links.entry(source_key).or_default().push(IssueLink {
            direction: LinkDirection::Outward,
            link_type: LinkType {
                name: verb.as_str().to_string(),
                source_to_target: Some(verb.as_str().to_string()),
                target_to_source: None,
            },
            issues: vec![linked],
        });
        Ok(())
    }

    async fn list_tags(&self) -> Result<Vec<Tag>> {
        Ok(self.lock().tags.clone())
    }

    async fn list_comments(&self, id: &IssueId) -> Result<Vec<Comment>> {
        let state = self.lock();
        let index = state.issue_index(id)?;
        let key = &state.issues[index].id_readable;
        Ok(state.comments.get(key).cloned().unwrap_or_default())
    }

    async fn add_comment(&self, id: &IssueId, text: &str) -> Result<Comment> {
        if text.trim().is_empty() {
            return Err(Error::invalid("comment", "text cannot be empty"));
        }
        let mut state = self.lock();
        let index = state.issue_index(id)?;
        let key = state.issues[index].id_readable.clone();
        let n = state.next();
        let comment = Comment {
            id: format!("4-{n}"),
            text: Some(text.to_string()),
            author: Some(state.me()),
            created: Some(now()),
            updated: None,
        };
        state.comments.entry(key).or_default().push(comment.clone());
        Ok(comment)
    }

    async fn list_links(&self, id: &IssueId) -> Result<Vec<IssueLink>> {
        let state = self.lock();
        let index = state.issue_index(id)?;
        let key = &state.issues[index].id_readable;
        Ok(state.links.get(key).cloned().unwrap_or_default())
    }

    async fn list_work_items(&self, id: &IssueId) -> Result<Vec<WorkItem>> {
        let state = self.lock();
        let index = state.issue_index(id)?;
        let key = &state.issues[index].id_readable;
        Ok(state.work_items.get(key).cloned().unwrap_or_default())
    }

    async fn add_work_item(&self, id: &IssueId, item: NewWorkItem) -> Result<WorkItem> {
        if item.minutes == 0 {
            return Err(Error::invalid("duration", "must be longer than zero"));
        }
        let mut state = self.lock();
        let index = state.issue_index(id)?;
        let key = state.issues[index].id_readable.clone();
        let n = state.next();
        let date = item
            .date
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map_or_else(now, |dt| dt.and_utc().timestamp_millis());
        let work_item = WorkItem {
            id: format!("8-{n}"),
            author: Some(state.me()),
            date: Some(date),
            duration: WorkDuration {
                minutes: item.minutes,
                presentation: Some(crate::duration::format_minutes(item.minutes)),
            },
            text: item.text,
            work_type: item.work_type.map(|name| crate::domain::WorkItemType { id: None, name }),
        };
        state.work_items.entry(key).or_default().push(work_item.clone());
        Ok(work_item)
    }

    async fn list_attachments(&self, id: &IssueId) -> Result<Vec<Attachment>> {
        let state = self.lock();
        let index = state.issue_index(id)?;
        let key = &state.issues[index].id_readable;
        Ok(state.attachments.get(key).cloned().unwrap_or_default())
    }

    async fn upload_attachment(&self, id: &IssueId, path: &Path) -> Result<Vec<Attachment>> {
        let metadata = tokio::fs::metadata(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::invalid("file", format!("{} is not a file", path.display())))?;

        let mut state = self.lock();
        let index = state.issue_index(id)?;
        let key = state.issues[index].id_readable.clone();
        let n = state.next();
        let attachment = Attachment {
            id: format!("9-{n}"),
            url: Some(format!("/api/files/9-{n}")),
            name,
            size: metadata.len(),
            mime_type: None,
            created: Some(now()),
            author: Some(state.me()),
        };
        state
            .attachments
            .entry(key)
            .or_default()
            .push(attachment.clone());
        Ok(vec![attachment])
    }

    async fn list_projects(&self, limit: usize) -> Result<Vec<Project>> {
        Ok(self.lock().projects.iter().take(limit).cloned().collect())
    }

    async fn get_project(&self, id: &str) -> Result<Project> {
        self.lock().project(id.trim())
    }

    async fn list_users(&self, query: Option<&str>, limit: usize) -> Result<Vec<User>> {
        let query = query.map(str::to_lowercase);
        Ok(self
            .lock()
            .users
            .iter()
            .filter(|u| match &query {
                Some(q) => {
                    u.login.to_lowercase().contains(q.as_str())
                        || u.display_name().to_lowercase().contains(q.as_str())
                }
                None => true,
            })
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get_user(&self, id: &str) -> Result<User> {
        let id = id.trim();
        self.lock()
            .users
            .iter()
            .find(|u| u.id == id || u.login == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("user {id}")))
    }

    async fn current_user(&self) -> Result<User> {
        Ok(self.lock().me())
    }
}
