//! reqwest-backed implementation of [`IssueTracker`].

use super::{fields, IssueTracker};
use crate::config::Settings;
use crate::domain::{
    Attachment, Comment, Issue, IssueFilter, IssueId, IssueLink, IssueUpdate, NewIssue,
    NewWorkItem, Project, Tag, User, WorkItem,
};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{multipart, Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::path::Path;
use tracing::debug;
use url::Url;

/// Page size used when listing directory entities such as tags.
const DIRECTORY_LIMIT: usize = 500;

/// HTTP client for one YouTrack server.
#[derive(Debug, Clone)]
pub struct YouTrackClient {
    /// Server root, without `/api`.
    base: Url,

    /// Permanent token.
    token: String,

    /// HTTP client.
    http: Client,
}

impl YouTrackClient {
    /// Create a client from resolved settings.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for an unparsable base URL and `Error::Http`
    /// if the TLS backend cannot be initialised.
    pub fn new(settings: &Settings) -> Result<Self> {
        let base = Url::parse(&settings.base_url)
            .map_err(|e| Error::Config(format!("invalid YouTrack URL: {e}")))?;
        let http = Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("youtrack-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base,
            token: settings.token.clone(),
            http,
        })
    }

    /// Server root URL.
    pub fn base_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// Build `<base>/api/<segments...>`, percent-encoding each segment.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| Error::Config(format!("URL cannot be a base: {}", self.base)))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.endpoint(segments)?;
        debug!(method = %method, path = %url.path(), "YouTrack request");
        Ok(self
            .http
            .request(method, url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/json"))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        serde_json::from_str(&body).map_err(Error::from)
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<()> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }
        Ok(())
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        fields: &str,
        limit: usize,
    ) -> Result<Vec<T>> {
        let request = self
            .request(Method::GET, segments)?
            .query(&[("fields", fields)])
            .query(&[("$top", limit)]);
        self.send(request).await
    }
}

#[async_trait]
impl IssueTracker for YouTrackClient {
    async fn list_issues(&self, filter: &IssueFilter) -> Result<Vec<Issue>> {
        let mut request = self
            .request(Method::GET, &["issues"])?
            .query(&[("fields", fields::ISSUE_LIST)])
            .query(&[("$top", filter.limit), ("$skip", filter.skip)]);
        if let Some(query) = filter.effective_query() {
            debug!(query = %query, "Issue search");
            request = request.query(&[("query", query)]);
        }
        self.send(request).await
    }

    async fn get_issue(&self, id: &IssueId) -> Result<Issue> {
        let request = self
            .request(Method::GET, &["issues", id.as_str()])?
            .query(&[("fields", fields::ISSUE)]);
        self.send(request)
            .await
            .map_err(|e| not_found_as(e, &format!("issue {id}")))
    }

    async fn create_issue(&self, issue: NewIssue) -> Result<Issue> {
        issue.validate()?;
        let project = self.get_project(&issue.project).await?;

        let mut body = json!({
            "project": { "id": project.id },
            "summary": issue.summary.trim(),
        });
        if let Some(description) = &issue.description {
            body["description"] = json!(description);
        }

        let request = self
            .request(Method::POST, &["issues"])?
            .query(&[("fields", fields::ISSUE)])
            .json(&body);
        let created: Issue = self.send(request).await?;
        debug!(id = %created.display_id(), project = %project.short_name, "Created issue");

        match issue.fields.to_command() {
            Some(command) => {
                let id = IssueId::new(created.display_id());
                let result = self.apply_command(&id, &command, None).await;
                result.map_err(|e| partial_write(e, &id, "created", command))?;
                self.get_issue(&id).await
            }
            None => Ok(created),
        }
    }

    async fn update_issue(&self, id: &IssueId, update: IssueUpdate) -> Result<Issue> {
        update.validate()?;

        if update.has_text_changes() {
            let mut body = Map::new();
            if let Some(summary) = &update.summary {
                body.insert("summary".to_string(), json!(summary.trim()));
            }
            if let Some(description) = &update.description {
                body.insert("description".to_string(), json!(description));
            }
            let request = self
                .request(Method::POST, &["issues", id.as_str()])?
                .query(&[("fields", "id")])
                .json(&Value::Object(body));
            let _: Value = self
                .send(request)
                .await
                .map_err(|e| not_found_as(e, &format!("issue {id}")))?;
        }

        if let Some(command) = update.to_command() {
            let result = self.apply_command(id, &command, None).await;
            if update.has_text_changes() {
                result.map_err(|e| partial_write(e, id, "updated", command))?;
            } else {
                result.map_err(|e| not_found_as(e, &format!("issue {id}")))?;
            }
        }

        self.get_issue(id).await
    }

    async fn delete_issue(&self, id: &IssueId) -> Result<()> {
        let request = self.request(Method::DELETE, &["issues", id.as_str()])?;
        self.send_empty(request)
            .await
            .map_err(|e| not_found_as(e, &format!("issue {id}")))
    }

    async fn apply_command(
        &self,
        id: &IssueId,
        command: &str,
        comment: Option<&str>,
    ) -> Result<()> {
        debug!(issue = %id, command = %command, "Applying command");
        let request = self
            .request(Method::POST, &["commands"])?
            .json(&command_body(id, command, comment));
        self.send_empty(request).await
    }

    async fn list_tags(&self) -> Result<Vec<Tag>> {
        self.get_list(&["tags"], fields::TAG, DIRECTORY_LIMIT).await
    }

    async fn list_comments(&self, id: &IssueId) -> Result<Vec<Comment>> {
        let request = self
            .request(Method::GET, &["issues", id.as_str(), "comments"])?
            .query(&[("fields", fields::COMMENT)]);
        self.send(request)
            .await
            .map_err(|e| not_found_as(e, &format!("issue {id}")))
    }

    async fn add_comment(&self, id: &IssueId, text: &str) -> Result<Comment> {
        if text.trim().is_empty() {
            return Err(Error::invalid("comment", "text cannot be empty"));
        }
        let request = self
            .request(Method::POST, &["issues", id.as_str(), "comments"])?
            .query(&[("fields", fields::COMMENT)])
            .json(&json!({ "text": text }));
        self.send(request)
            .await
            .map_err(|e| not_found_as(e, &format!("issue {id}")))
    }

    async fn list_links(&self, id: &IssueId) -> Result<Vec<IssueLink>> {
        let request = self
            .request(Method::GET, &["issues", id.as_str(), "links"])?
            .query(&[("fields", fields::LINK)]);
        let links: Vec<IssueLink> = self
            .send(request)
            .await
            .map_err(|e| not_found_as(e, &format!("issue {id}")))?;
        Ok(links.into_iter().filter(|l| !l.issues.is_empty()).collect())
    }

    async fn list_work_items(&self, id: &IssueId) -> Result<Vec<WorkItem>> {
        let request = self
            .request(
                Method::GET,
                &["issues", id.as_str(), "timeTracking", "workItems"],
            )?
            .query(&[("fields", fields::WORK_ITEM)]);
        self.send(request)
            .await
            .map_err(|e| not_found_as(e, &format!("issue {id}")))
    }

    async fn add_work_item(&self, id: &IssueId, item: NewWorkItem) -> Result<WorkItem> {
        if item.minutes == 0 {
            return Err(Error::invalid("duration", "must be longer than zero"));
        }
        let request = self
            .request(
                Method::POST,
                &["issues", id.as_str(), "timeTracking", "workItems"],
            )?
            .query(&[("fields", fields::WORK_ITEM)])
            .json(&work_item_body(&item));
        self.send(request)
            .await
            .map_err(|e| not_found_as(e, &format!("issue {id}")))
    }

    async fn list_attachments(&self, id: &IssueId) -> Result<Vec<Attachment>> {
        let request = self
            .request(Method::GET, &["issues", id.as_str(), "attachments"])?
            .query(&[("fields", fields::ATTACHMENT)]);
        self.send(request)
            .await
            .map_err(|e| not_found_as(e, &format!("issue {id}")))
    }

    async fn upload_attachment(&self, id: &IssueId, path: &Path) -> Result<Vec<Attachment>> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::invalid("file", format!("{} is not a file", path.display())))?;
        let bytes = tokio::fs::read(path).await?;
        debug!(issue = %id, file = %file_name, size = bytes.len(), "Uploading attachment");

        let part = multipart::Part::bytes(bytes).file_name(file_name.clone());
        let form = multipart::Form::new().part(file_name, part);
        let request = self
            .request(Method::POST, &["issues", id.as_str(), "attachments"])?
            .query(&[("fields", fields::ATTACHMENT)])
            .multipart(form);
        self.send(request)
            .await
            .map_err(|e| not_found_as(e, &format!("issue {id}")))
    }

    async fn list_projects(&self, limit: usize) -> Result<Vec<Project>> {
        self.get_list(&["admin", "projects"], fields::PROJECT, limit)
            .await
    }

    async fn get_project(&self, id: &str) -> Result<Project> {
        let id = id.trim();
        if is_database_id(id) {
            let request = self
                .request(Method::GET, &["admin", "projects", id])?
                .query(&[("fields", fields::PROJECT)]);
            return self
                .send(request)
                .await
                .map_err(|e| not_found_as(e, &format!("project {id}")));
        }

        let request = self
            .request(Method::GET, &["admin", "projects"])?
            .query(&[("fields", fields::PROJECT), ("query", id)])
            .query(&[("$top", DIRECTORY_LIMIT)]);
        let candidates: Vec<Project> = self.send(request).await?;
        find_project(candidates, id).ok_or_else(|| Error::NotFound(format!("project {id}")))
    }

    async fn list_users(&self, query: Option<&str>, limit: usize) -> Result<Vec<User>> {
        let mut request = self
            .request(Method::GET, &["users"])?
            .query(&[("fields", fields::USER)])
            .query(&[("$top", limit)]);
        if let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) {
            request = request.query(&[("query", query)]);
        }
        self.send(request).await
    }

    async fn get_user(&self, id: &str) -> Result<User> {
        let request = self
            .request(Method::GET, &["users", id.trim()])?
            .query(&[("fields", fields::USER)]);
        self.send(request)
            .await
            .map_err(|e| not_found_as(e, &format!("user {id}")))
    }

    async fn current_user(&self) -> Result<User> {
        let request = self
            .request(Method::GET, &["users", "me"])?
            .query(&[("fields", fields::USER)]);
        self.send(request).await
    }
}

/// Map a non-success status and body to an error.
pub(crate) fn status_error(status: StatusCode, body: &str) -> Error {
    let message = upstream_message(body);
    match status {
        StatusCode::NOT_FOUND => Error::NotFound(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Unauthorized {
            status: status.as_u16(),
            message,
        },
        _ => Error::Api {
            status: status.as_u16(),
            message,
        },
    }
}

/// Extract the human-readable message from an error body.
///
/// YouTrack answers with `{"error": "...", "error_description": "..."}`;
/// proxies in front of it often answer with HTML or plain text.
pub(crate) fn upstream_message(body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        ["error_description", "error", "message"]
            .iter()
            .find_map(|key| v.get(*key).and_then(Value::as_str).map(str::to_string))
    });

    from_json
        .filter(|m| !m.trim().is_empty())
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| "(empty response)".to_string())
}

/// Replace a bare 404 message with the resource that was looked up.
fn not_found_as(err: Error, what: &str) -> Error {
    match err {
        Error::NotFound(_) => Error::NotFound(what.to_string()),
        other => other,
    }
}

/// Wrap a failed follow-up command for an issue that was already written.
fn partial_write(err: Error, id: &IssueId, action: &'static str, command: String) -> Error {
    tracing::warn!(issue = %id, command = %command, error = %err, "Issue {action} but fields not set");
    Error::PartialWrite {
        issue: id.as_str().to_string(),
        action,
        command,
        source: Box::new(err),
    }
}

/// Database ids look like `0-12`: digits, hyphen, digits.
fn is_database_id(id: &str) -> bool {
    id.split_once('-').is_some_and(|(a, b)| {
        !a.is_empty()
            && !b.is_empty()
            && a.chars().all(|c| c.is_ascii_digit())
            && b.chars().all(|c| c.is_ascii_digit())
    })
}

/// Pick the exact match from a project search: short name, then name.
fn find_project(candidates: Vec<Project>, id: &str) -> Option<Project> {
    let by_short = candidates
        .iter()
        .position(|p| p.short_name.eq_ignore_ascii_case(id));
    let index = by_short.or_else(|| {
        candidates
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(id))
    })?;
    candidates.into_iter().nth(index)
}

/// Body for `POST /api/commands`.
fn command_body(id: &IssueId, command: &str, comment: Option<&str>) -> Value {
    let issue = if is_database_id(id.as_str()) {
        json!({ "id": id.as_str() })
    } else {
        json!({ "idReadable": id.as_str() })
    };

    let mut body = json!({
        "query": command,
        "issues": [issue],
    });
    if let Some(comment) = comment.filter(|c| !c.trim().is_empty()) {
        body["comment"] = json!(comment);
    }
    body
}

/// Body for `POST .../timeTracking/workItems`.
fn work_item_body(item: &NewWorkItem) -> Value {
    let mut body = json!({ "duration": { "minutes": item.minutes } });
    if let Some(text) = &item.text {
        body["text"] = json!(text);
    }
    if let Some(millis) = item
        .date
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
    {
        body["date"] = json!(millis);
    }
    if let Some(work_type) = &item.work_type {
        body["type"] = json!({ "name": work_type });
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;
    use std::time::Duration;

    fn client(base: &str) -> YouTrackClient {
        YouTrackClient::new(&Settings {
            base_url: base.to_string(),
            token: "perm:test".to_string(),
            default_project: None,
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[rstest]
    #[case::root("https://yt.example.com", &["issues"], "https://yt.example.com/api/issues")]
    #[case::sub_path("https://host/youtrack", &["issues", "DEMO-1"], "https://host/youtrack/api/issues/DEMO-1")]
    #[case::nested("https://yt.example.com", &["issues", "DEMO-1", "timeTracking", "workItems"], "https://yt.example.com/api/issues/DEMO-1/timeTracking/workItems")]
    #[case::encodes_segment("https://yt.example.com", &["users", "a b/c"], "https://yt.example.com/api/users/a%20b%2Fc")]
    fn test_endpoint(#[case] base: &str, #[case] segments: &[&str], #[case] expected: &str) {
        assert_eq!(client(base).endpoint(segments).unwrap().as_str(), expected);
    }

    #[test]
    fn test_base_url_has_no_trailing_slash() {
        assert_eq!(client("https://yt.example.com").base_url(), "https://yt.example.com");
    }

    #[test]
    fn test_requests_carry_bearer_token_and_accept_header() {
        let request = client("https://yt.example.com")
            .request(Method::GET, &["users", "me"])
            .unwrap()
            .build()
            .unwrap();
        let headers = request.headers();
        assert_eq!(headers.get("authorization").unwrap(), "Bearer perm:test");
        assert_eq!(headers.get("accept").unwrap(), "application/json");
    }

    #[rstest]
    #[case::description(
        r#"{"error":"bad_request","error_description":"Unknown field State"}"#,
        "Unknown field State"
    )]
    #[case::error_only(r#"{"error":"Not Found"}"#, "Not Found")]
    #[case::plain_text("Bad Gateway", "Bad Gateway")]
    #[case::empty("", "(empty response)")]
    #[case::empty_json_message(r#"{"error":""}"#, r#"{"error":""}"#)]
    fn test_upstream_message(#[case] body: &str, #[case] expected: &str) {
        assert_eq!(upstream_message(body), expected);
    }

    #[test]
    fn test_status_error_mapping() {
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, ""),
            Error::NotFound(_)
        ));
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "{}"),
            Error::Unauthorized { status: 401, .. }
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, "{}"),
            Error::Unauthorized { status: 403, .. }
        ));
        match status_error(StatusCode::BAD_REQUEST, r#"{"error_description":"nope"}"#) {
            Error::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "nope");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_not_found_as_names_resource() {
        let err = not_found_as(Error::NotFound("Entity not found".to_string()), "issue DEMO-9");
        assert_eq!(err.to_string(), "Not found: issue DEMO-9");

        let other = not_found_as(Error::Config("x".to_string()), "issue DEMO-9");
        assert!(matches!(other, Error::Config(_)));
    }

    #[rstest]
    #[case("0-12", true)]
    #[case("22-3", true)]
    #[case("DEMO-3", false)]
    #[case("0-", false)]
    #[case("12", false)]
    fn test_is_database_id(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_database_id(input), expected);
    }

    #[test]
    fn test_command_body_uses_readable_or_database_id() {
        let body = command_body(&IssueId::new("DEMO-1"), "tag urgent", None);
        assert_eq!(
            body,
            json!({"query": "tag urgent", "issues": [{"idReadable": "DEMO-1"}]})
        );

        let body = command_body(&IssueId::new("2-7"), "State Fixed", Some("done"));
        assert_eq!(
            body,
            json!({"query": "State Fixed", "issues": [{"id": "2-7"}], "comment": "done"})
        );
    }

    #[test]
    fn test_command_body_skips_blank_comment() {
        let body = command_body(&IssueId::new("DEMO-1"), "State Fixed", Some("  "));
        assert!(body.get("comment").is_none());
    }

    #[test]
    fn test_work_item_body() {
        let item = NewWorkItem {
            minutes: 90,
            text: Some("pairing".to_string()),
            date: NaiveDate::from_ymd_opt(2024, 1, 15),
            work_type: Some("Development".to_string()),
        };
        assert_eq!(
            work_item_body(&item),
            json!({
                "duration": {"minutes": 90},
                "text": "pairing",
                "date": 1_705_276_800_000_i64,
                "type": {"name": "Development"}
            })
        );

        let minimal = NewWorkItem {
            minutes: 15,
            ..Default::default()
        };
        assert_eq!(work_item_body(&minimal), json!({"duration": {"minutes": 15}}));
    }

    #[test]
    fn test_find_project_prefers_short_name() {
        let projects = vec![
            Project {
                id: "0-1".to_string(),
                name: "DEMO".to_string(),
                short_name: "OTHER".to_string(),
                ..Default::default()
            },
            Project {
                id: "0-2".to_string(),
                name: "Demo project".to_string(),
                short_name: "DEMO".to_string(),
                ..Default::default()
            },
        ];
        assert_eq!(find_project(projects.clone(), "demo").unwrap().id, "0-2");
        assert_eq!(find_project(projects.clone(), "Demo Project").unwrap().id, "0-2");
        assert!(find_project(projects, "missing").is_none());
    }
}
