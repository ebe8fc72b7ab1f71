//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! user input at parse time, providing immediate feedback for invalid values.

use chrono::NaiveDate;

use crate::command::LinkVerb;
use crate::domain;
use crate::duration::parse_duration;

/// Validate issue ID format (`PROJECT-NUMBER` or a database id).
///
/// Delegates to the domain validator to keep a single source of truth.
pub fn validate_issue_id(s: &str) -> Result<String, String> {
    domain::validate_issue_id(s)
}

/// Validate an issue summary.
pub fn validate_summary(s: &str) -> Result<String, String> {
    domain::validate_summary(s)
}

/// Reject empty or whitespace-only values.
pub fn validate_non_empty(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("Value cannot be empty".to_string());
    }
    Ok(trimmed.to_string())
}

/// Parse a worklog duration into minutes.
pub fn validate_duration(s: &str) -> Result<u32, String> {
    parse_duration(s).map_err(|e| e.to_string())
}

/// Parse a link verb, accepting spaced, hyphenated and alias forms.
pub fn validate_link_verb(s: &str) -> Result<LinkVerb, String> {
    s.parse::<LinkVerb>().map_err(|e| e.to_string())
}

/// Parse a calendar date in `YYYY-MM-DD` form.
pub fn validate_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{s}'. Expected YYYY-MM-DD (e.g., 2024-03-15)"))
}
