//! YouTrack command-language shaping.
//!
//! Custom fields, tags and links are all changed by posting a command string
//! such as `State Fixed`, `tag regression` or `relates to DEMO-2` to
//! `/api/commands`. This module builds those strings.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Wrap a value in braces when it contains whitespace.
///
/// Multi-word values must be braced in the command language, single words
/// must not be (braces around `me` would look up a user named `{me}`).
pub fn quote(value: &str) -> String {
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        format!("{{{value}}}")
    } else {
        value.to_string()
    }
}

/// Command that adds a tag.
pub fn tag(name: &str) -> String {
    format!("tag {}", quote(name))
}

/// Command that removes a tag.
pub fn untag(name: &str) -> String {
    format!("untag {}", quote(name))
}

/// Link verbs understood by default YouTrack link types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkVerb {
    /// Relates
    RelatesTo,
    /// Depend, target to source
    DependsOn,
    /// Depend, source to target
    IsRequiredFor,
    /// Duplicate, source to target
    Duplicates,
    /// Duplicate, target to source
    IsDuplicatedBy,
    /// Subtask, target to source
    SubtaskOf,
    /// Subtask, source to target
    ParentFor,
}

impl LinkVerb {
    /// All verbs, in display order.
    pub const ALL: [LinkVerb; 7] = [
        Self::RelatesTo,
        Self::DependsOn,
        Self::IsRequiredFor,
        Self::Duplicates,
        Self::IsDuplicatedBy,
        Self::SubtaskOf,
        Self::ParentFor,
    ];

    /// The phrase used in commands.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RelatesTo => "relates to",
            Self::DependsOn => "depends on",
            Self::IsRequiredFor => "is required for",
            Self::Duplicates => "duplicates",
            Self::IsDuplicatedBy => "is duplicated by",
            Self::SubtaskOf => "subtask of",
            Self::ParentFor => "parent for",
        }
    }

    /// Command that links the current issue to `target`.
    pub fn command(self, target: &str) -> String {
        format!("{} {}", self.as_str(), target.trim())
    }
}

impl fmt::Display for LinkVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkVerb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s
            .trim()
            .to_lowercase()
            .replace(['-', '_'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        match normalized.as_str() {
            "relates to" | "relates" | "related" | "relates with" => Ok(Self::RelatesTo),
            "depends on" | "depends" | "depend" => Ok(Self::DependsOn),
            "is required for" | "required for" | "blocks" => Ok(Self::IsRequiredFor),
            "duplicates" | "duplicate" => Ok(Self::Duplicates),
            "is duplicated by" | "duplicated by" => Ok(Self::IsDuplicatedBy),
            "subtask of" | "subtask" | "child of" => Ok(Self::SubtaskOf),
            "parent for" | "parent of" | "parent" => Ok(Self::ParentFor),
            _ => Err(Error::invalid(
                "link type",
                format!(
                    "'{s}'. Valid values: {}",
                    Self::ALL.map(Self::as_str).join(", ")
                ),
            )),
        }
    }
}
