//! The normalized work-unit model.
//!
//! Every backend lowers its native issue/task/work-item shape into these
//! types. Status and priority are closed enumerations; anything a backend
//! cannot express there goes into `metadata`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A task from any provider, in normalized form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkUnit {
    /// Internal identifier
    pub id: String,

    /// Provider-specific identifier
    pub external_id: String,

    /// User-facing key (e.g., "FEATURE-123"), when the tracker has one
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub external_key: String,

    /// Name of the provider this unit came from
    pub provider: String,

    pub title: String,
    pub description: String,
    pub status: Status,
    pub priority: Priority,

    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub assignees: Vec<Person>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,

    /// Identifiers of subtasks, in provider form
    #[serde(default)]
    pub subtasks: Vec<String>,

    /// Free-form provider metadata
    #[serde(default)]
    pub metadata: HashMap<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Where this work unit came from
    pub source: SourceInfo,
}

/// Tracks the origin of a work unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Provider name
    pub provider: String,
    /// Original reference string
    pub reference: String,
    /// Last sync time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synced_at: Option<DateTime<Utc>>,
}

/// Work-unit status (closed enumeration).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Open,
    InProgress,
    Review,
    Done,
    Closed,
}

impl Status {
    /// Get the stable string identifier for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Open => "open",
            Status::InProgress => "in_progress",
            Status::Review => "review",
            Status::Done => "done",
            Status::Closed => "closed",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Work-unit priority (closed, four levels).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Critical,
}

impl Priority {
    /// Get the stable string identifier for this priority.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }

    /// Parse a priority name, defaulting to `Normal` for anything unknown.
    pub fn from_name(name: &str) -> Priority {
        match name.to_lowercase().as_str() {
            "low" => Priority::Low,
            "high" => Priority::High,
            "critical" | "urgent" => Priority::Critical,
            _ => Priority::Normal,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user or assignee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
}

/// A comment on a work unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author: Person,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A file attachment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub name: String,
    pub url: String,
    pub content_type: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Options for list operations.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Only return work units with this status
    pub status: Option<Status>,

    /// Only return work units carrying all of these labels
    pub labels: Vec<String>,

    /// Maximum number of results (`None` = unbounded)
    pub limit: Option<usize>,

    /// Number of results to skip
    pub offset: usize,
}

/// Captured source content (read-only copy).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Source kind
    pub kind: SnapshotKind,
    /// Original reference
    pub reference: String,
    /// Per-file contents, for directory snapshots
    #[serde(default)]
    pub files: Vec<SnapshotFile>,
    /// Full content, for single-file snapshots
    #[serde(default)]
    pub content: String,
}

/// What a snapshot was taken of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotKind {
    File,
    Directory,
    Remote,
}

/// A single file inside a directory snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub path: String,
    pub content: String,
}

/// Options for creating a pull/merge request.
#[derive(Debug, Clone, Default)]
pub struct PullRequestOptions {
    pub title: String,
    pub body: String,
    pub source_branch: String,
    pub target_branch: String,
    pub labels: Vec<String>,
    pub reviewers: Vec<String>,
    pub draft: bool,
}

/// A pull/merge request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: String,
    pub number: u64,
    pub url: String,
    pub title: String,
    /// open, closed, merged
    pub state: String,
}

/// Options for creating a new work unit.
#[derive(Debug, Clone, Default)]
pub struct CreateWorkUnitOptions {
    pub title: String,
    pub description: String,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
    pub priority: Priority,
    /// Parent work unit, for subtask creation
    pub parent_id: Option<String>,
    pub custom_fields: HashMap<String, Value>,
}
