//! Core data types for `issuehub`.
//!
//! - `Project` - a tenant-owned container of issues
//! - `Issue` - a numbered work item inside a project
//! - `Status` / `Priority` - fixed workflow and urgency enumerations
//! - `Activity` / `ActivityType` - append-only audit entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::TrackerError;

pub mod diff;
pub mod input;

pub use diff::{ClosedAtChange, closed_at_transition, derive_activities};
pub use input::{
    CreateIssueInput, CreateProjectInput, DeleteOutcome, IssueUpdate, ProjectUpdate,
    UpdateIssueInput, UpdateProjectInput,
};

/// Sentinel accepted by list filters meaning "do not filter".
pub const FILTER_ALL: &str = "ALL";

/// Issue workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    #[default]
    Open,
    InProgress,
    Done,
    Closed,
}

impl Status {
    pub const ALL: [Self; 4] = [Self::Open, Self::InProgress, Self::Done, Self::Closed];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
            Self::Closed => "CLOSED",
        }
    }

    /// DONE and CLOSED both count as closed for `closed_at` bookkeeping.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Done | Self::Closed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_enum_token(s).as_str() {
            "OPEN" => Ok(Self::Open),
            "IN_PROGRESS" | "INPROGRESS" => Ok(Self::InProgress),
            "DONE" => Ok(Self::Done),
            "CLOSED" => Ok(Self::Closed),
            _ => Err(TrackerError::InvalidStatus {
                status: s.trim().to_string(),
            }),
        }
    }
}

/// Issue urgency.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Urgent];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Urgent => "URGENT",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_enum_token(s).as_str() {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            "URGENT" => Ok(Self::Urgent),
            _ => Err(TrackerError::InvalidPriority {
                priority: s.trim().to_string(),
            }),
        }
    }
}

fn normalize_enum_token(s: &str) -> String {
    s.trim().to_uppercase().replace(['-', ' '], "_")
}

/// Parse an optional status filter; `ALL` (any case) means no filter.
///
/// # Errors
///
/// Returns `InvalidStatus` for anything that is neither `ALL` nor a status.
pub fn parse_status_filter(value: &str) -> Result<Option<Status>, TrackerError> {
    if value.trim().eq_ignore_ascii_case(FILTER_ALL) {
        return Ok(None);
    }
    value.parse().map(Some)
}

/// Parse an optional priority filter; `ALL` (any case) means no filter.
///
/// # Errors
///
/// Returns `InvalidPriority` for anything that is neither `ALL` nor a priority.
pub fn parse_priority_filter(value: &str) -> Result<Option<Priority>, TrackerError> {
    if value.trim().eq_ignore_ascii_case(FILTER_ALL) {
        return Ok(None);
    }
    value.parse().map(Some)
}

/// Optional equality filters for issue lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueFilters {
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub priority: Option<Priority>,
}

impl IssueFilters {
    /// Build filters from textual values, each of which may be `ALL`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStatus` or `InvalidPriority` for unknown values.
    pub fn parse(status: Option<&str>, priority: Option<&str>) -> Result<Self, TrackerError> {
        Ok(Self {
            status: status.map(parse_status_filter).transpose()?.flatten(),
            priority: priority.map(parse_priority_filter).transpose()?.flatten(),
        })
    }
}

/// Activity log entry type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    IssueCreated,
    StatusChanged,
    PriorityChanged,
    AssigneeChanged,
    CommentAdded,
    LabelAdded,
    LabelRemoved,
}

impl ActivityType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::IssueCreated => "ISSUE_CREATED",
            Self::StatusChanged => "STATUS_CHANGED",
            Self::PriorityChanged => "PRIORITY_CHANGED",
            Self::AssigneeChanged => "ASSIGNEE_CHANGED",
            Self::CommentAdded => "COMMENT_ADDED",
            Self::LabelAdded => "LABEL_ADDED",
            Self::LabelRemoved => "LABEL_REMOVED",
        }
    }

    /// Parse the stored representation. Unknown values yield `None`.
    #[must_use]
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "ISSUE_CREATED" => Some(Self::IssueCreated),
            "STATUS_CHANGED" => Some(Self::StatusChanged),
            "PRIORITY_CHANGED" => Some(Self::PriorityChanged),
            "ASSIGNEE_CHANGED" => Some(Self::AssigneeChanged),
            "COMMENT_ADDED" => Some(Self::CommentAdded),
            "LABEL_ADDED" => Some(Self::LabelAdded),
            "LABEL_REMOVED" => Some(Self::LabelRemoved),
            _ => None,
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-form activity metadata, typically `{from, to}`.
pub type ActivityMetadata = BTreeMap<String, String>;

/// A project owned by an organization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub id: String,
    pub org_id: String,
    pub name: String,
    /// Unique per organization.
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Project with its issue count, for list and detail views.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectWithCount {
    #[serde(flatten)]
    pub project: Project,
    pub issue_count: usize,
}

/// A numbered issue inside a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Issue {
    pub id: String,
    pub project_id: String,

    /// Sequential per project, starting at 1. Never reused.
    pub number: i64,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub status: Status,

    #[serde(default)]
    pub priority: Priority,

    pub creator_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Set while the issue sits in DONE or CLOSED.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

/// An entry in an issue's activity log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Activity {
    pub id: i64,
    pub issue_id: String,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: ActivityMetadata,
    pub created_at: DateTime<Utc>,
}

/// An activity staged for insertion; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivity {
    pub activity_type: ActivityType,
    pub metadata: ActivityMetadata,
}

impl NewActivity {
    #[must_use]
    pub const fn new(activity_type: ActivityType) -> Self {
        Self {
            activity_type,
            metadata: BTreeMap::new(),
        }
    }

    /// Build a `{from, to}` change record. `None` sides are left out of the map.
    #[must_use]
    pub fn change(activity_type: ActivityType, from: Option<&str>, to: Option<&str>) -> Self {
        let mut metadata = BTreeMap::new();
        if let Some(from) = from {
            metadata.insert("from".to_string(), from.to_string());
        }
        if let Some(to) = to {
            metadata.insert("to".to_string(), to.to_string());
        }
        Self {
            activity_type,
            metadata,
        }
    }
}

/// Issue plus its most recent activities, for the detail view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IssueDetails {
    #[serde(flatten)]
    pub issue: Issue,
    #[serde(default)]
    pub activities: Vec<Activity>,
}

/// Issue with the owning project's name and slug, for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecentIssue {
    #[serde(flatten)]
    pub issue: Issue,
    pub project_name: String,
    pub project_slug: String,
}

/// Tenant-wide aggregate counts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_issues: usize,
    pub open_issues: usize,
    pub in_progress_issues: usize,
    pub done_issues: usize,
    pub closed_issues: usize,
    pub project_count: usize,
    pub recent_issues: Vec<RecentIssue>,
}
