//! Structured error output.
//!
//! Machine-parseable error information with:
//! - stable error codes grouped by category (each category has an exit code)
//! - hints for self-correction, including intent detection for near-miss
//!   status and priority values
//! - a retryability flag and optional context data

#![allow(clippy::option_if_let_else)]

use crate::error::TrackerError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Machine-readable error codes.
///
/// These codes are stable. Format: `SCREAMING_SNAKE_CASE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // === Database / workspace (exit code 2) ===
    DatabaseError,
    NotInitialized,
    AlreadyInitialized,

    // === Not found (exit code 3) ===
    ProjectNotFound,
    IssueNotFound,

    // === Validation (exit code 4) ===
    ValidationFailed,
    InvalidStatus,
    InvalidPriority,

    // === Auth (exit code 5) ===
    Unauthorized,

    // === Conflict (exit code 6) ===
    Conflict,

    // === Config (exit code 7) ===
    ConfigError,

    // === I/O (exit code 8) ===
    IoError,
    JsonError,
    YamlError,

    // === Internal (exit code 1) ===
    InternalError,
}

impl ErrorCode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DatabaseError => "DATABASE_ERROR",
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::ProjectNotFound => "PROJECT_NOT_FOUND",
            Self::IssueNotFound => "ISSUE_NOT_FOUND",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::InvalidStatus => "INVALID_STATUS",
            Self::InvalidPriority => "INVALID_PRIORITY",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Conflict => "CONFLICT",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::YamlError => "YAML_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Retryable means the caller might succeed by waiting or by fixing input.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Conflict | Self::ValidationFailed | Self::InvalidStatus | Self::InvalidPriority
        )
    }

    /// Exit code for this error category.
    ///
    /// - 1: internal
    /// - 2: database / workspace
    /// - 3: not found
    /// - 4: validation
    /// - 5: unauthorized
    /// - 6: conflict
    /// - 7: config
    /// - 8: I/O
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::DatabaseError | Self::NotInitialized | Self::AlreadyInitialized => 2,
            Self::ProjectNotFound | Self::IssueNotFound => 3,
            Self::ValidationFailed | Self::InvalidStatus | Self::InvalidPriority => 4,
            Self::Unauthorized => 5,
            Self::Conflict => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError | Self::YamlError => 8,
            Self::InternalError => 1,
        }
    }
}

impl From<TrackerError> for StructuredError {
    fn from(err: TrackerError) -> Self {
        Self::from_error(&err)
    }
}

/// Structured error for machine-parseable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl StructuredError {
    #[must_use]
    pub fn from_error(err: &TrackerError) -> Self {
        let (code, context) = Self::extract_code_and_context(err);
        let hint = Self::generate_hint(err);

        Self {
            code,
            message: err.to_string(),
            hint,
            retryable: code.is_retryable(),
            context,
        }
    }

    /// Project lookup failure with similar-slug suggestions.
    #[must_use]
    pub fn project_not_found(searched: &str, existing_slugs: &[String]) -> Self {
        let similar = find_similar(searched, existing_slugs, 3);

        let hint = match similar.as_slice() {
            [] => Some("Run 'ih project list' to see your projects.".to_string()),
            [only] => Some(format!("Did you mean '{only}'?")),
            many => Some(format!("Did you mean one of: {}?", many.join(", "))),
        };

        Self {
            code: ErrorCode::ProjectNotFound,
            message: format!("Project not found: {searched}"),
            hint,
            retryable: false,
            context: Some(json!({
                "searched": searched,
                "similar": similar,
            })),
        }
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code.as_str(),
                "message": self.message,
                "hint": self.hint,
                "retryable": self.retryable,
                "context": self.context,
            }
        })
    }

    #[must_use]
    pub fn to_human(&self, color: bool) -> String {
        let mut output = String::new();

        if color {
            output.push_str("\x1b[31mError:\x1b[0m ");
        } else {
            output.push_str("Error: ");
        }
        output.push_str(&self.message);

        if let Some(hint) = &self.hint {
            output.push('\n');
            if color {
                output.push_str("\x1b[33mHint:\x1b[0m ");
            } else {
                output.push_str("Hint: ");
            }
            output.push_str(hint);
        }

        output
    }

    fn extract_code_and_context(err: &TrackerError) -> (ErrorCode, Option<Value>) {
        match err {
            TrackerError::Unauthorized => (ErrorCode::Unauthorized, None),
            TrackerError::Validation { field, reason } => (
                ErrorCode::ValidationFailed,
                Some(json!({"field": field, "reason": reason})),
            ),
            TrackerError::InvalidStatus { status } => (
                ErrorCode::InvalidStatus,
                Some(json!({
                    "provided": status,
                    "valid_values": VALID_STATUSES,
                })),
            ),
            TrackerError::InvalidPriority { priority } => (
                ErrorCode::InvalidPriority,
                Some(json!({
                    "provided": priority,
                    "valid_values": VALID_PRIORITIES,
                })),
            ),
            TrackerError::ProjectNotFound { reference } => (
                ErrorCode::ProjectNotFound,
                Some(json!({"searched": reference})),
            ),
            TrackerError::IssueNotFound { reference } => (
                ErrorCode::IssueNotFound,
                Some(json!({"searched": reference})),
            ),
            TrackerError::Conflict { what } => (ErrorCode::Conflict, Some(json!({"what": what}))),
            TrackerError::Database(_) => (ErrorCode::DatabaseError, None),
            TrackerError::NotInitialized => (ErrorCode::NotInitialized, None),
            TrackerError::AlreadyInitialized { path } => (
                ErrorCode::AlreadyInitialized,
                Some(json!({"path": path.display().to_string()})),
            ),
            TrackerError::Config(_) => (ErrorCode::ConfigError, None),
            TrackerError::Io(_) => (ErrorCode::IoError, None),
            TrackerError::Json(_) => (ErrorCode::JsonError, None),
            TrackerError::Yaml(_) => (ErrorCode::YamlError, None),
            TrackerError::Other(_) => (ErrorCode::InternalError, None),
        }
    }

    fn generate_hint(err: &TrackerError) -> Option<String> {
        // Intent detection beats the generic suggestion when it finds something.
        match err {
            TrackerError::InvalidStatus { status } => {
                if let Some(detected) = detect_status_intent(status) {
                    return Some(format!("Did you mean --status {detected}?"));
                }
            }
            TrackerError::InvalidPriority { priority } => {
                if let Some(detected) = detect_priority_intent(priority) {
                    return Some(format!("Did you mean --priority {detected}?"));
                }
            }
            TrackerError::IssueNotFound { .. } => {
                return Some("Run 'ih issue list <project>' to see available issues.".to_string());
            }
            _ => {}
        }
        err.suggestion().map(ToString::to_string)
    }
}

const VALID_STATUSES: [&str; 4] = ["OPEN", "IN_PROGRESS", "DONE", "CLOSED"];
const VALID_PRIORITIES: [&str; 4] = ["LOW", "MEDIUM", "HIGH", "URGENT"];

const STATUS_SYNONYMS: &[(&str, &str)] = &[
    ("complete", "DONE"),
    ("completed", "DONE"),
    ("finished", "DONE"),
    ("resolved", "DONE"),
    ("fixed", "DONE"),
    ("wontfix", "CLOSED"),
    ("cancelled", "CLOSED"),
    ("canceled", "CLOSED"),
    ("rejected", "CLOSED"),
    ("wip", "IN_PROGRESS"),
    ("working", "IN_PROGRESS"),
    ("active", "IN_PROGRESS"),
    ("started", "IN_PROGRESS"),
    ("doing", "IN_PROGRESS"),
    ("new", "OPEN"),
    ("todo", "OPEN"),
    ("pending", "OPEN"),
    ("backlog", "OPEN"),
];

const PRIORITY_SYNONYMS: &[(&str, &str)] = &[
    ("critical", "URGENT"),
    ("crit", "URGENT"),
    ("highest", "URGENT"),
    ("blocker", "URGENT"),
    ("p0", "URGENT"),
    ("important", "HIGH"),
    ("p1", "HIGH"),
    ("normal", "MEDIUM"),
    ("default", "MEDIUM"),
    ("med", "MEDIUM"),
    ("p2", "MEDIUM"),
    ("minor", "LOW"),
    ("trivial", "LOW"),
    ("lowest", "LOW"),
    ("p3", "LOW"),
    ("p4", "LOW"),
];

fn detect_intent(
    input: &str,
    canonical: &[&'static str],
    synonyms: &[(&str, &'static str)],
) -> Option<&'static str> {
    let lower = input.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }
    let token = lower.replace(['-', ' '], "_");

    if let Some(found) = canonical
        .iter()
        .find(|value| value.eq_ignore_ascii_case(&token))
    {
        return Some(*found);
    }

    if let Some((_, found)) = synonyms.iter().find(|(alias, _)| *alias == lower) {
        return Some(*found);
    }

    canonical
        .iter()
        .find(|value| value.to_lowercase().starts_with(&token))
        .copied()
}

fn detect_status_intent(input: &str) -> Option<&'static str> {
    detect_intent(input, &VALID_STATUSES, STATUS_SYNONYMS)
}

fn detect_priority_intent(input: &str) -> Option<&'static str> {
    detect_intent(input, &VALID_PRIORITIES, PRIORITY_SYNONYMS)
}

fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut row = vec![0; b_chars.len() + 1];

    for (i, a_char) in a_chars.iter().enumerate() {
        row[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            row[j + 1] = (prev[j + 1] + 1).min(row[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut row);
    }

    prev[b_chars.len()]
}

/// Candidates within edit distance 3 of `searched`, closest first.
pub fn find_similar(searched: &str, existing: &[String], max_suggestions: usize) -> Vec<String> {
    let mut candidates: Vec<(usize, &str)> = existing
        .iter()
        .map(|candidate| (levenshtein_distance(searched, candidate), candidate.as_str()))
        .filter(|(dist, _)| *dist <= 3)
        .collect();

    candidates.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));

    candidates
        .into_iter()
        .take(max_suggestions)
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}
