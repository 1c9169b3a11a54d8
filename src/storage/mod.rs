//! `SQLite` persistence for projects, issues and their activity log.

pub mod activities;
pub mod schema;
pub mod sqlite;

pub use activities::DEFAULT_ACTIVITY_LIMIT;
pub use sqlite::{
    DEFAULT_LOCK_TIMEOUT_MS, MutationContext, NewIssue, RECENT_ISSUES_LIMIT, ScopedIssue,
    SqliteStorage,
};
