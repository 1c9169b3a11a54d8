#![allow(dead_code)]

use issuehub::model::{CreateIssueInput, CreateProjectInput, Issue, Project};
use issuehub::revalidate::{RecordingRevalidator, Revalidate};
use issuehub::storage::SqliteStorage;
use issuehub::{AuthContext, Tracker};
use std::sync::Once;
use std::time::Instant;
use tempfile::TempDir;
use tracing::info;

pub mod cli;

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        issuehub::logging::init_test_logging();
    });
}

pub struct TestLogGuard {
    name: String,
    start: Instant,
}

impl Drop for TestLogGuard {
    fn drop(&mut self) {
        info!(
            "{}: assertions passed (elapsed {:?})",
            self.name,
            self.start.elapsed()
        );
    }
}

pub fn test_log(name: &str) -> TestLogGuard {
    init_test_logging();
    info!("{name}: starting");
    TestLogGuard {
        name: name.to_string(),
        start: Instant::now(),
    }
}

pub fn test_db() -> SqliteStorage {
    init_test_logging();
    SqliteStorage::open_memory().expect("Failed to create test database")
}

pub fn test_db_with_dir() -> (SqliteStorage, TempDir) {
    init_test_logging();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let storage =
        SqliteStorage::open(&dir.path().join("issuehub.db")).expect("Failed to create test database");
    (storage, dir)
}

pub fn tracker() -> Tracker {
    Tracker::new(test_db())
}

pub fn recording_tracker() -> Tracker<RecordingRevalidator> {
    Tracker::with_revalidator(test_db(), RecordingRevalidator::new())
}

/// alice @ acme
pub fn alice() -> AuthContext {
    AuthContext::new("alice", "acme")
}

/// carol @ acme
pub fn carol() -> AuthContext {
    AuthContext::new("carol", "acme")
}

/// bob @ globex, a different tenant
pub fn bob() -> AuthContext {
    AuthContext::new("bob", "globex")
}

pub fn create_project<R: Revalidate>(
    tracker: &mut Tracker<R>,
    auth: &AuthContext,
    name: &str,
) -> Project {
    tracker
        .create_project(
            auth,
            CreateProjectInput {
                name: name.to_string(),
                description: None,
            },
        )
        .expect("create project")
}

pub fn create_issue<R: Revalidate>(
    tracker: &mut Tracker<R>,
    auth: &AuthContext,
    project_id: &str,
    title: &str,
) -> Issue {
    tracker
        .create_issue(
            auth,
            project_id,
            CreateIssueInput {
                title: title.to_string(),
                ..CreateIssueInput::default()
            },
        )
        .expect("create issue")
}
