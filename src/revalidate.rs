//! Cache-invalidation signals.
//!
//! After a successful write an action tells its [`Revalidate`] sink which
//! rendered views are stale. Nothing is emitted when a write fails.

use std::fmt;
use std::sync::Mutex;

use tracing::debug;

/// A view keyed by path that must be re-rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Invalidation {
    ProjectList,
    Project { slug: String },
    IssueList { slug: String },
    Issue { slug: String, number: i64 },
}

impl Invalidation {
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::ProjectList => "/projects".to_string(),
            Self::Project { slug } => format!("/projects/{slug}"),
            Self::IssueList { slug } => format!("/projects/{slug}/issues"),
            Self::Issue { slug, number } => format!("/projects/{slug}/issues/{number}"),
        }
    }
}

impl fmt::Display for Invalidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Receiver for invalidation signals.
pub trait Revalidate {
    fn revalidate(&self, invalidation: &Invalidation);
}

/// Default sink: logs each signal at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRevalidator;

impl Revalidate for LogRevalidator {
    fn revalidate(&self, invalidation: &Invalidation) {
        debug!(path = %invalidation, "revalidate");
    }
}

/// Records signals in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingRevalidator {
    recorded: Mutex<Vec<Invalidation>>,
}

impl RecordingRevalidator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    #[must_use]
    pub fn recorded(&self) -> Vec<Invalidation> {
        self.recorded
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Drain the recorded signals.
    pub fn take(&self) -> Vec<Invalidation> {
        self.recorded
            .lock()
            .map(|mut guard| std::mem::take(&mut *guard))
            .unwrap_or_default()
    }
}

impl Revalidate for RecordingRevalidator {
    fn revalidate(&self, invalidation: &Invalidation) {
        if let Ok(mut guard) = self.recorded.lock() {
            guard.push(invalidation.clone());
        }
    }
}

impl<R: Revalidate + ?Sized> Revalidate for &R {
    fn revalidate(&self, invalidation: &Invalidation) {
        (**self).revalidate(invalidation);
    }
}

impl<R: Revalidate + ?Sized> Revalidate for std::sync::Arc<R> {
    fn revalidate(&self, invalidation: &Invalidation) {
        (**self).revalidate(invalidation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths() {
        assert_eq!(Invalidation::ProjectList.path(), "/projects");
        assert_eq!(
            Invalidation::Project {
                slug: "my-app".to_string()
            }
            .path(),
            "/projects/my-app"
        );
        assert_eq!(
            Invalidation::IssueList {
                slug: "my-app".to_string()
            }
            .path(),
            "/projects/my-app/issues"
        );
        assert_eq!(
            Invalidation::Issue {
                slug: "my-app".to_string(),
                number: 7
            }
            .to_string(),
            "/projects/my-app/issues/7"
        );
    }

    #[test]
    fn recorder_keeps_order_and_drains() {
        let recorder = RecordingRevalidator::new();
        recorder.revalidate(&Invalidation::ProjectList);
        recorder.revalidate(&Invalidation::Project {
            slug: "a".to_string(),
        });
        assert_eq!(recorder.recorded().len(), 2);
        let drained = recorder.take();
        assert_eq!(drained[0], Invalidation::ProjectList);
        assert!(recorder.recorded().is_empty());
    }
}
