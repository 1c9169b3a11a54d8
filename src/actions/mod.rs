//! Tenant-scoped actions: the public API of the tracker.
//!
//! Every action takes an [`AuthContext`](crate::auth::AuthContext) first,
//! resolves the caller, validates input, talks to the store, and only after a
//! successful write tells the revalidation sink which views went stale.

mod dashboard;
mod issues;
mod projects;

use tracing::{debug, warn};

use crate::error::Result;
use crate::revalidate::{Invalidation, LogRevalidator, Revalidate};
use crate::storage::SqliteStorage;

/// Attempts a create makes before a `Conflict` reaches the caller.
pub const MAX_CONFLICT_ATTEMPTS: u32 = 3;

/// Entry point for all tracker operations.
#[derive(Debug)]
pub struct Tracker<R: Revalidate = LogRevalidator> {
    storage: SqliteStorage,
    revalidator: R,
}

impl Tracker<LogRevalidator> {
    #[must_use]
    pub const fn new(storage: SqliteStorage) -> Self {
        Self {
            storage,
            revalidator: LogRevalidator,
        }
    }
}

impl<R: Revalidate> Tracker<R> {
    #[must_use]
    pub const fn with_revalidator(storage: SqliteStorage, revalidator: R) -> Self {
        Self {
            storage,
            revalidator,
        }
    }

    #[must_use]
    pub const fn revalidator(&self) -> &R {
        &self.revalidator
    }

    fn emit(&self, invalidations: &[Invalidation]) {
        for invalidation in invalidations {
            self.revalidator.revalidate(invalidation);
        }
        debug!(count = invalidations.len(), "invalidations emitted");
    }
}

/// Re-run `attempt` while it fails with `Conflict`, up to
/// [`MAX_CONFLICT_ATTEMPTS`] attempts in total.
fn retry_on_conflict<T, F>(op: &str, mut attempt: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let mut tries = 1;
    loop {
        match attempt() {
            Err(err) if err.is_conflict() && tries < MAX_CONFLICT_ATTEMPTS => {
                warn!(op, attempt = tries, error = %err, "conflict, retrying");
                tries += 1;
            }
            outcome => return outcome,
        }
    }
}
