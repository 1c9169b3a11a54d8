//! `issuehub` - multi-tenant issue tracker core.
//!
//! Organizations own projects, projects own sequentially numbered issues,
//! and every notable issue change lands in an append-only activity log.
//!
//! The crate is split the same way the `ih` binary uses it:
//! - [`actions`] - tenant-scoped mutation and query actions (the public API)
//! - [`storage`] - `SQLite` persistence and the transaction protocol
//! - [`model`] - core data types
//! - [`validation`] - input validators
//! - [`format`] - presentation helpers (activity messages, display descriptors)
//! - [`cli`] / [`config`] / [`logging`] - the command-line surface

pub mod actions;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod model;
pub mod revalidate;
pub mod storage;
pub mod util;
pub mod validation;

pub use actions::Tracker;
pub use auth::{AuthContext, Caller};
pub use error::{ErrorCode, Result, StructuredError, TrackerError};
