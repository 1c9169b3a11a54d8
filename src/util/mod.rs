//! Shared utilities for `issuehub`.
//!
//! - ID generation (SHA256, base36)
//! - Slug derivation and disambiguation
//! - Timestamp storage and display formatting

pub mod id;
pub mod slug;
pub mod time;

pub use id::{IdGenerator, base36_encode, compute_id_hash};
pub use slug::{disambiguate, slugify};
pub use time::{format_date, format_relative, to_db_timestamp};
