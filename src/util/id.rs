//! ID generation for projects and issues.
//!
//! Format: `<prefix>-<hash>` where hash is base36 lowercase (0-9, a-z)
//! derived from SHA256 of the record's identifying fields.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::error::Result;

pub const PROJECT_PREFIX: &str = "prj";
pub const ISSUE_PREFIX: &str = "iss";

const HASH_LENGTH: usize = 10;
const FALLBACK_HASH_LENGTH: usize = 12;
const MAX_NONCE: u32 = 100;

/// Generates collision-free ids for one record kind.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: &'static str,
}

impl IdGenerator {
    #[must_use]
    pub const fn new(prefix: &'static str) -> Self {
        Self { prefix }
    }

    #[must_use]
    pub const fn projects() -> Self {
        Self::new(PROJECT_PREFIX)
    }

    #[must_use]
    pub const fn issues() -> Self {
        Self::new(ISSUE_PREFIX)
    }

    #[must_use]
    pub const fn prefix(&self) -> &str {
        self.prefix
    }

    /// Candidate id for the given seed parts and nonce.
    #[must_use]
    pub fn candidate(
        &self,
        parts: &[&str],
        created_at: DateTime<Utc>,
        nonce: u32,
        length: usize,
    ) -> String {
        let seed = generate_id_seed(parts, created_at, nonce);
        format!("{}-{}", self.prefix, compute_id_hash(&seed, length))
    }

    /// Generate an id, bumping the nonce while `exists` reports a collision.
    ///
    /// # Errors
    ///
    /// Returns the first error `exists` reports.
    pub fn generate<F>(&self, parts: &[&str], created_at: DateTime<Utc>, exists: F) -> Result<String>
    where
        F: Fn(&str) -> Result<bool>,
    {
        for nonce in 0..MAX_NONCE {
            let id = self.candidate(parts, created_at, nonce, HASH_LENGTH);
            if !exists(&id)? {
                return Ok(id);
            }
        }

        let mut nonce = MAX_NONCE;
        loop {
            let id = self.candidate(parts, created_at, nonce, FALLBACK_HASH_LENGTH);
            if !exists(&id)? {
                return Ok(id);
            }
            nonce += 1;
        }
    }
}

/// Seed string: `part|part|...|created_at (ns)|nonce`.
#[must_use]
pub fn generate_id_seed(parts: &[&str], created_at: DateTime<Utc>, nonce: u32) -> String {
    let mut seed = parts.join("|");
    seed.push('|');
    seed.push_str(&created_at.timestamp_nanos_opt().unwrap_or(0).to_string());
    seed.push('|');
    seed.push_str(&nonce.to_string());
    seed
}

/// Base36 hash of `input`, left-padded with '0' and truncated to `length`.
#[must_use]
pub fn compute_id_hash(input: &str, length: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let result = hasher.finalize();

    let mut num = 0u64;
    for &byte in result.iter().take(8) {
        num = (num << 8) | u64::from(byte);
    }

    let encoded = base36_encode(num);
    let padded = if encoded.len() < length {
        format!("{encoded:0>length$}")
    } else {
        encoded
    };
    padded.chars().take(length).collect()
}

/// Lowercase base36 encoding.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn base36_encode(mut num: u64) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if num == 0 {
        return "0".to_string();
    }
    let mut chars = Vec::new();
    while num > 0 {
        chars.push(ALPHABET[(num % 36) as usize] as char);
        num /= 36;
    }
    chars.into_iter().rev().collect()
}
