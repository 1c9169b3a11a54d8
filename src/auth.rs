//! Caller identity.
//!
//! Every action receives an [`AuthContext`] explicitly. Nothing is read from
//! ambient request state.

use crate::error::{Result, TrackerError};

/// Identity as supplied by the embedding layer (CLI config, a web session, a test).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Option<String>,
    pub org_id: Option<String>,
}

/// A resolved caller: both identifiers present and non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub org_id: String,
}

impl AuthContext {
    #[must_use]
    pub fn new(user_id: impl Into<String>, org_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            org_id: Some(org_id.into()),
        }
    }

    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            user_id: None,
            org_id: None,
        }
    }

    /// Resolve the caller, failing with `Unauthorized` if either id is missing.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Unauthorized` when the user or the organization
    /// is absent or blank.
    pub fn require(&self) -> Result<Caller> {
        let user_id = non_blank(self.user_id.as_deref()).ok_or(TrackerError::Unauthorized)?;
        let org_id = non_blank(self.org_id.as_deref()).ok_or(TrackerError::Unauthorized)?;
        Ok(Caller {
            user_id: user_id.to_string(),
            org_id: org_id.to_string(),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_resolves_both_ids() {
        let caller = AuthContext::new("user_1", "org_1").require().unwrap();
        assert_eq!(caller.user_id, "user_1");
        assert_eq!(caller.org_id, "org_1");
    }

    #[test]
    fn missing_or_blank_ids_are_unauthorized() {
        let cases = [
            AuthContext::anonymous(),
            AuthContext {
                user_id: Some("u".to_string()),
                org_id: None,
            },
            AuthContext {
                user_id: None,
                org_id: Some("o".to_string()),
            },
            AuthContext::new("  ", "org"),
            AuthContext::new("user", ""),
        ];
        for ctx in cases {
            assert!(matches!(ctx.require(), Err(TrackerError::Unauthorized)));
        }
    }
}
