//! Persisted long-lived auth token record.

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// The single credential record the gateway persists between runs.
///
/// At most one record exists at a time; saving a new one replaces the old
/// atomically. The backend client holds a transient copy of `token` for
/// request signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    /// Opaque long-lived token issued by the backend.
    pub token: String,
    /// Permission level granted by the human ("read", "write" or "delete").
    pub perms: String,
    /// Backend user id the token is bound to.
    pub user_id: String,
    /// Backend username, for status display.
    pub username: String,
    /// Unix seconds when the record was first written.
    pub created_at: u64,
    /// Unix seconds when the record was last overwritten.
    pub updated_at: u64,
}

impl AuthToken {
    /// Create a fresh record stamped with the current time.
    pub fn new(
        token: impl Into<String>,
        perms: impl Into<String>,
        user_id: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        let now = unix_now();
        Self {
            token: token.into(),
            perms: perms.into(),
            user_id: user_id.into(),
            username: username.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Bump `updated_at` to the current time, keeping `created_at`.
    #[must_use]
    pub fn touched(mut self) -> Self {
        self.updated_at = unix_now();
        self
    }

    /// Metadata view of this record, without the secret itself.
    #[must_use]
    pub fn info(&self) -> TokenInfo {
        TokenInfo {
            perms: self.perms.clone(),
            user_id: self.user_id.clone(),
            username: self.username.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// What `inspect` exposes about the stored record: everything but the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub perms: String,
    pub user_id: String,
    pub username: String,
    pub created_at: u64,
    pub updated_at: u64,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs()
}
