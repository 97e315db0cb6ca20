// ABOUTME: Type definitions for identity tokens
// ABOUTME: Stored token records and the one-time generation result

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity token stored in database (hash only, never the secret)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiToken {
    pub id: String,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub name: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl ApiToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires_at) if expires_at <= now)
    }

    /// Active and not past its expiry
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired(now)
    }
}

/// Token generation result.
/// This is the only time the plaintext token is available.
#[derive(Debug, Clone)]
pub struct TokenGeneration {
    /// Plaintext secret, shown once
    pub token: String,
    pub record: ApiToken,
}
