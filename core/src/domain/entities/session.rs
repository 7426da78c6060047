//! Session entities for application-level session tracking.
//!
//! A session is a record of a logged-in client, independent of any single
//! token's lifetime. Sessions are tracked in their own store and linked to
//! tokens only through the shared `user_id` (and, by convention, the access
//! token's `jti` doubling as the `session_id`).

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Default session lifetime in seconds (2 hours)
pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 7200;

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Expired,
    Revoked,
    Inactive,
}

/// Stored session record, keyed by `session_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Opaque session identifier
    pub session_id: String,

    /// User this session belongs to
    pub user_id: String,

    /// User agent string reported at login
    pub user_agent: Option<String>,

    /// Client IP address at login
    pub ip_address: Option<String>,

    /// Timestamp when the session was created
    pub created_at: DateTime<Utc>,

    /// Timestamp of the most recent access (monotonically non-decreasing)
    pub last_accessed: DateTime<Utc>,

    /// Timestamp when the session expires
    pub expires_at: DateTime<Utc>,

    /// Lifecycle state
    pub status: SessionStatus,

    /// Caller-defined session payload
    #[serde(default)]
    pub data: HashMap<String, JsonValue>,
}

impl SessionRecord {
    /// Creates a new active session expiring `ttl_seconds` from now
    pub fn new(
        session_id: impl Into<String>,
        user_id: impl Into<String>,
        user_agent: Option<String>,
        ip_address: Option<String>,
        ttl_seconds: u64,
        data: HashMap<String, JsonValue>,
    ) -> Self {
        let now = Utc::now();

        Self {
            session_id: session_id.into(),
            user_id: user_id.into(),
            user_agent,
            ip_address,
            created_at: now,
            last_accessed: now,
            expires_at: now + Duration::seconds(ttl_seconds as i64),
            status: SessionStatus::Active,
            data,
        }
    }

    /// Checks if the session has passed its expiry
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Updates `last_accessed` to now, never moving it backwards
    pub fn touch(&mut self) {
        let now = Utc::now();
        if now > self.last_accessed {
            self.last_accessed = now;
        }
    }

    /// Seconds until the session expires, zero if already expired
    pub fn remaining_ttl_seconds(&self) -> u64 {
        let remaining = (self.expires_at - Utc::now()).num_seconds();
        remaining.max(0) as u64
    }

    /// Merges a patch into the session's `data` map
    pub fn merge_data(&mut self, patch: HashMap<String, JsonValue>) {
        self.data.extend(patch);
    }

    /// Pushes `expires_at` further into the future
    pub fn extend(&mut self, duration: Duration) {
        self.expires_at += duration;
    }
}

/// Parameters for creating a new session
#[derive(Debug, Clone, Default)]
pub struct NewSession {
    /// Explicit session identifier; generated when absent
    pub session_id: Option<String>,

    /// User the session belongs to
    pub user_id: String,

    /// User agent string reported by the client
    pub user_agent: Option<String>,

    /// Client IP address
    pub ip_address: Option<String>,

    /// Session lifetime in seconds; the store default when absent
    pub ttl_seconds: Option<u64>,

    /// Initial session payload
    pub data: HashMap<String, JsonValue>,
}

impl NewSession {
    /// Creates session parameters for the given user
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    /// Sets an explicit session identifier
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Sets an explicit session lifetime
    pub fn with_ttl_seconds(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = Some(ttl_seconds);
        self
    }

    /// Resolves the session identifier, generating one when absent
    pub fn session_id_or_generate(&self) -> String {
        self.session_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }
}
