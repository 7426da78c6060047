//! Security event entity for recording token and session lifecycle events.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Event types recorded by the token store
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityEventType {
    TokenRevoked,
    AllTokensRevoked,
}

impl SecurityEventType {
    /// Convert to string representation for storage and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TokenRevoked => "TOKEN_REVOKED",
            Self::AllTokensRevoked => "ALL_TOKENS_REVOKED",
        }
    }
}

/// A single security event, bucketed by calendar day in the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityEvent {
    /// What happened
    pub event_type: SecurityEventType,

    /// User the event concerns
    pub user_id: String,

    /// JWT ID involved, when the event concerns a single token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Caller-supplied reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Number of affected records for aggregate events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,

    /// Timestamp when the event occurred
    pub created_at: DateTime<Utc>,
}

impl SecurityEvent {
    /// Event for a single token revocation
    pub fn token_revoked(
        user_id: impl Into<String>,
        jti: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            event_type: SecurityEventType::TokenRevoked,
            user_id: user_id.into(),
            jti: Some(jti.into()),
            reason: Some(reason.into()),
            count: None,
            created_at: Utc::now(),
        }
    }

    /// Aggregate event for revoking every token a user holds
    pub fn all_tokens_revoked(
        user_id: impl Into<String>,
        count: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            event_type: SecurityEventType::AllTokensRevoked,
            user_id: user_id.into(),
            jti: None,
            reason: Some(reason.into()),
            count: Some(count),
            created_at: Utc::now(),
        }
    }

    /// Calendar day this event belongs to (store bucketing key)
    pub fn day(&self) -> NaiveDate {
        self.created_at.date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_revoked_event() {
        let event = SecurityEvent::token_revoked("u1", "jti-1", "manual_revocation");

        assert_eq!(event.event_type, SecurityEventType::TokenRevoked);
        assert_eq!(event.jti.as_deref(), Some("jti-1"));
        assert_eq!(event.reason.as_deref(), Some("manual_revocation"));
        assert!(event.count.is_none());
    }

    #[test]
    fn test_aggregate_event() {
        let event = SecurityEvent::all_tokens_revoked("u1", 3, "password_change");

        assert_eq!(event.event_type, SecurityEventType::AllTokensRevoked);
        assert_eq!(event.count, Some(3));
        assert!(event.jti.is_none());
    }

    #[test]
    fn test_event_day_bucketing() {
        let event = SecurityEvent::token_revoked("u1", "jti-1", "r");
        assert_eq!(event.day(), Utc::now().date_naive());
    }

    #[test]
    fn test_event_type_serialization() {
        assert_eq!(
            serde_json::to_string(&SecurityEventType::TokenRevoked).unwrap(),
            "\"TOKEN_REVOKED\""
        );
        assert_eq!(SecurityEventType::AllTokensRevoked.as_str(), "ALL_TOKENS_REVOKED");
    }
}
