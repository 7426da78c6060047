//! Session and token bundles returned by the session facade.

use serde::{Deserialize, Serialize};

use crate::domain::entities::session::SessionRecord;

/// Session-data key holding the username
pub const SESSION_DATA_USERNAME: &str = "username";

/// Session-data key holding the role names
pub const SESSION_DATA_ROLES: &str = "roles";

/// Everything a client receives after a successful login
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionBundle {
    /// Session identifier (matches the access token's `jti`)
    pub session_id: String,

    /// JWT access token for API authentication
    pub access_token: String,

    /// JWT refresh token for obtaining new access tokens
    pub refresh_token: String,

    /// Token type (always "Bearer")
    pub token_type: String,

    /// Access token expiration time in seconds
    pub expires_in: i64,

    /// User the session belongs to
    pub user_id: String,

    /// Username at login time
    pub username: String,

    /// Role names at login time
    pub roles: Vec<String>,
}

/// Flattened view of a live session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionInfo {
    /// Session identifier
    pub session_id: String,

    /// User the session belongs to
    pub user_id: String,

    /// Username stored in the session payload
    pub username: String,

    /// Role names stored in the session payload
    pub roles: Vec<String>,
}

impl SessionInfo {
    /// Flattens a session record, pulling identity fields out of its payload
    pub fn from_record(record: &SessionRecord) -> Self {
        let username = record
            .data
            .get(SESSION_DATA_USERNAME)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let roles = record
            .data
            .get(SESSION_DATA_ROLES)
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();

        Self {
            session_id: record.session_id.clone(),
            user_id: record.user_id.clone(),
            username,
            roles,
        }
    }
}

/// New access token plus carried-over session identity fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefreshBundle {
    /// JWT access token for API authentication
    pub access_token: String,

    /// Token type (always "Bearer")
    pub token_type: String,

    /// Access token expiration time in seconds
    pub expires_in: i64,

    /// User the token belongs to
    pub user_id: String,

    /// Username carried from the refresh token
    pub username: String,

    /// Role names carried from the refresh token
    pub roles: Vec<String>,
}
