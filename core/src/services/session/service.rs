//! Session facade composing tokens and sessions for request handlers

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;
use tracing::{info, warn};

use crate::domain::entities::session::NewSession;
use crate::domain::entities::token::ClientInfo;
use crate::domain::value_objects::session_bundle::{
    RefreshBundle, SessionBundle, SessionInfo, SESSION_DATA_ROLES, SESSION_DATA_USERNAME,
};
use crate::errors::{DomainError, DomainResult, SessionError, ValidationError};
use crate::repositories::{SessionStore, TokenStore};
use crate::services::session::SessionManager;
use crate::services::token::TokenManager;

/// The single entry point consumed by HTTP request handlers
///
/// Composes the token manager and session manager into atomic-feeling
/// operations and owns the cross-store consistency policy: the session's
/// `session_id` matches the access token's `jti`, so one lookup key serves
/// both stores.
///
/// Constructed once at process startup and passed by handle to all
/// consumers; there is no global instance.
pub struct SessionService<T: TokenStore, S: SessionStore> {
    tokens: Arc<TokenManager<T>>,
    sessions: Arc<SessionManager<S>>,
}

impl<T: TokenStore, S: SessionStore> SessionService<T, S> {
    /// Creates a new facade over the given managers
    pub fn new(tokens: Arc<TokenManager<T>>, sessions: Arc<SessionManager<S>>) -> Self {
        Self { tokens, sessions }
    }

    /// Direct access to the token manager
    ///
    /// Callers needing cryptographic guarantees verify tokens here;
    /// [`validate_session`](Self::validate_session) deliberately checks
    /// session liveness only.
    pub fn tokens(&self) -> &TokenManager<T> {
        &self.tokens
    }

    /// Direct access to the session manager
    pub fn sessions(&self) -> &SessionManager<S> {
        &self.sessions
    }

    /// Logs a user in: mints a token pair and creates the session
    ///
    /// Input validation happens before any store I/O. The session is keyed
    /// by the access token's `jti` and carries the username and roles in
    /// its payload; the per-user session cap applies as a side effect of
    /// session creation.
    pub async fn create_session(
        &self,
        user_id: &str,
        username: &str,
        roles: Vec<String>,
        client_info: Option<ClientInfo>,
    ) -> DomainResult<SessionBundle> {
        if user_id.trim().is_empty() {
            return Err(ValidationError::RequiredField {
                field: "user_id".to_string(),
            }
            .into());
        }
        if username.trim().is_empty() {
            return Err(ValidationError::RequiredField {
                field: "username".to_string(),
            }
            .into());
        }

        let pair = self
            .tokens
            .issue_pair(user_id, username, &roles, client_info.clone())
            .await?;

        let mut data = HashMap::new();
        data.insert(
            SESSION_DATA_USERNAME.to_string(),
            serde_json::json!(username),
        );
        data.insert(SESSION_DATA_ROLES.to_string(), serde_json::json!(roles));

        let params = NewSession {
            session_id: Some(pair.access_jti.clone()),
            user_id: user_id.to_string(),
            user_agent: client_info.as_ref().and_then(|c| c.user_agent.clone()),
            ip_address: client_info.as_ref().and_then(|c| c.ip_address.clone()),
            ttl_seconds: None,
            data,
        };
        let record = self.sessions.create(params).await.map_err(|e| {
            warn!(user_id = %user_id, error = %e, "Session creation failed after minting tokens");
            DomainError::Session(SessionError::SessionCreationFailed {
                message: e.to_string(),
            })
        })?;

        info!(user_id = %user_id, session_id = %record.session_id, "Session created");
        Ok(SessionBundle {
            session_id: record.session_id,
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: pair.token_type,
            expires_in: pair.expires_in,
            user_id: user_id.to_string(),
            username: username.to_string(),
            roles,
        })
    }

    /// Checks session liveness and returns a flattened view
    ///
    /// Touches the session on a live hit. Does **not** re-verify the JWT:
    /// session liveness and token cryptographic validity are separate
    /// concerns, checked separately.
    pub async fn validate_session(&self, session_id: &str) -> DomainResult<Option<SessionInfo>> {
        let Some(record) = self.sessions.get(session_id).await? else {
            return Ok(None);
        };
        Ok(Some(SessionInfo::from_record(&record)))
    }

    /// Extends a session's expiry by the given number of hours
    pub async fn extend_session(&self, session_id: &str, hours: i64) -> DomainResult<bool> {
        self.sessions
            .extend(session_id, Duration::hours(hours))
            .await
    }

    /// Destroys a session
    ///
    /// Idempotent: destroying a nonexistent session is not an error — the
    /// absent state is the desired end state.
    pub async fn destroy_session(&self, session_id: &str) -> DomainResult<bool> {
        self.sessions.revoke(session_id).await
    }

    /// Destroys all of a user's sessions, optionally sparing one
    pub async fn destroy_all_for_user(
        &self,
        user_id: &str,
        except_session_id: Option<&str>,
    ) -> DomainResult<usize> {
        self.sessions
            .revoke_all_for_user(user_id, except_session_id)
            .await
    }

    /// Exchanges a refresh token for a new access token
    ///
    /// Returns `Ok(None)` on any verification failure, including a token
    /// whose scope is not `refresh`. The identity fields in the bundle are
    /// carried over from the refresh token's claims.
    pub async fn refresh_tokens(&self, refresh_token: &str) -> DomainResult<Option<RefreshBundle>> {
        let Some(grant) = self.tokens.refresh(refresh_token, None).await? else {
            warn!("Token refresh rejected");
            return Ok(None);
        };

        Ok(Some(RefreshBundle {
            access_token: grant.access_token,
            token_type: grant.token_type,
            expires_in: grant.expires_in,
            user_id: grant.claims.user_id,
            username: grant.claims.username,
            roles: grant.claims.roles,
        }))
    }
}
