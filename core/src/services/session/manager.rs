//! Store-backed session lifecycle management

use chrono::Duration;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::domain::entities::session::{NewSession, SessionRecord};
use crate::errors::DomainResult;
use crate::repositories::SessionStore;

use super::config::SessionManagerConfig;

/// Session counts reported by [`SessionManager::stats`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    /// All tracked sessions, live or pending lazy expiry
    pub total: usize,
    /// Sessions whose expiry is still in the future
    pub active: usize,
    /// Sessions past expiry that have not yet been swept
    pub expired: usize,
    /// Configured per-user concurrency cap
    pub max_sessions_per_user: usize,
    /// Configured default session lifetime in seconds
    pub default_ttl_seconds: u64,
}

/// Manages application sessions against a [`SessionStore`]
///
/// Expiry is lazy: an expired record is revoked when a lookup sees it, and
/// [`cleanup_expired`](Self::cleanup_expired) is the proactive sweep
/// companion. The per-user index is treated as a cache — lookups through it
/// re-validate against the primary record and self-heal dead entries.
pub struct SessionManager<S: SessionStore> {
    store: S,
    config: SessionManagerConfig,
}

impl<S: SessionStore> SessionManager<S> {
    /// Creates a new session manager
    pub fn new(store: S, config: SessionManagerConfig) -> Self {
        Self { store, config }
    }

    /// Access to the session configuration
    pub fn config(&self) -> &SessionManagerConfig {
        &self.config
    }

    /// Creates a session and enforces the per-user concurrency cap
    ///
    /// The caller may supply an explicit `session_id` (the facade passes
    /// the access token's `jti`); otherwise one is generated. Sessions
    /// beyond the cap are evicted oldest-`last_accessed`-first.
    pub async fn create(&self, params: NewSession) -> DomainResult<SessionRecord> {
        let ttl_seconds = params
            .ttl_seconds
            .unwrap_or(self.config.default_ttl_seconds);
        let session_id = params.session_id_or_generate();

        let record = SessionRecord::new(
            session_id,
            params.user_id,
            params.user_agent,
            params.ip_address,
            ttl_seconds,
            params.data,
        );

        self.store.save(&record, ttl_seconds).await?;
        self.store
            .add_to_user_index(&record.user_id, &record.session_id)
            .await?;

        let evicted = self.enforce_session_cap(&record.user_id).await?;
        if evicted > 0 {
            warn!(
                user_id = %record.user_id,
                evicted = evicted,
                max = self.config.max_sessions_per_user,
                "Evicted sessions over the per-user cap"
            );
        }

        debug!(
            session_id = %record.session_id,
            user_id = %record.user_id,
            ttl_seconds = ttl_seconds,
            "Session created"
        );
        Ok(record)
    }

    /// Fetches a live session, touching its `last_accessed`
    ///
    /// Lazy expiry: a record past its `expires_at` is revoked on sight and
    /// reported as absent. A live hit persists the touch with the
    /// remaining TTL, never extending expiry.
    pub async fn get(&self, session_id: &str) -> DomainResult<Option<SessionRecord>> {
        let Some(mut record) = self.store.find(session_id).await? else {
            return Ok(None);
        };

        if record.is_expired() {
            debug!(session_id = %session_id, "Lazily revoking expired session");
            self.revoke(session_id).await?;
            return Ok(None);
        }

        record.touch();
        self.store
            .save(&record, record.remaining_ttl_seconds().max(1))
            .await?;
        Ok(Some(record))
    }

    /// Merges a patch into a session's `data` map
    ///
    /// Re-touches `last_accessed` but preserves the existing expiry.
    pub async fn update(
        &self,
        session_id: &str,
        patch: HashMap<String, JsonValue>,
    ) -> DomainResult<bool> {
        let Some(mut record) = self.get(session_id).await? else {
            return Ok(false);
        };

        record.merge_data(patch);
        record.touch();
        self.store
            .save(&record, record.remaining_ttl_seconds().max(1))
            .await?;
        Ok(true)
    }

    /// Pushes a session's expiry further into the future
    pub async fn extend(&self, session_id: &str, duration: Duration) -> DomainResult<bool> {
        let Some(mut record) = self.get(session_id).await? else {
            return Ok(false);
        };

        record.extend(duration);
        self.store
            .save(&record, record.remaining_ttl_seconds().max(1))
            .await?;
        debug!(session_id = %session_id, "Session extended");
        Ok(true)
    }

    /// Removes a session and its index entry
    ///
    /// Idempotent: succeeds whether or not the session existed — the
    /// absent state is the desired end state. When the record is already
    /// gone the index entry cannot be located and is left for read-through
    /// self-healing.
    pub async fn revoke(&self, session_id: &str) -> DomainResult<bool> {
        if let Some(record) = self.store.find(session_id).await? {
            self.store.delete(session_id).await?;
            self.store
                .remove_from_user_index(&record.user_id, session_id)
                .await?;
            debug!(session_id = %session_id, user_id = %record.user_id, "Session revoked");
        } else {
            self.store.delete(session_id).await?;
        }
        Ok(true)
    }

    /// Revokes all of a user's sessions, optionally sparing one
    ///
    /// Supports "log out everywhere but here". Returns the number of
    /// sessions actually removed.
    pub async fn revoke_all_for_user(
        &self,
        user_id: &str,
        except_session_id: Option<&str>,
    ) -> DomainResult<usize> {
        let ids = self.store.user_session_ids(user_id).await?;
        let mut revoked = 0;

        for session_id in &ids {
            if Some(session_id.as_str()) == except_session_id {
                continue;
            }
            if self.store.delete(session_id).await? {
                revoked += 1;
            }
            self.store
                .remove_from_user_index(user_id, session_id)
                .await?;
        }

        info!(user_id = %user_id, count = revoked, "Revoked user sessions");
        Ok(revoked)
    }

    /// Lists a user's live sessions, self-healing stale index entries
    pub async fn get_user_sessions(&self, user_id: &str) -> DomainResult<Vec<SessionRecord>> {
        self.live_user_sessions(user_id).await
    }

    /// Proactively sweeps expired sessions
    ///
    /// Scans every session key and lazily revokes the expired ones; the
    /// sweep companion to [`get`](Self::get).
    pub async fn cleanup_expired(&self) -> DomainResult<usize> {
        let ids = self.store.all_session_ids().await?;
        let mut removed = 0;

        for session_id in &ids {
            if let Some(record) = self.store.find(session_id).await? {
                if record.is_expired() {
                    self.revoke(session_id).await?;
                    removed += 1;
                }
            }
        }

        if removed > 0 {
            info!(removed = removed, "Swept expired sessions");
        }
        Ok(removed)
    }

    /// Session counts and configuration knobs
    pub async fn stats(&self) -> DomainResult<SessionStats> {
        let ids = self.store.all_session_ids().await?;
        let mut active = 0;
        let mut expired = 0;

        for session_id in &ids {
            if let Some(record) = self.store.find(session_id).await? {
                if record.is_expired() {
                    expired += 1;
                } else {
                    active += 1;
                }
            }
        }

        Ok(SessionStats {
            total: active + expired,
            active,
            expired,
            max_sessions_per_user: self.config.max_sessions_per_user,
            default_ttl_seconds: self.config.default_ttl_seconds,
        })
    }

    /// Evicts sessions beyond the per-user cap, oldest-accessed first
    async fn enforce_session_cap(&self, user_id: &str) -> DomainResult<usize> {
        let mut live = self.live_user_sessions(user_id).await?;
        if live.len() <= self.config.max_sessions_per_user {
            return Ok(0);
        }

        // Most recently accessed first; everything past the cap goes
        live.sort_by(|a, b| b.last_accessed.cmp(&a.last_accessed));
        let mut evicted = 0;
        for record in &live[self.config.max_sessions_per_user..] {
            self.revoke(&record.session_id).await?;
            evicted += 1;
        }
        Ok(evicted)
    }

    /// Live session records reachable through the user's index
    ///
    /// Index entries whose primary record is gone are dropped from the
    /// index on sight; entries whose record has expired are revoked.
    async fn live_user_sessions(&self, user_id: &str) -> DomainResult<Vec<SessionRecord>> {
        let ids = self.store.user_session_ids(user_id).await?;
        let mut live = Vec::with_capacity(ids.len());

        for session_id in &ids {
            match self.store.find(session_id).await? {
                Some(record) if record.is_expired() => {
                    self.revoke(session_id).await?;
                }
                Some(record) => live.push(record),
                None => {
                    debug!(
                        session_id = %session_id,
                        user_id = %user_id,
                        "Dropping dead session index entry"
                    );
                    self.store
                        .remove_from_user_index(user_id, session_id)
                        .await?;
                }
            }
        }

        Ok(live)
    }
}
