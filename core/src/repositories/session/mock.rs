//! Mock implementation of SessionStore for testing

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::domain::entities::session::SessionRecord;
use crate::errors::DomainResult;

use super::r#trait::SessionStore;

/// In-memory session store with lazy TTL expiry, mirroring Redis semantics
///
/// Clones share the same underlying state, so tests can keep a handle for
/// inspection after handing the store to a manager.
#[derive(Clone)]
pub struct MockSessionStore {
    sessions: Arc<RwLock<HashMap<String, (SessionRecord, DateTime<Utc>)>>>,
    user_index: Arc<RwLock<HashMap<String, HashSet<String>>>>,
}

impl MockSessionStore {
    /// Create a new empty mock store
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            user_index: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Whether a session is present in the user's index (test inspection)
    pub async fn user_index_contains(&self, user_id: &str, session_id: &str) -> bool {
        self.user_index
            .read()
            .await
            .get(user_id)
            .map(|set| set.contains(session_id))
            .unwrap_or(false)
    }

    /// Size of the user's index including stale entries (test inspection)
    pub async fn user_index_len(&self, user_id: &str) -> usize {
        self.user_index
            .read()
            .await
            .get(user_id)
            .map(|set| set.len())
            .unwrap_or(0)
    }
}

impl Default for MockSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MockSessionStore {
    async fn save(&self, record: &SessionRecord, ttl_seconds: u64) -> DomainResult<()> {
        let expires_at = Utc::now() + Duration::seconds(ttl_seconds as i64);
        self.sessions
            .write()
            .await
            .insert(record.session_id.clone(), (record.clone(), expires_at));
        Ok(())
    }

    async fn find(&self, session_id: &str) -> DomainResult<Option<SessionRecord>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(session_id)
            .filter(|(_, expires_at)| *expires_at > Utc::now())
            .map(|(record, _)| record.clone()))
    }

    async fn delete(&self, session_id: &str) -> DomainResult<bool> {
        Ok(self.sessions.write().await.remove(session_id).is_some())
    }

    async fn add_to_user_index(&self, user_id: &str, session_id: &str) -> DomainResult<()> {
        self.user_index
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .insert(session_id.to_string());
        Ok(())
    }

    async fn remove_from_user_index(&self, user_id: &str, session_id: &str) -> DomainResult<()> {
        if let Some(set) = self.user_index.write().await.get_mut(user_id) {
            set.remove(session_id);
        }
        Ok(())
    }

    async fn user_session_ids(&self, user_id: &str) -> DomainResult<Vec<String>> {
        Ok(self
            .user_index
            .read()
            .await
            .get(user_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn all_session_ids(&self) -> DomainResult<Vec<String>> {
        let now = Utc::now();
        Ok(self
            .sessions
            .read()
            .await
            .iter()
            .filter(|(_, (_, expires_at))| *expires_at > now)
            .map(|(id, _)| id.clone())
            .collect())
    }
}
