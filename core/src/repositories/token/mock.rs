//! Mock implementation of TokenStore for testing

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use tokio::sync::RwLock;

use crate::domain::entities::security_event::SecurityEvent;
use crate::domain::entities::token::{BlacklistEntry, TokenRecord, TokenScope};
use crate::errors::DomainResult;

use super::r#trait::TokenStore;

/// In-memory token store with lazy TTL expiry, mirroring Redis semantics
///
/// Clones share the same underlying state, so tests can keep a handle for
/// inspection after handing the store to a manager.
#[derive(Clone)]
pub struct MockTokenStore {
    records: Arc<RwLock<HashMap<String, (TokenRecord, DateTime<Utc>)>>>,
    blacklist: Arc<RwLock<HashMap<String, (BlacklistEntry, DateTime<Utc>)>>>,
    user_index: Arc<RwLock<HashMap<String, HashSet<String>>>>,
    type_index: Arc<RwLock<HashMap<TokenScope, HashSet<String>>>>,
    last_used: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
    events: Arc<RwLock<HashMap<NaiveDate, Vec<SecurityEvent>>>>,
}

impl MockTokenStore {
    /// Create a new empty mock store
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            blacklist: Arc::new(RwLock::new(HashMap::new())),
            user_index: Arc::new(RwLock::new(HashMap::new())),
            type_index: Arc::new(RwLock::new(HashMap::new())),
            last_used: Arc::new(RwLock::new(HashMap::new())),
            events: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of live blacklist entries (test inspection)
    pub async fn blacklist_len(&self) -> usize {
        let now = Utc::now();
        self.blacklist
            .read()
            .await
            .values()
            .filter(|(_, expires_at)| *expires_at > now)
            .count()
    }

    /// Events recorded for a calendar day (test inspection)
    pub async fn events_on(&self, day: NaiveDate) -> Vec<SecurityEvent> {
        self.events
            .read()
            .await
            .get(&day)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether a `jti` is present in the user's index (test inspection)
    pub async fn user_index_contains(&self, user_id: &str, jti: &str) -> bool {
        self.user_index
            .read()
            .await
            .get(user_id)
            .map(|set| set.contains(jti))
            .unwrap_or(false)
    }

    /// Whether the "last used" marker exists for a `jti` (test inspection)
    pub async fn last_used_exists(&self, jti: &str) -> bool {
        self.last_used.read().await.contains_key(jti)
    }
}

impl Default for MockTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenStore for MockTokenStore {
    async fn save_record(&self, record: &TokenRecord, ttl_seconds: u64) -> DomainResult<()> {
        let expires_at = Utc::now() + Duration::seconds(ttl_seconds as i64);
        self.records
            .write()
            .await
            .insert(record.jti.clone(), (record.clone(), expires_at));
        Ok(())
    }

    async fn find_record(&self, jti: &str) -> DomainResult<Option<TokenRecord>> {
        let records = self.records.read().await;
        Ok(records
            .get(jti)
            .filter(|(_, expires_at)| *expires_at > Utc::now())
            .map(|(record, _)| record.clone()))
    }

    async fn delete_record(&self, jti: &str) -> DomainResult<bool> {
        Ok(self.records.write().await.remove(jti).is_some())
    }

    async fn save_blacklist_entry(
        &self,
        jti: &str,
        entry: &BlacklistEntry,
        ttl_seconds: u64,
    ) -> DomainResult<()> {
        let expires_at = Utc::now() + Duration::seconds(ttl_seconds as i64);
        self.blacklist
            .write()
            .await
            .insert(jti.to_string(), (entry.clone(), expires_at));
        Ok(())
    }

    async fn is_blacklisted(&self, jti: &str) -> DomainResult<bool> {
        let blacklist = self.blacklist.read().await;
        Ok(blacklist
            .get(jti)
            .map(|(_, expires_at)| *expires_at > Utc::now())
            .unwrap_or(false))
    }

    async fn add_to_user_index(&self, user_id: &str, jti: &str) -> DomainResult<()> {
        self.user_index
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .insert(jti.to_string());
        Ok(())
    }

    async fn remove_from_user_index(&self, user_id: &str, jti: &str) -> DomainResult<()> {
        if let Some(set) = self.user_index.write().await.get_mut(user_id) {
            set.remove(jti);
        }
        Ok(())
    }

    async fn user_token_ids(&self, user_id: &str) -> DomainResult<Vec<String>> {
        Ok(self
            .user_index
            .read()
            .await
            .get(user_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn clear_user_index(&self, user_id: &str) -> DomainResult<()> {
        self.user_index.write().await.remove(user_id);
        Ok(())
    }

    async fn add_to_type_index(&self, scope: TokenScope, jti: &str) -> DomainResult<()> {
        self.type_index
            .write()
            .await
            .entry(scope)
            .or_default()
            .insert(jti.to_string());
        Ok(())
    }

    async fn remove_from_type_index(&self, scope: TokenScope, jti: &str) -> DomainResult<()> {
        if let Some(set) = self.type_index.write().await.get_mut(&scope) {
            set.remove(jti);
        }
        Ok(())
    }

    async fn count_by_type(&self, scope: TokenScope) -> DomainResult<usize> {
        Ok(self
            .type_index
            .read()
            .await
            .get(&scope)
            .map(|set| set.len())
            .unwrap_or(0))
    }

    async fn touch_last_used(&self, jti: &str, _ttl_seconds: u64) -> DomainResult<()> {
        self.last_used
            .write()
            .await
            .insert(jti.to_string(), Utc::now());
        Ok(())
    }

    async fn record_security_event(&self, event: &SecurityEvent) -> DomainResult<()> {
        self.events
            .write()
            .await
            .entry(event.day())
            .or_default()
            .push(event.clone());
        Ok(())
    }

    async fn delete_security_events_on(&self, day: NaiveDate) -> DomainResult<bool> {
        Ok(self.events.write().await.remove(&day).is_some())
    }
}
