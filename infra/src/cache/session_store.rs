//! Redis-backed implementation of the session store

use async_trait::async_trait;

use pf_core::domain::entities::session::SessionRecord;
use pf_core::errors::{DomainError, DomainResult};
use pf_core::repositories::SessionStore;

use super::redis_client::RedisClient;

/// Redis key prefix for session records
const SESSION_KEY_PREFIX: &str = "session";

/// Redis key prefix for per-user session indexes
const USER_SESSIONS_KEY_PREFIX: &str = "user_sessions";

/// Session store backed by Redis
///
/// Records rely on per-key TTL for natural expiry; the per-user index set
/// carries no TTL and is healed through reads.
pub struct RedisSessionStore {
    client: RedisClient,
}

impl RedisSessionStore {
    /// Create a new store over an existing Redis client
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    fn session_key(session_id: &str) -> String {
        format!("{}:{}", SESSION_KEY_PREFIX, session_id)
    }

    fn user_sessions_key(user_id: &str) -> String {
        format!("{}:{}", USER_SESSIONS_KEY_PREFIX, user_id)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn save(&self, record: &SessionRecord, ttl_seconds: u64) -> DomainResult<()> {
        let json = serde_json::to_string(record).map_err(|e| DomainError::Store {
            message: format!("Failed to serialize session record: {}", e),
        })?;
        self.client
            .set_with_expiry(&Self::session_key(&record.session_id), &json, ttl_seconds)
            .await?;
        Ok(())
    }

    async fn find(&self, session_id: &str) -> DomainResult<Option<SessionRecord>> {
        match self.client.get(&Self::session_key(session_id)).await? {
            Some(json) => {
                let record = serde_json::from_str(&json).map_err(|e| DomainError::Store {
                    message: format!("Failed to deserialize session record: {}", e),
                })?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, session_id: &str) -> DomainResult<bool> {
        Ok(self.client.delete(&Self::session_key(session_id)).await?)
    }

    async fn add_to_user_index(&self, user_id: &str, session_id: &str) -> DomainResult<()> {
        self.client
            .sadd(&Self::user_sessions_key(user_id), session_id)
            .await?;
        Ok(())
    }

    async fn remove_from_user_index(&self, user_id: &str, session_id: &str) -> DomainResult<()> {
        self.client
            .srem(&Self::user_sessions_key(user_id), session_id)
            .await?;
        Ok(())
    }

    async fn user_session_ids(&self, user_id: &str) -> DomainResult<Vec<String>> {
        Ok(self
            .client
            .smembers(&Self::user_sessions_key(user_id))
            .await?)
    }

    async fn all_session_ids(&self) -> DomainResult<Vec<String>> {
        let pattern = format!("{}:*", SESSION_KEY_PREFIX);
        let prefix = format!("{}:", SESSION_KEY_PREFIX);
        let keys = self.client.scan_keys(&pattern).await?;

        Ok(keys
            .into_iter()
            .filter_map(|key| key.strip_prefix(&prefix).map(|id| id.to_string()))
            .collect())
    }
}
