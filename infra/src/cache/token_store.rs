//! Redis-backed implementation of the token store

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::debug;

use pf_core::domain::entities::security_event::SecurityEvent;
use pf_core::domain::entities::token::{BlacklistEntry, TokenRecord, TokenScope};
use pf_core::errors::{DomainError, DomainResult};
use pf_core::repositories::TokenStore;

use super::redis_client::RedisClient;

/// Redis key prefix for token records
const TOKEN_KEY_PREFIX: &str = "token";

/// Redis key prefix for per-user token indexes
const USER_TOKENS_KEY_PREFIX: &str = "user_tokens";

/// Redis key prefix for per-type metrics indexes
const TOKENS_BY_TYPE_KEY_PREFIX: &str = "tokens_by_type";

/// Redis key prefix for blacklist entries
const BLACKLIST_KEY_PREFIX: &str = "blacklist";

/// Redis key prefix for last-used markers
const TOKEN_LAST_USED_KEY_PREFIX: &str = "token_last_used";

/// Redis key prefix for day-bucketed security events
const SECURITY_EVENTS_KEY_PREFIX: &str = "security_events";

/// Token store backed by Redis
///
/// Primary records and blacklist entries rely on per-key TTL for natural
/// expiry. Index sets carry no TTL; liveness is derived from the primary
/// record, so stale members are harmless and healed on read.
pub struct RedisTokenStore {
    client: RedisClient,
}

impl RedisTokenStore {
    /// Create a new store over an existing Redis client
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    fn token_key(jti: &str) -> String {
        format!("{}:{}", TOKEN_KEY_PREFIX, jti)
    }

    fn user_tokens_key(user_id: &str) -> String {
        format!("{}:{}", USER_TOKENS_KEY_PREFIX, user_id)
    }

    fn type_key(scope: TokenScope) -> String {
        format!("{}:{}", TOKENS_BY_TYPE_KEY_PREFIX, scope.as_str())
    }

    fn blacklist_key(jti: &str) -> String {
        format!("{}:{}", BLACKLIST_KEY_PREFIX, jti)
    }

    fn last_used_key(jti: &str) -> String {
        format!("{}:{}", TOKEN_LAST_USED_KEY_PREFIX, jti)
    }

    fn events_key(day: NaiveDate) -> String {
        format!("{}:{}", SECURITY_EVENTS_KEY_PREFIX, day.format("%Y%m%d"))
    }
}

#[async_trait]
impl TokenStore for RedisTokenStore {
    async fn save_record(&self, record: &TokenRecord, ttl_seconds: u64) -> DomainResult<()> {
        let json = serde_json::to_string(record).map_err(|e| DomainError::Store {
            message: format!("Failed to serialize token record: {}", e),
        })?;
        self.client
            .set_with_expiry(&Self::token_key(&record.jti), &json, ttl_seconds)
            .await?;
        Ok(())
    }

    async fn find_record(&self, jti: &str) -> DomainResult<Option<TokenRecord>> {
        match self.client.get(&Self::token_key(jti)).await? {
            Some(json) => {
                let record = serde_json::from_str(&json).map_err(|e| DomainError::Store {
                    message: format!("Failed to deserialize token record: {}", e),
                })?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn delete_record(&self, jti: &str) -> DomainResult<bool> {
        Ok(self.client.delete(&Self::token_key(jti)).await?)
    }

    async fn save_blacklist_entry(
        &self,
        jti: &str,
        entry: &BlacklistEntry,
        ttl_seconds: u64,
    ) -> DomainResult<()> {
        let json = serde_json::to_string(entry).map_err(|e| DomainError::Store {
            message: format!("Failed to serialize blacklist entry: {}", e),
        })?;
        self.client
            .set_with_expiry(&Self::blacklist_key(jti), &json, ttl_seconds)
            .await?;
        debug!(jti = %jti, "Blacklist entry written");
        Ok(())
    }

    async fn is_blacklisted(&self, jti: &str) -> DomainResult<bool> {
        Ok(self.client.exists(&Self::blacklist_key(jti)).await?)
    }

    async fn add_to_user_index(&self, user_id: &str, jti: &str) -> DomainResult<()> {
        self.client
            .sadd(&Self::user_tokens_key(user_id), jti)
            .await?;
        Ok(())
    }

    async fn remove_from_user_index(&self, user_id: &str, jti: &str) -> DomainResult<()> {
        self.client
            .srem(&Self::user_tokens_key(user_id), jti)
            .await?;
        Ok(())
    }

    async fn user_token_ids(&self, user_id: &str) -> DomainResult<Vec<String>> {
        Ok(self.client.smembers(&Self::user_tokens_key(user_id)).await?)
    }

    async fn clear_user_index(&self, user_id: &str) -> DomainResult<()> {
        self.client.delete(&Self::user_tokens_key(user_id)).await?;
        Ok(())
    }

    async fn add_to_type_index(&self, scope: TokenScope, jti: &str) -> DomainResult<()> {
        self.client.sadd(&Self::type_key(scope), jti).await?;
        Ok(())
    }

    async fn remove_from_type_index(&self, scope: TokenScope, jti: &str) -> DomainResult<()> {
        self.client.srem(&Self::type_key(scope), jti).await?;
        Ok(())
    }

    async fn count_by_type(&self, scope: TokenScope) -> DomainResult<usize> {
        Ok(self.client.scard(&Self::type_key(scope)).await?)
    }

    async fn touch_last_used(&self, jti: &str, ttl_seconds: u64) -> DomainResult<()> {
        let now = chrono::Utc::now().timestamp().to_string();
        self.client
            .set_with_expiry(&Self::last_used_key(jti), &now, ttl_seconds)
            .await?;
        Ok(())
    }

    async fn record_security_event(&self, event: &SecurityEvent) -> DomainResult<()> {
        let json = serde_json::to_string(event).map_err(|e| DomainError::Store {
            message: format!("Failed to serialize security event: {}", e),
        })?;
        self.client
            .sadd(&Self::events_key(event.day()), &json)
            .await?;
        Ok(())
    }

    async fn delete_security_events_on(&self, day: NaiveDate) -> DomainResult<bool> {
        Ok(self.client.delete(&Self::events_key(day)).await?)
    }
}
