//! Token store trait defining the interface for issued-token persistence.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::entities::security_event::SecurityEvent;
use crate::domain::entities::token::{BlacklistEntry, TokenRecord, TokenScope};
use crate::errors::DomainResult;

/// Store trait for issued-token record keeping
///
/// Implementations track issued tokens independently of their cryptographic
/// validity, enabling revocation and per-user enumeration. Primary records
/// and blacklist entries are TTL-bounded; the per-user index carries no TTL
/// and is treated as a cache of liveness only — readers must re-validate
/// index members against the primary record and tolerate dead entries.
///
/// # Security Considerations
/// - Blacklist entries store a hash of the revoked token, never the raw token
/// - A blacklisted `jti` must stay unverifiable for the entry's full TTL
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Persist a token record with the given TTL
    ///
    /// # Arguments
    /// * `record` - The record to persist, keyed by its `jti`
    /// * `ttl_seconds` - Lifetime, matching the token's own validity
    async fn save_record(&self, record: &TokenRecord, ttl_seconds: u64) -> DomainResult<()>;

    /// Find a token record by `jti`
    ///
    /// # Returns
    /// * `Ok(Some(TokenRecord))` - Record exists and has not expired
    /// * `Ok(None)` - No live record for this `jti`
    async fn find_record(&self, jti: &str) -> DomainResult<Option<TokenRecord>>;

    /// Delete a token record
    ///
    /// # Returns
    /// * `Ok(true)` - Record was deleted
    /// * `Ok(false)` - Record was already absent
    async fn delete_record(&self, jti: &str) -> DomainResult<bool>;

    /// Persist a blacklist entry for a `jti` with the given TTL
    async fn save_blacklist_entry(
        &self,
        jti: &str,
        entry: &BlacklistEntry,
        ttl_seconds: u64,
    ) -> DomainResult<()>;

    /// Check whether a `jti` is blacklisted
    async fn is_blacklisted(&self, jti: &str) -> DomainResult<bool>;

    /// Add a `jti` to the user's token index
    async fn add_to_user_index(&self, user_id: &str, jti: &str) -> DomainResult<()>;

    /// Remove a `jti` from the user's token index
    async fn remove_from_user_index(&self, user_id: &str, jti: &str) -> DomainResult<()>;

    /// List the `jti`s currently in the user's token index
    ///
    /// Members may reference records that have since expired; callers must
    /// re-validate against [`find_record`](Self::find_record).
    async fn user_token_ids(&self, user_id: &str) -> DomainResult<Vec<String>>;

    /// Drop the user's entire token index
    async fn clear_user_index(&self, user_id: &str) -> DomainResult<()>;

    /// Add a `jti` to the per-type metrics index
    async fn add_to_type_index(&self, scope: TokenScope, jti: &str) -> DomainResult<()>;

    /// Remove a `jti` from the per-type metrics index
    async fn remove_from_type_index(&self, scope: TokenScope, jti: &str) -> DomainResult<()>;

    /// Count the members of the per-type metrics index
    async fn count_by_type(&self, scope: TokenScope) -> DomainResult<usize>;

    /// Refresh the short-lived "last used" marker for a `jti`
    async fn touch_last_used(&self, jti: &str, ttl_seconds: u64) -> DomainResult<()>;

    /// Append a security event to its day bucket
    async fn record_security_event(&self, event: &SecurityEvent) -> DomainResult<()>;

    /// Delete the security-event bucket for a calendar day
    ///
    /// # Returns
    /// * `Ok(true)` - A bucket existed for that day and was deleted
    /// * `Ok(false)` - No bucket for that day
    async fn delete_security_events_on(&self, day: NaiveDate) -> DomainResult<bool>;
}
