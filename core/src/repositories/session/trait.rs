//! Session store trait defining the interface for session persistence.

use async_trait::async_trait;

use crate::domain::entities::session::SessionRecord;
use crate::errors::DomainResult;

/// Store trait for application-session persistence
///
/// Records are TTL-bounded; the per-user index carries no TTL and is a
/// cache of liveness only. Multi-key updates (record plus index) are not
/// transactional, so readers must treat a missing record as "not found"
/// regardless of index membership and may self-heal stale index entries.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a session record with the given TTL
    async fn save(&self, record: &SessionRecord, ttl_seconds: u64) -> DomainResult<()>;

    /// Find a session record by its identifier
    async fn find(&self, session_id: &str) -> DomainResult<Option<SessionRecord>>;

    /// Delete a session record
    ///
    /// # Returns
    /// * `Ok(true)` - Record was deleted
    /// * `Ok(false)` - Record was already absent
    async fn delete(&self, session_id: &str) -> DomainResult<bool>;

    /// Add a session to the user's session index
    async fn add_to_user_index(&self, user_id: &str, session_id: &str) -> DomainResult<()>;

    /// Remove a session from the user's session index
    async fn remove_from_user_index(&self, user_id: &str, session_id: &str) -> DomainResult<()>;

    /// List the session identifiers currently in the user's index
    ///
    /// Members may reference records that have since expired; callers must
    /// re-validate against [`find`](Self::find).
    async fn user_session_ids(&self, user_id: &str) -> DomainResult<Vec<String>>;

    /// List every session identifier in the store (sweep support)
    async fn all_session_ids(&self) -> DomainResult<Vec<String>>;
}
