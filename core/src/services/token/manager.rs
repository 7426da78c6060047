//! Store-backed token lifecycle management

use std::time::Instant;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use crate::domain::entities::security_event::SecurityEvent;
use crate::domain::entities::token::{
    hash_token, AccessTokenGrant, BlacklistEntry, Claims, ClientInfo, TokenPair, TokenRecord,
    TokenScope, BLACKLIST_TTL_SECONDS, LAST_USED_TTL_SECONDS,
};
use crate::errors::DomainResult;
use crate::repositories::TokenStore;

use super::issuer::JwtIssuer;

/// Security events younger than this many days are retained
const SECURITY_EVENT_RETENTION_DAYS: i64 = 30;

/// Oldest day bucket the cleanup sweep will look at
const SECURITY_EVENT_SWEEP_HORIZON_DAYS: i64 = 90;

/// Token counts reported by [`TokenManager::metrics`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetrics {
    /// Total tracked tokens across both types
    pub total: usize,
    /// Active tokens; equals `total` because expiry is TTL-driven
    pub active: usize,
    /// Tracked access tokens
    pub access: usize,
    /// Tracked refresh tokens
    pub refresh: usize,
}

/// Result of a security-event cleanup pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventCleanupStats {
    /// Number of day buckets removed
    pub cleaned_events: usize,
    /// Wall-clock duration of the pass in milliseconds
    pub operation_time_ms: u128,
}

/// Manages issued tokens against a [`TokenStore`]
///
/// Composes the stateless [`JwtIssuer`] with durable (TTL-bounded) record
/// keeping: verification consults the blacklist and the record store, and
/// revocation works even on tokens that no longer verify.
pub struct TokenManager<S: TokenStore> {
    store: S,
    issuer: JwtIssuer,
}

impl<S: TokenStore> TokenManager<S> {
    /// Creates a new token manager
    pub fn new(store: S, issuer: JwtIssuer) -> Self {
        Self { store, issuer }
    }

    /// Access to the underlying issuer
    pub fn issuer(&self) -> &JwtIssuer {
        &self.issuer
    }

    /// Issues a token pair and records both tokens in the store
    ///
    /// A store failure after minting is propagated: a token the store
    /// cannot later revoke must not be handed out silently.
    pub async fn issue_pair(
        &self,
        user_id: &str,
        username: &str,
        roles: &[String],
        client_info: Option<ClientInfo>,
    ) -> DomainResult<TokenPair> {
        let issued = self.issuer.issue_pair(user_id, username, roles)?;

        self.record_issued(&issued.access_claims, client_info.clone())
            .await?;
        self.record_issued(&issued.refresh_claims, client_info)
            .await?;

        debug!(user_id = %user_id, access_jti = %issued.pair.access_jti, "Issued token pair");
        Ok(issued.pair)
    }

    /// Verifies a token cryptographically and against the store
    ///
    /// Beyond signature and expiry, the `jti` must not be blacklisted and
    /// a token record must still exist. All validity failures collapse to
    /// `Ok(None)`; only store I/O faults surface as errors.
    pub async fn verify(&self, token: &str) -> DomainResult<Option<Claims>> {
        let Some(claims) = self.issuer.verify(token) else {
            return Ok(None);
        };

        if self.store.is_blacklisted(&claims.jti).await? {
            info!(jti = %claims.jti, "Rejected blacklisted token");
            return Ok(None);
        }

        if self.store.find_record(&claims.jti).await?.is_none() {
            debug!(jti = %claims.jti, "Rejected token with no store record");
            return Ok(None);
        }

        // Best-effort activity marker; a failure must not fail the request
        if let Err(e) = self
            .store
            .touch_last_used(&claims.jti, LAST_USED_TTL_SECONDS)
            .await
        {
            debug!(jti = %claims.jti, error = %e, "Failed to refresh last-used marker");
        }

        Ok(Some(claims))
    }

    /// Revokes a single token, valid or expired
    ///
    /// Uses an unverified decode so revocation works on tokens that no
    /// longer pass verification. Returns `Ok(false)` when no `jti` can be
    /// extracted — revoking an untrackable token is a no-op, not a fault.
    pub async fn revoke(&self, token: &str, reason: &str) -> DomainResult<bool> {
        let Some(claims) = self.issuer.decode_unsafe(token) else {
            warn!("Revocation requested for token with no extractable claims");
            return Ok(false);
        };

        let entry = BlacklistEntry::new(claims.user_id.as_str(), hash_token(token), reason);
        self.store
            .save_blacklist_entry(&claims.jti, &entry, BLACKLIST_TTL_SECONDS)
            .await?;
        self.store.delete_record(&claims.jti).await?;
        self.store
            .remove_from_user_index(&claims.user_id, &claims.jti)
            .await?;
        self.store
            .remove_from_type_index(claims.scope, &claims.jti)
            .await?;

        self.emit_event(SecurityEvent::token_revoked(
            claims.user_id.as_str(),
            claims.jti.as_str(),
            reason,
        ))
        .await;

        info!(user_id = %claims.user_id, jti = %claims.jti, reason = %reason, "Token revoked");
        Ok(true)
    }

    /// Revokes every token a user holds
    ///
    /// Enumerates the user's index, blacklists and deletes each token
    /// found, clears the index, and emits one aggregate security event.
    pub async fn revoke_all_for_user(&self, user_id: &str, reason: &str) -> DomainResult<usize> {
        let ids = self.store.user_token_ids(user_id).await?;
        let mut revoked = 0;

        for jti in &ids {
            let Some(record) = self.store.find_record(jti).await? else {
                // Stale index entry; the record already expired
                continue;
            };

            let entry = BlacklistEntry::new(user_id, hash_token(jti), reason);
            self.store
                .save_blacklist_entry(jti, &entry, BLACKLIST_TTL_SECONDS)
                .await?;
            self.store.delete_record(jti).await?;
            self.store
                .remove_from_type_index(record.token_type, jti)
                .await?;
            revoked += 1;
        }

        self.store.clear_user_index(user_id).await?;

        self.emit_event(SecurityEvent::all_tokens_revoked(user_id, revoked, reason))
            .await;

        info!(user_id = %user_id, count = revoked, reason = %reason, "Revoked all user tokens");
        Ok(revoked)
    }

    /// Mints and records a new access token from a refresh token
    ///
    /// The refresh token is verified against the store (blacklist and
    /// record existence) before the issuer mints the replacement. The
    /// refresh token's own record is neither checked for rotation nor
    /// rotated.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        client_info: Option<ClientInfo>,
    ) -> DomainResult<Option<AccessTokenGrant>> {
        if self.verify(refresh_token).await?.is_none() {
            return Ok(None);
        }

        let Some(grant) = self.issuer.refresh_access(refresh_token)? else {
            return Ok(None);
        };

        self.record_issued(&grant.claims, client_info).await?;

        debug!(
            user_id = %grant.claims.user_id,
            jti = %grant.claims.jti,
            "Access token refreshed"
        );
        Ok(Some(grant))
    }

    /// Token counts derived from the per-type indexes
    pub async fn metrics(&self) -> DomainResult<TokenMetrics> {
        let access = self.store.count_by_type(TokenScope::Access).await?;
        let refresh = self.store.count_by_type(TokenScope::Refresh).await?;
        let total = access + refresh;

        Ok(TokenMetrics {
            total,
            // No separate deactivation state: TTL expiry is the cleanup
            active: total,
            access,
            refresh,
        })
    }

    /// Sweeps security-event buckets past the retention window
    ///
    /// Token records and blacklist entries expire naturally via TTL; this
    /// removes day-bucketed event logs older than 30 days, scanning back
    /// to a 90-day horizon.
    pub async fn cleanup_expired(&self) -> DomainResult<EventCleanupStats> {
        let start = Instant::now();
        let today = Utc::now().date_naive();
        let mut cleaned_events = 0;

        for offset in (SECURITY_EVENT_RETENTION_DAYS + 1)..=SECURITY_EVENT_SWEEP_HORIZON_DAYS {
            let day = today - Duration::days(offset);
            if self.store.delete_security_events_on(day).await? {
                cleaned_events += 1;
            }
        }

        let stats = EventCleanupStats {
            cleaned_events,
            operation_time_ms: start.elapsed().as_millis(),
        };
        info!(
            cleaned_events = stats.cleaned_events,
            operation_time_ms = stats.operation_time_ms,
            "Security-event cleanup finished"
        );
        Ok(stats)
    }

    /// Records a token in the store with exactly its remaining lifetime
    async fn record_issued(
        &self,
        claims: &Claims,
        client_info: Option<ClientInfo>,
    ) -> DomainResult<()> {
        let record = TokenRecord::from_claims(claims, client_info);
        self.store.save_record(&record, claims.ttl_seconds()).await?;
        self.store
            .add_to_user_index(&claims.user_id, &claims.jti)
            .await?;
        self.store
            .add_to_type_index(claims.scope, &claims.jti)
            .await?;
        Ok(())
    }

    /// Best-effort event emission; failures are logged, never propagated
    async fn emit_event(&self, event: SecurityEvent) {
        if let Err(e) = self.store.record_security_event(&event).await {
            warn!(
                event_type = event.event_type.as_str(),
                error = %e,
                "Failed to record security event"
            );
        }
    }
}
