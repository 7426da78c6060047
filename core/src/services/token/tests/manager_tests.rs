//! Unit tests for the store-backed token manager

use chrono::{Duration, Utc};

use crate::domain::entities::security_event::{SecurityEvent, SecurityEventType};
use crate::domain::entities::token::{ClientInfo, TokenScope};
use crate::repositories::token::MockTokenStore;
use crate::repositories::TokenStore;
use crate::services::token::{JwtIssuer, TokenManager, TokenServiceConfig};

use super::TEST_KEYS;

fn manager() -> (TokenManager<MockTokenStore>, MockTokenStore) {
    let store = MockTokenStore::new();
    let issuer = JwtIssuer::new(TokenServiceConfig::default(), TEST_KEYS.clone());
    (TokenManager::new(store.clone(), issuer), store)
}

fn roles(names: &[&str]) -> Vec<String> {
    names.iter().map(|r| r.to_string()).collect()
}

#[tokio::test]
async fn test_issue_pair_records_both_tokens() {
    let (manager, store) = manager();

    let pair = manager
        .issue_pair(
            "u1",
            "alice",
            &roles(&["user"]),
            Some(ClientInfo {
                user_agent: Some("cli/1.0".to_string()),
                ip_address: Some("127.0.0.1".to_string()),
            }),
        )
        .await
        .unwrap();

    let access = store.find_record(&pair.access_jti).await.unwrap().unwrap();
    assert_eq!(access.user_id, "u1");
    assert_eq!(access.token_type, TokenScope::Access);
    assert_eq!(access.roles, roles(&["user"]));
    assert!(access.client_info.is_some());

    let refresh = store.find_record(&pair.refresh_jti).await.unwrap().unwrap();
    assert_eq!(refresh.token_type, TokenScope::Refresh);

    assert!(store.user_index_contains("u1", &pair.access_jti).await);
    assert!(store.user_index_contains("u1", &pair.refresh_jti).await);
}

#[tokio::test]
async fn test_verify_valid_token_touches_last_used() {
    let (manager, store) = manager();
    let pair = manager.issue_pair("u1", "alice", &[], None).await.unwrap();

    let claims = manager.verify(&pair.access_token).await.unwrap().unwrap();
    assert_eq!(claims.user_id, "u1");
    assert_eq!(claims.scope, TokenScope::Access);
    assert!(store.last_used_exists(&pair.access_jti).await);
}

#[tokio::test]
async fn test_verify_rejects_unrecorded_token() {
    let (manager, _store) = manager();

    // Properly signed, but never recorded in the store
    let issuer = JwtIssuer::new(TokenServiceConfig::default(), TEST_KEYS.clone());
    let issued = issuer.issue_pair("u1", "alice", &[]).unwrap();

    assert!(manager
        .verify(&issued.pair.access_token)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_revoke_makes_token_unverifiable() {
    let (manager, store) = manager();
    let pair = manager.issue_pair("u1", "alice", &[], None).await.unwrap();

    assert!(manager.verify(&pair.access_token).await.unwrap().is_some());
    assert!(manager
        .revoke(&pair.access_token, "manual_revocation")
        .await
        .unwrap());

    // Signature and expiry are still fine; the blacklist wins
    assert!(manager.verify(&pair.access_token).await.unwrap().is_none());
    assert!(store.is_blacklisted(&pair.access_jti).await.unwrap());
    assert!(store.find_record(&pair.access_jti).await.unwrap().is_none());
    assert!(!store.user_index_contains("u1", &pair.access_jti).await);
}

#[tokio::test]
async fn test_revoke_works_on_expired_token() {
    let store = MockTokenStore::new();
    let config = TokenServiceConfig {
        access_token_ttl_seconds: -300,
        ..Default::default()
    };
    let issuer = JwtIssuer::new(config, TEST_KEYS.clone());
    let manager = TokenManager::new(store.clone(), issuer);

    let pair = manager.issue_pair("u1", "alice", &[], None).await.unwrap();
    assert!(manager.revoke(&pair.access_token, "expired_logout").await.unwrap());
    assert!(store.is_blacklisted(&pair.access_jti).await.unwrap());
}

#[tokio::test]
async fn test_revoke_untrackable_token_is_a_noop() {
    let (manager, store) = manager();

    assert!(!manager.revoke("garbage", "whatever").await.unwrap());
    assert_eq!(store.blacklist_len().await, 0);
}

#[tokio::test]
async fn test_revoke_records_security_event() {
    let (manager, store) = manager();
    let pair = manager.issue_pair("u1", "alice", &[], None).await.unwrap();

    manager
        .revoke(&pair.access_token, "manual_revocation")
        .await
        .unwrap();

    let events = store.events_on(Utc::now().date_naive()).await;
    assert!(events
        .iter()
        .any(|e| e.event_type == SecurityEventType::TokenRevoked
            && e.jti.as_deref() == Some(pair.access_jti.as_str())));
}

#[tokio::test]
async fn test_revoke_all_for_user_empties_index() {
    let (manager, store) = manager();
    let pair1 = manager.issue_pair("u2", "bob", &[], None).await.unwrap();
    let pair2 = manager.issue_pair("u2", "bob", &[], None).await.unwrap();
    let other = manager.issue_pair("u3", "carol", &[], None).await.unwrap();

    let revoked = manager
        .revoke_all_for_user("u2", "password_change")
        .await
        .unwrap();
    assert_eq!(revoked, 4);

    // Every previously issued token for u2 now fails verification
    for token in [
        &pair1.access_token,
        &pair1.refresh_token,
        &pair2.access_token,
        &pair2.refresh_token,
    ] {
        assert!(manager.verify(token).await.unwrap().is_none());
    }
    assert!(store.user_token_ids("u2").await.unwrap().is_empty());

    // Unrelated users are untouched
    assert!(manager.verify(&other.access_token).await.unwrap().is_some());

    let events = store.events_on(Utc::now().date_naive()).await;
    assert!(events
        .iter()
        .any(|e| e.event_type == SecurityEventType::AllTokensRevoked && e.count == Some(4)));
}

#[tokio::test]
async fn test_refresh_mints_and_records_new_access_token() {
    let (manager, store) = manager();
    let pair = manager
        .issue_pair("u1", "alice", &roles(&["user"]), None)
        .await
        .unwrap();

    let grant = manager
        .refresh(&pair.refresh_token, None)
        .await
        .unwrap()
        .unwrap();

    assert_ne!(grant.claims.jti, pair.access_jti);
    assert_eq!(grant.claims.user_id, "u1");
    assert_eq!(grant.claims.roles, roles(&["user"]));

    // The new access token is tracked and verifiable
    assert!(store.find_record(&grant.claims.jti).await.unwrap().is_some());
    assert!(manager.verify(&grant.access_token).await.unwrap().is_some());

    // The refresh token's own record is untouched
    assert!(store.find_record(&pair.refresh_jti).await.unwrap().is_some());
}

#[tokio::test]
async fn test_refresh_rejects_access_scope_token() {
    let (manager, _store) = manager();
    let pair = manager.issue_pair("u1", "alice", &[], None).await.unwrap();

    assert!(manager
        .refresh(&pair.access_token, None)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_refresh_rejects_revoked_refresh_token() {
    let (manager, _store) = manager();
    let pair = manager.issue_pair("u1", "alice", &[], None).await.unwrap();

    manager.revoke(&pair.refresh_token, "logout").await.unwrap();

    assert!(manager
        .refresh(&pair.refresh_token, None)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_metrics_count_by_type() {
    let (manager, _store) = manager();
    manager.issue_pair("u1", "alice", &[], None).await.unwrap();
    manager.issue_pair("u2", "bob", &[], None).await.unwrap();

    let metrics = manager.metrics().await.unwrap();
    assert_eq!(metrics.access, 2);
    assert_eq!(metrics.refresh, 2);
    assert_eq!(metrics.total, 4);
    assert_eq!(metrics.active, metrics.total);
}

#[tokio::test]
async fn test_cleanup_sweeps_event_buckets_past_retention() {
    let (manager, store) = manager();

    let mut old_event = SecurityEvent::token_revoked("u1", "jti-old", "r");
    old_event.created_at = Utc::now() - Duration::days(40);
    store.record_security_event(&old_event).await.unwrap();

    let mut recent_event = SecurityEvent::token_revoked("u1", "jti-recent", "r");
    recent_event.created_at = Utc::now() - Duration::days(10);
    store.record_security_event(&recent_event).await.unwrap();

    let stats = manager.cleanup_expired().await.unwrap();
    assert_eq!(stats.cleaned_events, 1);

    // Events inside the 30-day retention window are kept
    let recent_day = (Utc::now() - Duration::days(10)).date_naive();
    assert_eq!(store.events_on(recent_day).await.len(), 1);

    let old_day = (Utc::now() - Duration::days(40)).date_naive();
    assert!(store.events_on(old_day).await.is_empty());
}
