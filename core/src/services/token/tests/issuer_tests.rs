//! Unit tests for the stateless JWT issuer

use crate::domain::entities::token::TokenScope;
use crate::services::token::{JwtIssuer, TokenServiceConfig};

use super::{OTHER_KEYS, TEST_KEYS};

fn issuer() -> JwtIssuer {
    JwtIssuer::new(TokenServiceConfig::default(), TEST_KEYS.clone())
}

fn issuer_with_access_ttl(ttl_seconds: i64) -> JwtIssuer {
    let config = TokenServiceConfig {
        access_token_ttl_seconds: ttl_seconds,
        ..Default::default()
    };
    JwtIssuer::new(config, TEST_KEYS.clone())
}

fn roles(names: &[&str]) -> Vec<String> {
    names.iter().map(|r| r.to_string()).collect()
}

#[test]
fn test_issue_pair_round_trip() {
    let issuer = issuer();
    let issued = issuer.issue_pair("u1", "alice", &roles(&["user"])).unwrap();

    let claims = issuer.verify(&issued.pair.access_token).unwrap();
    assert_eq!(claims.user_id, "u1");
    assert_eq!(claims.username, "alice");
    assert_eq!(claims.roles, roles(&["user"]));
    assert_eq!(claims.scope, TokenScope::Access);
    assert_eq!(claims.jti, issued.pair.access_jti);
}

#[test]
fn test_issue_pair_metadata() {
    let issuer = issuer();
    let issued = issuer.issue_pair("u1", "alice", &[]).unwrap();

    // expires_in always reflects the access token, not the refresh token
    assert_eq!(issued.pair.expires_in, 900);
    assert_eq!(issued.pair.token_type, "Bearer");
    assert_ne!(issued.pair.access_jti, issued.pair.refresh_jti);
    assert_eq!(
        issued.refresh_claims.exp - issued.refresh_claims.iat,
        604_800
    );
}

#[test]
fn test_refresh_token_verifies_with_refresh_scope() {
    let issuer = issuer();
    let issued = issuer.issue_pair("u1", "alice", &roles(&["user"])).unwrap();

    let claims = issuer.verify(&issued.pair.refresh_token).unwrap();
    assert_eq!(claims.scope, TokenScope::Refresh);
    assert_eq!(claims.roles, roles(&["user"]));
}

#[test]
fn test_expired_token_fails_verify() {
    let issuer = issuer_with_access_ttl(-300);
    let issued = issuer.issue_pair("u1", "alice", &[]).unwrap();

    assert!(issuer.verify(&issued.pair.access_token).is_none());
}

#[test]
fn test_tampered_token_fails_verify() {
    let issuer = issuer();
    let issued = issuer.issue_pair("u1", "alice", &[]).unwrap();

    let mut parts: Vec<&str> = issued.pair.access_token.split('.').collect();
    let tampered_payload = parts[1].replace('a', "b");
    parts[1] = &tampered_payload;
    let tampered = parts.join(".");

    assert!(issuer.verify(&tampered).is_none());
    assert!(issuer.verify("not-a-jwt").is_none());
}

#[test]
fn test_token_from_other_key_fails_verify() {
    let issuer = issuer();
    let other = JwtIssuer::new(TokenServiceConfig::default(), OTHER_KEYS.clone());
    let issued = other.issue_pair("u1", "alice", &[]).unwrap();

    assert!(issuer.verify(&issued.pair.access_token).is_none());
}

#[test]
fn test_decode_unsafe_extracts_claims_from_expired_token() {
    let issuer = issuer_with_access_ttl(-300);
    let issued = issuer.issue_pair("u1", "alice", &[]).unwrap();

    let claims = issuer.decode_unsafe(&issued.pair.access_token).unwrap();
    assert_eq!(claims.jti, issued.pair.access_jti);
    assert_eq!(claims.user_id, "u1");

    assert!(issuer.decode_unsafe("garbage").is_none());
}

#[test]
fn test_claims_ignoring_expiry_still_checks_signature() {
    let issuer = issuer_with_access_ttl(-300);
    let issued = issuer.issue_pair("u1", "alice", &[]).unwrap();

    // Expired but properly signed: readable
    let claims = issuer
        .claims_ignoring_expiry(&issued.pair.access_token)
        .unwrap();
    assert_eq!(claims.jti, issued.pair.access_jti);

    // Signed by another key: rejected
    let other = JwtIssuer::new(TokenServiceConfig::default(), OTHER_KEYS.clone());
    let foreign = other.issue_pair("u1", "alice", &[]).unwrap();
    assert!(issuer
        .claims_ignoring_expiry(&foreign.pair.access_token)
        .is_none());
}

#[test]
fn test_refresh_access_mints_new_access_token() {
    let issuer = issuer();
    let issued = issuer.issue_pair("u1", "alice", &roles(&["user"])).unwrap();

    let grant = issuer
        .refresh_access(&issued.pair.refresh_token)
        .unwrap()
        .unwrap();

    assert_eq!(grant.claims.scope, TokenScope::Access);
    assert_eq!(grant.claims.user_id, "u1");
    assert_eq!(grant.claims.username, "alice");
    assert_eq!(grant.claims.roles, roles(&["user"]));
    assert_ne!(grant.claims.jti, issued.pair.access_jti);
    assert_eq!(grant.expires_in, 900);
}

#[test]
fn test_refresh_access_rejects_access_scope() {
    let issuer = issuer();
    let issued = issuer.issue_pair("u1", "alice", &[]).unwrap();

    assert!(issuer
        .refresh_access(&issued.pair.access_token)
        .unwrap()
        .is_none());
}

#[test]
fn test_repeated_refresh_yields_distinct_jtis_without_rotating() {
    let issuer = issuer();
    let issued = issuer.issue_pair("u1", "alice", &[]).unwrap();

    let mut jtis = std::collections::HashSet::new();
    for _ in 0..3 {
        let grant = issuer
            .refresh_access(&issued.pair.refresh_token)
            .unwrap()
            .unwrap();
        jtis.insert(grant.claims.jti);
    }
    assert_eq!(jtis.len(), 3);

    // The refresh token itself is untouched and still verifies
    let claims = issuer.verify(&issued.pair.refresh_token).unwrap();
    assert_eq!(claims.jti, issued.pair.refresh_jti);
}

#[test]
fn test_public_key_pem_exposed() {
    let issuer = issuer();
    assert!(issuer.public_key_pem().contains("BEGIN PUBLIC KEY"));
}
