//! Stateless JWT issuance and verification

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, Header, Validation};
use tracing::debug;

use crate::domain::entities::token::{
    AccessTokenGrant, Claims, TokenPair, TokenScope, TOKEN_TYPE_BEARER,
};
use crate::errors::{DomainError, DomainResult, TokenError};

use super::config::TokenServiceConfig;
use super::key_manager::Rs256KeyManager;

/// A signed token pair together with the claims that went into it
#[derive(Debug, Clone)]
pub struct IssuedPair {
    /// Encoded tokens and metadata returned to clients
    pub pair: TokenPair,
    /// Claims signed into the access token
    pub access_claims: Claims,
    /// Claims signed into the refresh token
    pub refresh_claims: Claims,
}

/// Produces and validates RS256-signed tokens
///
/// Stateless with respect to storage: no I/O beyond the key manager.
/// Blacklist and record-existence checks are layered on top by
/// [`TokenManager`](super::TokenManager).
pub struct JwtIssuer {
    config: TokenServiceConfig,
    key_manager: Rs256KeyManager,
    validation: Validation,
}

impl JwtIssuer {
    /// Creates a new issuer from configuration and a loaded keypair
    pub fn new(config: TokenServiceConfig, key_manager: Rs256KeyManager) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            config,
            key_manager,
            validation,
        }
    }

    /// Issues a signed access/refresh token pair for a user
    ///
    /// Both tokens carry a freshly generated `jti`. The returned
    /// `expires_in` always reflects the access-token lifetime, not the
    /// refresh token's.
    pub fn issue_pair(
        &self,
        user_id: &str,
        username: &str,
        roles: &[String],
    ) -> DomainResult<IssuedPair> {
        let access_claims = Claims::new(
            TokenScope::Access,
            user_id,
            username,
            roles.to_vec(),
            &self.config.issuer,
            &self.config.audience,
            self.config.access_token_ttl_seconds,
        );
        let refresh_claims = Claims::new(
            TokenScope::Refresh,
            user_id,
            username,
            roles.to_vec(),
            &self.config.issuer,
            &self.config.audience,
            self.config.refresh_token_ttl_seconds,
        );

        let access_token = self.encode(&access_claims)?;
        let refresh_token = self.encode(&refresh_claims)?;

        Ok(IssuedPair {
            pair: TokenPair {
                access_token,
                refresh_token,
                token_type: TOKEN_TYPE_BEARER.to_string(),
                expires_in: self.config.access_token_ttl_seconds,
                access_jti: access_claims.jti.clone(),
                refresh_jti: refresh_claims.jti.clone(),
            },
            access_claims,
            refresh_claims,
        })
    }

    /// Verifies a token's signature and expiry
    ///
    /// Fails closed: expired, malformed, and tampered tokens all collapse
    /// to `None`. The failure cause is logged but deliberately not exposed
    /// to callers.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        match decode::<Claims>(token, self.key_manager.decoding_key(), &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                debug!(error = %e, "Token verification failed");
                None
            }
        }
    }

    /// Decodes claims without verifying the signature or expiry
    ///
    /// Used only to extract a `jti`/`user_id` for revoking an expired or
    /// otherwise-untrusted token. Must never be used to authorize an
    /// action.
    pub fn decode_unsafe(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        match decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                debug!(error = %e, "Unverified token decode failed");
                None
            }
        }
    }

    /// Verifies the signature but not the expiry
    ///
    /// Used to read claims from a token that may have expired, for logging
    /// and cleanup purposes.
    pub fn claims_ignoring_expiry(&self, token: &str) -> Option<Claims> {
        let mut validation = self.validation.clone();
        validation.validate_exp = false;

        match decode::<Claims>(token, self.key_manager.decoding_key(), &validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                debug!(error = %e, "Token decode ignoring expiry failed");
                None
            }
        }
    }

    /// Mints a new access token from a valid refresh token
    ///
    /// Returns `Ok(None)` when the refresh token fails verification or its
    /// scope is not `refresh`. The refresh token itself is not rotated.
    pub fn refresh_access(&self, refresh_token: &str) -> DomainResult<Option<AccessTokenGrant>> {
        let Some(claims) = self.verify(refresh_token) else {
            return Ok(None);
        };
        if claims.scope != TokenScope::Refresh {
            debug!(scope = %claims.scope, "Refresh rejected: wrong token scope");
            return Ok(None);
        }

        let access = Claims::new(
            TokenScope::Access,
            claims.user_id.as_str(),
            claims.username.as_str(),
            claims.roles,
            &self.config.issuer,
            &self.config.audience,
            self.config.access_token_ttl_seconds,
        );
        let access_token = self.encode(&access)?;

        Ok(Some(AccessTokenGrant {
            access_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.config.access_token_ttl_seconds,
            claims: access,
        }))
    }

    /// Returns the PEM encoding of the verification key
    pub fn public_key_pem(&self) -> &str {
        self.key_manager.public_key_pem()
    }

    /// Access to the issuance configuration
    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    /// Encodes claims into a signed JWT
    fn encode(&self, claims: &Claims) -> DomainResult<String> {
        let header = Header::new(Algorithm::RS256);
        encode(&header, claims, self.key_manager.encoding_key())
            .map_err(|_| DomainError::Token(TokenError::TokenGenerationFailed))
    }
}
