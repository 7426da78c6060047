//! Configuration for the token service

use crate::domain::entities::token::{
    ACCESS_TOKEN_TTL_SECONDS, JWT_AUDIENCE, JWT_ISSUER, REFRESH_TOKEN_TTL_SECONDS,
};

/// Configuration for token issuance and verification
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// JWT issuer claim
    pub issuer: String,
    /// JWT audience claim
    pub audience: String,
    /// Access token lifetime in seconds
    pub access_token_ttl_seconds: i64,
    /// Refresh token lifetime in seconds
    pub refresh_token_ttl_seconds: i64,
    /// PEM-encoded RSA private key (takes precedence over the path)
    pub private_key_pem: Option<String>,
    /// Path to a PEM-encoded RSA private key file
    pub private_key_path: Option<String>,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            issuer: JWT_ISSUER.to_string(),
            audience: JWT_AUDIENCE.to_string(),
            access_token_ttl_seconds: ACCESS_TOKEN_TTL_SECONDS,
            refresh_token_ttl_seconds: REFRESH_TOKEN_TTL_SECONDS,
            private_key_pem: None,
            private_key_path: None,
        }
    }
}

impl From<&pf_shared::config::JwtConfig> for TokenServiceConfig {
    fn from(config: &pf_shared::config::JwtConfig) -> Self {
        Self {
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_token_ttl_seconds: config.access_token_expiry,
            refresh_token_ttl_seconds: config.refresh_token_expiry,
            private_key_pem: config.private_key_pem.clone(),
            private_key_path: config.private_key_path.clone(),
        }
    }
}
