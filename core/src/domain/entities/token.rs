//! Token entities for JWT-based authentication.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Access token lifetime in seconds (15 minutes)
pub const ACCESS_TOKEN_TTL_SECONDS: i64 = 900;

/// Refresh token lifetime in seconds (7 days)
pub const REFRESH_TOKEN_TTL_SECONDS: i64 = 604_800;

/// Blacklist entry lifetime in seconds (7 days)
pub const BLACKLIST_TTL_SECONDS: u64 = 604_800;

/// Lifetime of the best-effort "last used" marker (15 minutes)
pub const LAST_USED_TTL_SECONDS: u64 = 900;

/// Token type reported to clients
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// JWT issuer
pub const JWT_ISSUER: &str = "prompt-forge";

/// JWT audience
pub const JWT_AUDIENCE: &str = "prompt-forge-api";

/// Discriminator distinguishing access tokens from refresh tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenScope {
    Access,
    Refresh,
}

impl TokenScope {
    /// String form used in store keys and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl std::fmt::Display for TokenScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims structure for the JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// JWT ID (unique identifier for the token)
    pub jti: String,

    /// Whether this is an access or refresh token
    pub scope: TokenScope,

    /// User ID (denormalized copy of the subject)
    pub user_id: String,

    /// Username at issuance time
    pub username: String,

    /// Role names at issuance time
    pub roles: Vec<String>,
}

impl Claims {
    /// Creates new claims for a token of the given scope
    ///
    /// # Arguments
    ///
    /// * `scope` - Access or refresh
    /// * `user_id` - The user's identifier
    /// * `username` - The user's display name
    /// * `roles` - Role names carried in the token
    /// * `issuer` - JWT issuer claim
    /// * `audience` - JWT audience claim
    /// * `ttl_seconds` - Token lifetime in seconds
    pub fn new(
        scope: TokenScope,
        user_id: impl Into<String>,
        username: impl Into<String>,
        roles: Vec<String>,
        issuer: &str,
        audience: &str,
        ttl_seconds: i64,
    ) -> Self {
        let now = Utc::now();
        let user_id = user_id.into();

        Self {
            sub: user_id.clone(),
            iat: now.timestamp(),
            exp: now.timestamp() + ttl_seconds,
            iss: issuer.to_string(),
            aud: audience.to_string(),
            jti: Uuid::new_v4().to_string(),
            scope,
            user_id,
            username: username.into(),
            roles,
        }
    }

    /// Checks if the claims have expired
    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp();
        now >= self.exp
    }

    /// Full lifetime of the token in seconds
    pub fn ttl_seconds(&self) -> u64 {
        (self.exp - self.iat).max(0) as u64
    }

    /// Seconds until the token expires, zero if already expired
    pub fn remaining_seconds(&self) -> u64 {
        (self.exp - Utc::now().timestamp()).max(0) as u64
    }
}

/// Opaque client metadata recorded alongside issued tokens
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// User agent string reported by the client
    pub user_agent: Option<String>,

    /// Client IP address
    pub ip_address: Option<String>,
}

/// Token pair returned to the client after login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// JWT refresh token
    pub refresh_token: String,

    /// Token type (always "Bearer")
    pub token_type: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,

    /// JWT ID of the access token
    pub access_jti: String,

    /// JWT ID of the refresh token
    pub refresh_jti: String,
}

/// A freshly minted access token with its claims
#[derive(Debug, Clone)]
pub struct AccessTokenGrant {
    /// JWT access token
    pub access_token: String,

    /// Token type (always "Bearer")
    pub token_type: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,

    /// Claims signed into the token
    pub claims: Claims,
}

/// Stored record of an issued token, keyed by `jti`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// JWT ID this record mirrors
    pub jti: String,

    /// User the token was issued to
    pub user_id: String,

    /// Whether the token is an access or refresh token
    pub token_type: TokenScope,

    /// Role names at issuance time
    pub roles: Vec<String>,

    /// Timestamp when the token was issued
    pub created_at: DateTime<Utc>,

    /// Client metadata captured at issuance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_info: Option<ClientInfo>,
}

impl TokenRecord {
    /// Builds a record mirroring the given claims
    pub fn from_claims(claims: &Claims, client_info: Option<ClientInfo>) -> Self {
        Self {
            jti: claims.jti.clone(),
            user_id: claims.user_id.clone(),
            token_type: claims.scope,
            roles: claims.roles.clone(),
            created_at: Utc::now(),
            client_info,
        }
    }
}

/// Blacklist entry marking a `jti` as revoked, keyed by `jti`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistEntry {
    /// User the revoked token belonged to
    pub user_id: String,

    /// SHA-256 hash of the revoked token (never the raw token)
    pub token_hash: String,

    /// Timestamp when the token was blacklisted
    pub blacklisted_at: DateTime<Utc>,

    /// Reason supplied by the revoking caller
    pub reason: String,
}

impl BlacklistEntry {
    /// Creates a new blacklist entry
    pub fn new(
        user_id: impl Into<String>,
        token_hash: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            token_hash: token_hash.into(),
            blacklisted_at: Utc::now(),
            reason: reason.into(),
        }
    }
}

/// Hashes a token for storage in blacklist entries
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
