//! Authentication and authorization configuration

use serde::{Deserialize, Serialize};

/// JWT authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// PEM-encoded RSA private key for signing tokens (takes precedence
    /// over `private_key_path` when set)
    #[serde(default)]
    pub private_key_pem: Option<String>,

    /// Path to a PEM-encoded RSA private key file
    #[serde(default)]
    pub private_key_path: Option<String>,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            private_key_pem: None,
            private_key_path: None,
            access_token_expiry: 900,     // 15 minutes
            refresh_token_expiry: 604800, // 7 days
            issuer: String::from("prompt-forge"),
            audience: String::from("prompt-forge-api"),
        }
    }
}

impl JwtConfig {
    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Check whether a signing key source has been configured
    pub fn has_key_source(&self) -> bool {
        self.private_key_pem.is_some() || self.private_key_path.is_some()
    }
}

/// Session policy configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Default session lifetime in seconds
    pub default_ttl_seconds: u64,

    /// Maximum concurrent sessions per user
    pub max_sessions_per_user: usize,

    /// Interval between expired-session sweeps in seconds
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_ttl_seconds: 7200, // 2 hours
            max_sessions_per_user: 5,
            cleanup_interval_seconds: default_cleanup_interval(),
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// Session configuration
    #[serde(default)]
    pub session: SessionConfig,
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let private_key_pem = std::env::var("JWT_PRIVATE_KEY_PEM").ok();
        let private_key_path = std::env::var("JWT_PRIVATE_KEY_PATH").ok();
        let access_token_expiry = std::env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "900".to_string())
            .parse()
            .unwrap_or(900);
        let refresh_token_expiry = std::env::var("JWT_REFRESH_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "604800".to_string())
            .parse()
            .unwrap_or(604800);
        let default_ttl_seconds = std::env::var("SESSION_DEFAULT_TTL")
            .unwrap_or_else(|_| "7200".to_string())
            .parse()
            .unwrap_or(7200);
        let max_sessions_per_user = std::env::var("SESSION_MAX_PER_USER")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .unwrap_or(5);

        Self {
            jwt: JwtConfig {
                private_key_pem,
                private_key_path,
                access_token_expiry,
                refresh_token_expiry,
                ..Default::default()
            },
            session: SessionConfig {
                default_ttl_seconds,
                max_sessions_per_user,
                ..Default::default()
            },
        }
    }
}

fn default_cleanup_interval() -> u64 {
    3600 // 1 hour
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_config_default() {
        let config = JwtConfig::default();
        assert_eq!(config.access_token_expiry, 900);
        assert_eq!(config.refresh_token_expiry, 604800);
        assert_eq!(config.issuer, "prompt-forge");
        assert!(!config.has_key_source());
    }

    #[test]
    fn test_jwt_config_builder() {
        let config = JwtConfig::default()
            .with_access_expiry_minutes(30)
            .with_refresh_expiry_days(14);

        assert_eq!(config.access_token_expiry, 1800);
        assert_eq!(config.refresh_token_expiry, 1209600);
    }

    #[test]
    fn test_session_config_default() {
        let config = SessionConfig::default();
        assert_eq!(config.default_ttl_seconds, 7200);
        assert_eq!(config.max_sessions_per_user, 5);
        assert_eq!(config.cleanup_interval_seconds, 3600);
    }
}
