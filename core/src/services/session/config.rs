//! Configuration for the session manager

use crate::domain::entities::session::DEFAULT_SESSION_TTL_SECONDS;

/// Maximum concurrent sessions per user by default
pub const DEFAULT_MAX_SESSIONS_PER_USER: usize = 5;

/// Configuration for session lifetimes and concurrency limits
#[derive(Debug, Clone)]
pub struct SessionManagerConfig {
    /// Session lifetime in seconds when the caller supplies none
    pub default_ttl_seconds: u64,
    /// Maximum concurrent sessions per user; older sessions are evicted
    pub max_sessions_per_user: usize,
}

impl Default for SessionManagerConfig {
    fn default() -> Self {
        Self {
            default_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            max_sessions_per_user: DEFAULT_MAX_SESSIONS_PER_USER,
        }
    }
}

impl From<&pf_shared::config::SessionConfig> for SessionManagerConfig {
    fn from(config: &pf_shared::config::SessionConfig) -> Self {
        Self {
            default_ttl_seconds: config.default_ttl_seconds,
            max_sessions_per_user: config.max_sessions_per_user,
        }
    }
}
