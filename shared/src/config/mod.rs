//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - JWT signing and session policy configuration
//! - `cache` - Redis cache configuration

pub mod auth;
pub mod cache;

// Re-export commonly used types
pub use auth::{AuthConfig, JwtConfig, SessionConfig};
pub use cache::CacheConfig;
