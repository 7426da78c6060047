//! Shared configuration types for the PromptForge backend
//!
//! This crate provides the configuration surface used across the server
//! crates: JWT signing configuration, session policy, and Redis cache
//! settings. All types are serde-friendly and can be loaded from
//! environment variables.

pub mod config;

// Re-export commonly used items at crate root
pub use config::{AuthConfig, CacheConfig, JwtConfig, SessionConfig};
