//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for the PromptForge
//! backend: the Redis client and the Redis-backed implementations of the
//! core's token and session store traits.
//!
//! The key naming conventions used by the stores are fixed and shared by
//! every process writing to the same Redis:
//!
//! - `token:{jti}` / `user_tokens:{user_id}` / `tokens_by_type:{access|refresh}`
//! - `blacklist:{jti}` / `token_last_used:{jti}` / `security_events:{YYYYMMDD}`
//! - `session:{session_id}` / `user_sessions:{user_id}`

use thiserror::Error;

pub mod cache;

pub use cache::{RedisClient, RedisSessionStore, RedisTokenStore};

// Re-export the cache configuration for convenience
pub use pf_shared::config::CacheConfig;

/// Infrastructure-level errors
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("Redis cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfraError> for pf_core::errors::DomainError {
    fn from(error: InfraError) -> Self {
        pf_core::errors::DomainError::Store {
            message: error.to_string(),
        }
    }
}
