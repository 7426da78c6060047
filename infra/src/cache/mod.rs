//! Cache module for Redis-backed storage
//!
//! This module provides the Redis client used across the infrastructure
//! layer, including connection retry logic and the common key-value and
//! set operations, plus the Redis-backed token and session stores.

pub mod redis_client;
pub mod session_store;
pub mod token_store;

pub use redis_client::RedisClient;
pub use session_store::RedisSessionStore;
pub use token_store::RedisTokenStore;

// Re-export commonly used types
pub use pf_shared::config::CacheConfig;
