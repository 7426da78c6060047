//! Token service module for JWT management
//!
//! This module handles all token-related operations including:
//! - RS256 key management with in-memory generation fallback
//! - JWT access/refresh token issuance and verification
//! - Blacklist-based revocation and per-user enumeration
//! - Security-event cleanup

mod config;
mod issuer;
mod key_manager;
mod manager;

#[cfg(test)]
pub(crate) mod tests;

pub use config::TokenServiceConfig;
pub use issuer::{IssuedPair, JwtIssuer};
pub use key_manager::Rs256KeyManager;
pub use manager::{EventCleanupStats, TokenManager, TokenMetrics};
