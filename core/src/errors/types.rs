//! Error type definitions for token and session operations.
//!
//! Token validity failures are deliberately not surfaced through these
//! types at the service boundary: `verify` returns `None` for expired,
//! tampered, and revoked tokens alike so callers cannot distinguish them.
//! These errors cover key management, generation, and store faults.

use thiserror::Error;

/// Token-related errors
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token format")]
    InvalidTokenFormat,

    #[error("Token signature verification failed")]
    InvalidSignature,

    #[error("Token revoked")]
    TokenRevoked,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Token generation failed")]
    TokenGenerationFailed,

    #[error("Failed to load signing key: {message}")]
    KeyLoadError { message: String },

    #[error("Failed to generate signing key: {message}")]
    KeyGenerationFailed { message: String },
}

/// Session-related errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session not found")]
    SessionNotFound,

    #[error("Session expired")]
    SessionExpired,

    #[error("Session creation failed: {message}")]
    SessionCreationFailed { message: String },
}

/// Input validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Field required: {field}")]
    RequiredField { field: String },

    #[error("Invalid format for field: {field}")]
    InvalidFormat { field: String },
}
