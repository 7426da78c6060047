//! RS256 key management for JWT signing and verification

use std::fs;

use jsonwebtoken::{DecodingKey, EncodingKey};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use tracing::{info, warn};

use crate::errors::{DomainError, TokenError};
use crate::services::token::config::TokenServiceConfig;

/// Key strength used when generating a fallback keypair
const GENERATED_KEY_BITS: usize = 2048;

/// Manager for the RS256 keypair used in JWT operations
///
/// The private key never leaves this type; the public key PEM is the only
/// part exposed externally (e.g. for verification by other services).
#[derive(Clone)]
pub struct Rs256KeyManager {
    /// Private key for signing JWTs
    encoding_key: EncodingKey,
    /// Public key for verifying JWTs
    decoding_key: DecodingKey,
    /// PEM encoding of the public key
    public_key_pem: String,
    /// Whether the keypair was generated rather than loaded
    generated: bool,
}

impl std::fmt::Debug for Rs256KeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rs256KeyManager")
            .field("generated", &self.generated)
            .finish()
    }
}

impl Rs256KeyManager {
    /// Loads the configured private key, or generates a fresh keypair
    ///
    /// Tries the inline PEM first, then the key file path. On any loading
    /// failure (missing configuration, unreadable file, malformed PEM) a
    /// fresh RSA-2048 keypair is generated and held only in memory — a
    /// warning is logged because generated keys are not persisted and a
    /// process restart invalidates all previously issued tokens.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::KeyGenerationFailed` if generation itself
    /// fails. This is a non-recoverable configuration error: the process
    /// cannot serve authenticated requests without a keypair.
    pub fn load_or_generate(config: &TokenServiceConfig) -> Result<Self, DomainError> {
        match Self::load_configured_key(config) {
            Some(private_key) => {
                info!("Loaded RS256 signing key from configuration");
                Self::from_private_key(private_key, false)
            }
            None => {
                warn!(
                    "No usable RS256 signing key configured; generating an \
                     in-memory keypair. Generated keys are not persisted and \
                     all issued tokens become invalid on process restart"
                );
                Self::generate()
            }
        }
    }

    /// Generates a fresh in-memory RSA-2048 keypair
    pub fn generate() -> Result<Self, DomainError> {
        let mut rng = rand::thread_rng();
        let private_key = RsaPrivateKey::new(&mut rng, GENERATED_KEY_BITS).map_err(|e| {
            DomainError::Token(TokenError::KeyGenerationFailed {
                message: format!("RSA key generation failed: {}", e),
            })
        })?;

        Self::from_private_key(private_key, true)
    }

    /// Creates a key manager from a PEM-encoded private key string
    pub fn from_pem(private_key_pem: &str) -> Result<Self, DomainError> {
        let private_key = Self::parse_private_key(private_key_pem)?;
        Self::from_private_key(private_key, false)
    }

    /// Returns the encoding key for signing JWTs
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// Returns the decoding key for verifying JWTs
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    /// Returns the PEM encoding of the public key
    pub fn public_key_pem(&self) -> &str {
        &self.public_key_pem
    }

    /// Whether the keypair was generated rather than loaded
    pub fn is_generated(&self) -> bool {
        self.generated
    }

    /// Attempts to read and parse the configured private key
    fn load_configured_key(config: &TokenServiceConfig) -> Option<RsaPrivateKey> {
        let pem = match (&config.private_key_pem, &config.private_key_path) {
            (Some(pem), _) => pem.clone(),
            (None, Some(path)) => match fs::read_to_string(path) {
                Ok(pem) => pem,
                Err(e) => {
                    warn!(path = %path, error = %e, "Failed to read private key file");
                    return None;
                }
            },
            (None, None) => return None,
        };

        match Self::parse_private_key(&pem) {
            Ok(key) => Some(key),
            Err(e) => {
                warn!(error = %e, "Configured private key is not valid PEM");
                None
            }
        }
    }

    /// Parses a PEM private key, accepting PKCS#8 and PKCS#1 encodings
    fn parse_private_key(pem: &str) -> Result<RsaPrivateKey, DomainError> {
        RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|e| {
                DomainError::Token(TokenError::KeyLoadError {
                    message: format!("Invalid private key format: {}", e),
                })
            })
    }

    /// Derives the public half and builds the jsonwebtoken key handles
    fn from_private_key(private_key: RsaPrivateKey, generated: bool) -> Result<Self, DomainError> {
        let private_pem = private_key.to_pkcs8_pem(LineEnding::LF).map_err(|e| {
            DomainError::Token(TokenError::KeyLoadError {
                message: format!("Failed to encode private key: {}", e),
            })
        })?;

        let public_key = RsaPublicKey::from(&private_key);
        let public_key_pem = public_key.to_public_key_pem(LineEnding::LF).map_err(|e| {
            DomainError::Token(TokenError::KeyLoadError {
                message: format!("Failed to encode public key: {}", e),
            })
        })?;

        let encoding_key = EncodingKey::from_rsa_pem(private_pem.as_bytes()).map_err(|e| {
            DomainError::Token(TokenError::KeyLoadError {
                message: format!("Invalid private key format: {}", e),
            })
        })?;

        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes()).map_err(|e| {
            DomainError::Token(TokenError::KeyLoadError {
                message: format!("Invalid public key format: {}", e),
            })
        })?;

        Ok(Self {
            encoding_key,
            decoding_key,
            public_key_pem,
            generated,
        })
    }
}
