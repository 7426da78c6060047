//! Unit tests for the token service

mod issuer_tests;
mod manager_tests;

use once_cell::sync::Lazy;

use super::key_manager::Rs256KeyManager;

/// Shared keypair so each test does not pay RSA generation cost
pub(crate) static TEST_KEYS: Lazy<Rs256KeyManager> =
    Lazy::new(|| Rs256KeyManager::generate().expect("failed to generate test keypair"));

/// A second, unrelated keypair for cross-key verification tests
pub(crate) static OTHER_KEYS: Lazy<Rs256KeyManager> =
    Lazy::new(|| Rs256KeyManager::generate().expect("failed to generate test keypair"));
