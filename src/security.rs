//! Credential hashing and password/email policy.
//!
//! Hashes are Argon2id PHC strings wrapped in standard base64 so the stored form is a single
//! opaque token in the user record. Verification reads the salt and cost back out of the PHC
//! string, so changing `HashSettings` never invalidates existing credentials.

pub mod policy;

use argon2::{Algorithm, Argon2, Params, PasswordHasher as _, PasswordVerifier, Version};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use password_hash::{PasswordHash, SaltString};
use tracing::debug;

use crate::config::HashSettings;
use crate::error::{AccessError, AccessResult};

pub use policy::{check_email, check_password, validate_email, validate_password};

const SALT_LEN: usize = 16;

/// Salted, adaptive one-way password hasher.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new(settings: HashSettings) -> AccessResult<Self> {
        let params = Params::new(settings.memory_kib, settings.iterations, settings.parallelism, None)
            .map_err(|e| AccessError::Config(format!("invalid hash settings: {}", e)))?;
        Ok(Self { argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params) })
    }

    /// Hash `password` under a fresh random salt; returns the base64-encoded PHC string.
    pub fn hash(&self, password: &str) -> AccessResult<String> {
        let mut salt_bytes = [0u8; SALT_LEN];
        getrandom::getrandom(&mut salt_bytes).map_err(|e| AccessError::RandomSource(e.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| AccessError::Hashing(e.to_string()))?;
        let phc = self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AccessError::Hashing(e.to_string()))?
            .to_string();
        Ok(STANDARD.encode(phc))
    }

    /// Check `candidate` against a stored hash. A wrong password is `Ok(false)`; only a
    /// corrupt `stored` value is an error.
    pub fn verify(&self, stored: &str, candidate: &str) -> AccessResult<bool> {
        let raw = STANDARD.decode(stored.trim())
            .map_err(|e| AccessError::HashEncoding(format!("base64: {}", e)))?;
        let phc = std::str::from_utf8(&raw)
            .map_err(|e| AccessError::HashEncoding(format!("utf8: {}", e)))?;
        let parsed = PasswordHash::new(phc)
            .map_err(|e| AccessError::HashEncoding(format!("phc: {}", e)))?;
        match self.argon2.verify_password(candidate.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => {
                debug!(target: "cce::access::hasher", "password mismatch");
                Ok(false)
            }
            Err(e) => Err(AccessError::HashEncoding(e.to_string())),
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { argon2: Argon2::default() }
    }
}
