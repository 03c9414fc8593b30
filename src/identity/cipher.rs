//! AES-256-GCM sealing of claims into opaque bearer tokens.
//!
//! Token layout: `base64_std(ciphertext || nonce)` with a 12-byte nonce appended after the
//! ciphertext and no length prefix. The nonce is the only source of ciphertext uniqueness
//! under a fixed key, so it is always drawn fresh from the OS random source and issuance
//! fails outright if that source does.

use std::fmt;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};
use tracing::{debug, error};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::claims::{Claims, RawClaims};
use crate::error::{AccessError, AccessResult};

pub const NONCE_LEN: usize = 12;
pub const KEY_LEN: usize = 32;

pub type Token = String;

/// 256-bit token key derived from the operator secret. Wiped on drop, never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; KEY_LEN]);

impl SymmetricKey {
    /// SHA-256 of the operator secret. A different secret yields a key under which every
    /// previously issued token fails authentication.
    pub fn derive(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(&digest);
        Self(key)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] { &self.0 }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("SymmetricKey(<redacted>)") }
}

fn fresh_nonce() -> AccessResult<[u8; NONCE_LEN]> {
    let mut nonce = [0u8; NONCE_LEN];
    getrandom::getrandom(&mut nonce).map_err(|e| {
        error!(target: "cce::access::cipher", "random source failed; refusing to issue token: {}", e);
        AccessError::RandomSource(e.to_string())
    })?;
    Ok(nonce)
}

/// Read-only AEAD context; safe to share across tasks.
#[derive(Clone)]
pub struct TokenCipher {
    aead: Aes256Gcm,
}

impl TokenCipher {
    pub fn new(key: &SymmetricKey) -> AccessResult<Self> {
        let aead = Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|e| AccessError::Config(format!("token key: {}", e)))?;
        Ok(Self { aead })
    }

    pub fn from_secret(secret: &str) -> AccessResult<Self> {
        Self::new(&SymmetricKey::derive(secret))
    }

    /// Seal an arbitrary payload. Callers normally go through [`TokenCipher::seal`].
    pub fn seal_bytes(&self, payload: &[u8]) -> AccessResult<Token> {
        let nonce = fresh_nonce()?;
        let mut sealed = self.aead
            .encrypt(Nonce::from_slice(&nonce), payload)
            .map_err(|_| AccessError::MalformedClaims("payload too large to seal".into()))?;
        sealed.extend_from_slice(&nonce);
        Ok(STANDARD.encode(sealed))
    }

    /// Open a token back into its raw payload.
    pub fn open_bytes(&self, token: &str) -> AccessResult<Vec<u8>> {
        let joined = STANDARD.decode(token)
            .map_err(|e| AccessError::MalformedToken(format!("base64: {}", e)))?;
        if joined.len() <= NONCE_LEN {
            return Err(AccessError::MalformedToken(format!("{} bytes is too short", joined.len())));
        }
        let (ciphertext, nonce) = joined.split_at(joined.len() - NONCE_LEN);
        self.aead
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| AccessError::DecryptionFailed)
    }

    pub fn seal(&self, claims: &Claims) -> AccessResult<Token> {
        let payload = serde_json::to_vec(claims)
            .map_err(|e| AccessError::MalformedClaims(e.to_string()))?;
        let token = self.seal_bytes(&payload)?;
        debug!(target: "cce::access::cipher", "sealed token for role={}", claims.role);
        Ok(token)
    }

    pub fn open(&self, token: &str) -> AccessResult<Claims> {
        let payload = self.open_bytes(token)?;
        let raw: RawClaims = serde_json::from_slice(&payload)
            .map_err(|e| AccessError::MalformedClaims(e.to_string()))?;
        Claims::try_from(raw)
    }
}

impl fmt::Debug for TokenCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCipher").field("aead", &"aes-256-gcm").field("nonce_len", &NONCE_LEN).finish()
    }
}

/// Short, non-reversible label for a token so log lines can be correlated without leaking it.
pub fn fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest.iter().take(4).map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
#[path = "cipher_tests.rs"]
mod cipher_tests;
