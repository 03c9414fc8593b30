//! cce-access: authentication and authorization primitives for the CCE application.
//!
//! - [`security`]: password/email policy and Argon2id credential hashing.
//! - [`identity`]: AES-256-GCM sealed bearer tokens and the cache-first [`identity::Authenticator`].
//! - [`storage`]: the key-value cache contract and its backends.
//! - [`config`] and [`error`]: ambient configuration and the shared error type.

pub mod config;
pub mod error;
pub mod identity;
pub mod security;
pub mod storage;

pub use config::{AccessConfig, HashSettings};
pub use error::{AccessError, AccessResult};
pub use identity::{AccessContext, AccessControl, Authenticator, Claims, Credential, Role, TokenCipher};
pub use security::{validate_email, validate_password, PasswordHasher};
pub use storage::{CacheStore, MemoryStore};
