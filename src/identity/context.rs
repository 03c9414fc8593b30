use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::cipher::{SymmetricKey, TokenCipher};
use crate::config::AccessConfig;
use crate::error::AccessResult;
use crate::security::PasswordHasher;
use crate::storage::{self, CacheStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthzSettings {
    pub cache_ttl: Duration,
    pub cache_timeout: Duration,
}

/// Process-wide state shared by every component: the token cipher, the cache store client,
/// the password hasher and the timing settings.
///
/// Built once at startup through [`AccessContext::init`] (or [`AccessContext::from_config`])
/// and handed out as `Arc<AccessContext>`. Nothing in it can be replaced afterwards; rotating
/// the secret means building a new context, which invalidates every issued token.
pub struct AccessContext {
    cipher: TokenCipher,
    store: Arc<dyn CacheStore>,
    hasher: PasswordHasher,
    settings: AuthzSettings,
}

impl AccessContext {
    pub fn init(config: &AccessConfig, store: Arc<dyn CacheStore>) -> AccessResult<Arc<Self>> {
        let cipher = {
            let key = SymmetricKey::derive(config.secret.as_str());
            TokenCipher::new(&key)?
        };
        let hasher = PasswordHasher::new(config.hash)?;
        let settings = AuthzSettings { cache_ttl: config.cache_ttl, cache_timeout: config.cache_timeout };
        info!(
            target: "cce::access",
            "access context ready: store={} cache_ttl_secs={} cache_timeout_ms={}",
            store.backend(), settings.cache_ttl.as_secs(), settings.cache_timeout.as_millis()
        );
        Ok(Arc::new(Self { cipher, store, hasher, settings }))
    }

    /// Build the store named by the config and the context around it.
    pub async fn from_config(config: &AccessConfig) -> AccessResult<Arc<Self>> {
        let store = storage::store_from_config(config).await?;
        Self::init(config, store)
    }

    pub fn cipher(&self) -> &TokenCipher { &self.cipher }
    pub fn store(&self) -> &Arc<dyn CacheStore> { &self.store }
    pub fn hasher(&self) -> &PasswordHasher { &self.hasher }
    pub fn settings(&self) -> AuthzSettings { self.settings }
}

impl fmt::Debug for AccessContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessContext")
            .field("cipher", &self.cipher)
            .field("store", &self.store.backend())
            .field("settings", &self.settings)
            .finish()
    }
}
