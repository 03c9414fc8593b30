//!
//! cce-access cache storage
//! ------------------------
//! The authorizer keeps a derived `token -> role` view in a key-value store so a request
//! bearing a known token costs one lookup instead of an AEAD open. The store is never a
//! source of truth: it can be flushed at any time and every entry is re-derived from the
//! token itself on the next request.
//!
//! Backends implement [`CacheStore`]. `MemoryStore` (in-process, TTL-aware) is always
//! available; a Redis backend is compiled in with the `redis` feature.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::config::AccessConfig;
use crate::error::AccessResult;

pub mod kv;
#[cfg(feature = "redis")]
pub mod redis;

pub use kv::{MemoryStore, StoreSettings};
#[cfg(feature = "redis")]
pub use self::redis::RedisStore;

/// Minimal get/set/delete-with-expiry contract the authorizer consumes.
///
/// Implementations must be safe for concurrent use. Absence and connection failure are
/// not distinguished by callers; errors should be reported as `CacheUnavailable`.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> AccessResult<Option<String>>;
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AccessResult<()>;
    /// Remove `key`; returns the number of entries removed (0 or 1).
    async fn del(&self, key: &str) -> AccessResult<u64>;
    /// Backend label for logs.
    fn backend(&self) -> &'static str;
}

/// Pick the backend named by the config: Redis when a URL is set, otherwise in-memory.
pub async fn store_from_config(config: &AccessConfig) -> AccessResult<Arc<dyn CacheStore>> {
    match config.redis_url.as_deref() {
        Some(url) => connect_redis(url).await,
        None => {
            info!(target: "cce::access::store", "using in-memory authorization cache");
            Ok(Arc::new(MemoryStore::new(StoreSettings::default())))
        }
    }
}

#[cfg(feature = "redis")]
async fn connect_redis(url: &str) -> AccessResult<Arc<dyn CacheStore>> {
    let store = RedisStore::connect(url).await?;
    info!(target: "cce::access::store", "using redis authorization cache");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "redis"))]
async fn connect_redis(_url: &str) -> AccessResult<Arc<dyn CacheStore>> {
    Err(crate::error::AccessError::Config("a redis url was configured but this build lacks the `redis` feature".into()))
}
