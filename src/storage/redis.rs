//! Redis-backed [`CacheStore`]. Compiled only with the `redis` feature.
//!
//! Uses a `ConnectionManager`, which multiplexes one connection and reconnects on failure;
//! each call works on a cheap clone of the manager. Connection pooling beyond that is left
//! to Redis itself.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;

use super::CacheStore;
use crate::error::{AccessError, AccessResult};

#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

fn unavailable(e: redis::RedisError) -> AccessError { AccessError::CacheUnavailable(e.to_string()) }

impl RedisStore {
    pub async fn connect(url: &str) -> AccessResult<Self> {
        let client = redis::Client::open(url).map_err(|e| AccessError::Config(format!("redis url: {}", e)))?;
        let manager = ConnectionManager::new(client).await.map_err(unavailable)?;
        let store = Self { manager };
        store.ping().await?;
        Ok(store)
    }

    /// Round-trip a PING; `connect` calls this so a bad URL or dead server fails at startup.
    pub async fn ping(&self) -> AccessResult<()> {
        let mut conn = self.manager.clone();
        redis::cmd("PING").query_async::<_, String>(&mut conn).await.map_err(unavailable)?;
        Ok(())
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> AccessResult<Option<String>> {
        let mut conn = self.manager.clone();
        redis::cmd("GET").arg(key).query_async::<_, Option<String>>(&mut conn).await.map_err(unavailable)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AccessResult<()> {
        // PX takes milliseconds and rejects 0
        let ms = ttl.as_millis().clamp(1, u64::MAX as u128) as u64;
        let mut conn = self.manager.clone();
        redis::cmd("SET").arg(key).arg(value).arg("PX").arg(ms)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(unavailable)
    }

    async fn del(&self, key: &str) -> AccessResult<u64> {
        let mut conn = self.manager.clone();
        redis::cmd("DEL").arg(key).query_async::<_, u64>(&mut conn).await.map_err(unavailable)
    }

    fn backend(&self) -> &'static str { "redis" }
}
