use std::collections::HashMap as StdHashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::CacheStore;
use crate::error::AccessResult;

/// Share of `max_entries` evicted at once when a full store must make room.
const EVICT_DIVISOR: usize = 8;

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct StoreSettings {
    /// Label used in logs.
    pub name: String,
    /// Upper bound on live entries. When reached, expired keys are swept first and then the
    /// entries closest to expiry are evicted, one eighth of the bound at a time. `None` means
    /// unbounded.
    #[serde(default)]
    pub max_entries: Option<usize>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self { name: "authz".to_string(), max_entries: Some(100_000) }
    }
}

#[derive(Clone, Debug)]
struct Entry {
    value: String,
    /// Optional expiry time
    expires_at: Option<Instant>,
}

impl Entry {
    fn expired(&self, now: Instant) -> bool { self.expires_at.map(|exp| now >= exp).unwrap_or(false) }
}

/// In-process key-value store with per-key expiry. Cloning shares the underlying map.
#[derive(Clone)]
pub struct MemoryStore {
    settings: StoreSettings,
    map: Arc<parking_lot::RwLock<StdHashMap<String, Entry>>>,
}

impl MemoryStore {
    pub fn new(settings: StoreSettings) -> Self {
        Self { settings, map: Arc::new(parking_lot::RwLock::new(StdHashMap::new())) }
    }

    pub fn settings(&self) -> &StoreSettings { &self.settings }

    /// Set a key with optional TTL. A zero TTL stores nothing.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>, ttl: Option<Duration>) {
        if ttl == Some(Duration::ZERO) { return; }
        let key = key.into();
        let now = Instant::now();
        let ent = Entry { value: value.into(), expires_at: ttl.map(|d| now + d) };
        let mut w = self.map.write();
        if let Some(max) = self.settings.max_entries {
            if !w.contains_key(&key) && w.len() >= max {
                Self::make_room(&mut w, now, max, &self.settings.name);
            }
        }
        w.insert(key, ent);
    }

    fn make_room(w: &mut StdHashMap<String, Entry>, now: Instant, max: usize, name: &str) {
        w.retain(|_, e| !e.expired(now));
        if w.len() < max { return; }
        // Free a batch so the next inserts do not rescan a full map.
        let batch = (max / EVICT_DIVISOR).max(1);
        let victims: Vec<String> = {
            let mut order: Vec<_> = w.iter()
                .map(|(k, e)| ((e.expires_at.is_none(), e.expires_at), k))
                .collect();
            if batch < order.len() {
                order.select_nth_unstable_by_key(batch, |(o, _)| *o);
                order.truncate(batch);
            }
            order.into_iter().map(|(_, k)| k.clone()).collect()
        };
        for k in &victims { w.remove(k); }
        debug!(target: "cce::access::store", "store '{}' full; evicted {} entries closest to expiry", name, victims.len());
    }

    /// Get a key. If expired, removes it and returns None.
    pub fn lookup(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        {
            let r = self.map.read();
            match r.get(key) {
                None => return None,
                Some(ent) if !ent.expired(now) => return Some(ent.value.clone()),
                Some(_) => {}
            }
        }
        // Expired: re-check under the write lock, a concurrent insert may have refreshed it.
        let mut w = self.map.write();
        if w.get(key).map(|e| e.expired(now)).unwrap_or(false) {
            w.remove(key);
            return None;
        }
        w.get(key).map(|e| e.value.clone())
    }

    /// Time left before `key` expires; `None` if absent, expired, or stored without TTL.
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.map.read().get(key)
            .and_then(|e| e.expires_at)
            .and_then(|exp| exp.checked_duration_since(now))
            .filter(|d| !d.is_zero())
    }

    pub fn remove(&self, key: &str) -> bool { self.map.write().remove(key).is_some() }
    pub fn clear(&self) { self.map.write().clear(); }
    /// Number of stored entries, including any not yet swept after expiry.
    pub fn len(&self) -> usize { self.map.read().len() }
    pub fn is_empty(&self) -> bool { self.map.read().is_empty() }
    /// Return a snapshot of all keys in this store
    pub fn keys(&self) -> Vec<String> { self.map.read().keys().cloned().collect() }

    /// Remove expired keys. Returns number removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut w = self.map.write();
        let before = w.len();
        w.retain(|_, e| !e.expired(now));
        before - w.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self { Self::new(StoreSettings::default()) }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> AccessResult<Option<String>> { Ok(self.lookup(key)) }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AccessResult<()> {
        self.insert(key, value, Some(ttl));
        Ok(())
    }

    async fn del(&self, key: &str) -> AccessResult<u64> { Ok(u64::from(self.remove(key))) }

    fn backend(&self) -> &'static str { "memory" }
}

#[cfg(test)]
#[path = "kv_tests.rs"]
mod kv_tests;
