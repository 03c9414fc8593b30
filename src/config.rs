//! Runtime configuration for the access engine.
//!
//! Values come from `CCE_*` environment variables with defaults, mirroring how the
//! server binaries read their `*_PORT`/`*_FOLDER` settings. The operator secret is
//! held only long enough to derive the token key and is never printed.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use zeroize::Zeroizing;

use crate::error::{AccessError, AccessResult};

pub const ENV_SECRET: &str = "CCE_SECRET";
pub const ENV_CACHE_TTL_SECS: &str = "CCE_CACHE_TTL_SECS";
pub const ENV_CACHE_TIMEOUT_MS: &str = "CCE_CACHE_TIMEOUT_MS";
pub const ENV_REDIS_URL: &str = "CCE_REDIS_URL";
pub const ENV_HASH_MEMORY_KIB: &str = "CCE_HASH_MEMORY_KIB";
pub const ENV_HASH_ITERATIONS: &str = "CCE_HASH_ITERATIONS";
pub const ENV_HASH_PARALLELISM: &str = "CCE_HASH_PARALLELISM";

/// Argon2id work factor. Defaults follow the OWASP moderate profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HashSettings {
    #[serde(default = "HashSettings::default_memory_kib")]
    pub memory_kib: u32,
    #[serde(default = "HashSettings::default_iterations")]
    pub iterations: u32,
    #[serde(default = "HashSettings::default_parallelism")]
    pub parallelism: u32,
}

impl HashSettings {
    fn default_memory_kib() -> u32 { 19_456 }
    fn default_iterations() -> u32 { 2 }
    fn default_parallelism() -> u32 { 1 }

    pub fn from_env() -> AccessResult<Self> { Self::from_lookup(|k| std::env::var(k).ok()) }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> AccessResult<Self> {
        let mut s = Self::default();
        if let Some(v) = parse_var::<u32, _>(&lookup, ENV_HASH_MEMORY_KIB)? { s.memory_kib = v; }
        if let Some(v) = parse_var::<u32, _>(&lookup, ENV_HASH_ITERATIONS)? { s.iterations = v; }
        if let Some(v) = parse_var::<u32, _>(&lookup, ENV_HASH_PARALLELISM)? { s.parallelism = v; }
        Ok(s)
    }
}

impl Default for HashSettings {
    fn default() -> Self {
        Self {
            memory_kib: Self::default_memory_kib(),
            iterations: Self::default_iterations(),
            parallelism: Self::default_parallelism(),
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct AccessConfig {
    /// Operator secret the token key is derived from.
    #[serde(deserialize_with = "deserialize_secret")]
    pub secret: Zeroizing<String>,
    /// Lifetime of a derived authorization entry in the cache store.
    #[serde(default = "AccessConfig::default_cache_ttl", with = "duration_secs")]
    pub cache_ttl: Duration,
    /// Upper bound on a single cache store round-trip; exceeding it counts as a miss.
    #[serde(default = "AccessConfig::default_cache_timeout", with = "duration_millis")]
    pub cache_timeout: Duration,
    /// When set (and the `redis` feature is enabled) the cache lives in Redis.
    #[serde(default)]
    pub redis_url: Option<String>,
    #[serde(default)]
    pub hash: HashSettings,
}

impl AccessConfig {
    fn default_cache_ttl() -> Duration { Duration::from_secs(60 * 60) }
    fn default_cache_timeout() -> Duration { Duration::from_millis(250) }

    /// Programmatic construction with defaults for everything but the secret.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: Zeroizing::new(secret.into()),
            cache_ttl: Self::default_cache_ttl(),
            cache_timeout: Self::default_cache_timeout(),
            redis_url: None,
            hash: HashSettings::default(),
        }
    }

    pub fn from_env() -> AccessResult<Self> { Self::from_lookup(|k| std::env::var(k).ok()) }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> AccessResult<Self> {
        let secret = lookup(ENV_SECRET).unwrap_or_default();
        if secret.is_empty() {
            return Err(AccessError::Config(format!("{} is not set", ENV_SECRET)));
        }
        let mut cfg = Self::with_secret(secret);
        if let Some(secs) = parse_var::<u64, _>(&lookup, ENV_CACHE_TTL_SECS)? {
            if secs == 0 { return Err(AccessError::Config(format!("{} must be positive", ENV_CACHE_TTL_SECS))); }
            cfg.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, ENV_CACHE_TIMEOUT_MS)? {
            cfg.cache_timeout = Duration::from_millis(ms);
        }
        cfg.redis_url = lookup(ENV_REDIS_URL).filter(|s| !s.trim().is_empty());
        cfg.hash = HashSettings::from_lookup(&lookup)?;
        Ok(cfg)
    }
}

impl fmt::Debug for AccessConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessConfig")
            .field("secret", &"<redacted>")
            .field("cache_ttl", &self.cache_ttl)
            .field("cache_timeout", &self.cache_timeout)
            .field("redis_url", &self.redis_url.as_ref().map(|_| "<set>"))
            .field("hash", &self.hash)
            .finish()
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> AccessResult<Option<T>>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>()
            .map(Some)
            .map_err(|_| AccessError::Config(format!("{}='{}' is not a valid number", name, raw))),
    }
}

fn deserialize_secret<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Zeroizing<String>, D::Error> {
    let s = String::deserialize(d)?;
    if s.is_empty() { return Err(serde::de::Error::custom("secret must not be empty")); }
    Ok(Zeroizing::new(s))
}

mod duration_secs {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let m: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| m.get(k).cloned()
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let cfg = AccessConfig::from_lookup(lookup_from(&[(ENV_SECRET, "s3cret")])).unwrap();
        assert_eq!(cfg.cache_ttl, Duration::from_secs(3600));
        assert_eq!(cfg.cache_timeout, Duration::from_millis(250));
        assert!(cfg.redis_url.is_none());
        assert_eq!(cfg.hash, HashSettings::default());
        assert_eq!(cfg.secret.as_str(), "s3cret");
    }

    #[test]
    fn missing_secret_is_a_config_error() {
        let err = AccessConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert_eq!(err.code_str(), "config");
        let err = AccessConfig::from_lookup(lookup_from(&[(ENV_SECRET, "")])).unwrap_err();
        assert_eq!(err.code_str(), "config");
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = AccessConfig::from_lookup(lookup_from(&[
            (ENV_SECRET, "k"),
            (ENV_CACHE_TTL_SECS, "120"),
            (ENV_CACHE_TIMEOUT_MS, " 40 "),
            (ENV_REDIS_URL, "redis://127.0.0.1:6379/0"),
            (ENV_HASH_MEMORY_KIB, "4096"),
        ])).unwrap();
        assert_eq!(cfg.cache_ttl, Duration::from_secs(120));
        assert_eq!(cfg.cache_timeout, Duration::from_millis(40));
        assert_eq!(cfg.redis_url.as_deref(), Some("redis://127.0.0.1:6379/0"));
        assert_eq!(cfg.hash.memory_kib, 4096);
        assert_eq!(cfg.hash.iterations, 2);
    }

    #[test]
    fn bad_numbers_and_zero_ttl_are_rejected() {
        assert!(AccessConfig::from_lookup(lookup_from(&[(ENV_SECRET, "k"), (ENV_CACHE_TTL_SECS, "soon")])).is_err());
        assert!(AccessConfig::from_lookup(lookup_from(&[(ENV_SECRET, "k"), (ENV_CACHE_TTL_SECS, "0")])).is_err());
    }

    #[test]
    fn debug_never_prints_the_secret() {
        let cfg = AccessConfig::with_secret("super-secret-value");
        let dbg = format!("{:?}", cfg);
        assert!(!dbg.contains("super-secret-value"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn deserializes_from_json() {
        let cfg: AccessConfig = serde_json::from_str(r#"{"secret":"abc","cache_ttl":60,"cache_timeout":10}"#).unwrap();
        assert_eq!(cfg.cache_ttl, Duration::from_secs(60));
        assert_eq!(cfg.cache_timeout, Duration::from_millis(10));
        assert!(serde_json::from_str::<AccessConfig>(r#"{"secret":""}"#).is_err());
    }
}
