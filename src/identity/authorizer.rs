//! Cache-first authorization of bearer tokens.
//!
//! A token is authorized when the cache holds a whitelisted role for it, or, on a miss,
//! when it opens under the token key to claims with a whitelisted role; that role is then
//! written back with the configured TTL. A store that errors or exceeds its timeout counts
//! as a miss. The public answer is a bare bool; the specific reason travels in
//! [`AuthzDecision`] and the `cce::access::authz` log target.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::cipher::{fingerprint, Token};
use super::claims::{Claims, Role};
use super::context::AccessContext;
use crate::error::{AccessError, AccessResult};

/// The four operations callers need from the access engine. Alternate ciphers or cache
/// backends plug in behind this without touching request handlers.
#[async_trait]
pub trait AccessControl: Send + Sync {
    fn seal(&self, claims: &Claims) -> AccessResult<Token>;
    fn open(&self, token: &str) -> AccessResult<Claims>;
    async fn authorize(&self, token: &str) -> bool;
    /// Drop the cached decision for `token`, forcing the next request through the cipher.
    async fn revoke(&self, token: &str) -> AccessResult<u64>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// The cache held something other than a whitelisted role.
    CorruptCacheEntry(String),
    /// The token itself was rejected by the cipher.
    Token(AccessError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthzDecision {
    Cached(Role),
    Derived(Role),
    Denied(DenyReason),
}

impl AuthzDecision {
    pub fn is_allowed(&self) -> bool { !matches!(self, AuthzDecision::Denied(_)) }

    pub fn role(&self) -> Option<Role> {
        match self {
            AuthzDecision::Cached(r) | AuthzDecision::Derived(r) => Some(*r),
            AuthzDecision::Denied(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Authenticator {
    ctx: Arc<AccessContext>,
}

impl Authenticator {
    pub fn new(ctx: Arc<AccessContext>) -> Self { Self { ctx } }

    pub fn context(&self) -> &Arc<AccessContext> { &self.ctx }

    pub async fn authorize_detailed(&self, token: &str) -> AuthzDecision {
        let fp = fingerprint(token);
        if let Some(value) = self.cache_get(token, &fp).await {
            return match value.parse::<Role>() {
                Ok(role) => {
                    debug!(target: "cce::access::authz", "token={} cache hit role={}", fp, role);
                    AuthzDecision::Cached(role)
                }
                Err(_) => {
                    warn!(target: "cce::access::authz", "token={} cache holds non-role value; denying", fp);
                    AuthzDecision::Denied(DenyReason::CorruptCacheEntry(value))
                }
            };
        }
        match self.ctx.cipher().open(token) {
            Ok(claims) => {
                self.cache_put(token, claims.role, &fp).await;
                debug!(target: "cce::access::authz", "token={} derived role={}", fp, claims.role);
                AuthzDecision::Derived(claims.role)
            }
            Err(e) => {
                debug!(target: "cce::access::authz", "token={} rejected code={}: {}", fp, e.code_str(), e);
                AuthzDecision::Denied(DenyReason::Token(e))
            }
        }
    }

    async fn cache_get(&self, token: &str, fp: &str) -> Option<String> {
        let limit = self.ctx.settings().cache_timeout;
        match timeout(limit, self.ctx.store().get(token)).await {
            Ok(Ok(v)) => v,
            Ok(Err(e)) => {
                warn!(target: "cce::access::authz", "token={} cache lookup failed, treating as miss: {}", fp, e);
                None
            }
            Err(_) => {
                warn!(target: "cce::access::authz", "token={} cache lookup exceeded {}ms, treating as miss", fp, limit.as_millis());
                None
            }
        }
    }

    async fn cache_put(&self, token: &str, role: Role, fp: &str) {
        let settings = self.ctx.settings();
        match timeout(settings.cache_timeout, self.ctx.store().set(token, role.as_str(), settings.cache_ttl)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(target: "cce::access::authz", "token={} failed to cache role: {}", fp, e),
            Err(_) => warn!(target: "cce::access::authz", "token={} cache write exceeded {}ms", fp, settings.cache_timeout.as_millis()),
        }
    }
}

#[async_trait]
impl AccessControl for Authenticator {
    fn seal(&self, claims: &Claims) -> AccessResult<Token> { self.ctx.cipher().seal(claims) }

    fn open(&self, token: &str) -> AccessResult<Claims> { self.ctx.cipher().open(token) }

    async fn authorize(&self, token: &str) -> bool { self.authorize_detailed(token).await.is_allowed() }

    async fn revoke(&self, token: &str) -> AccessResult<u64> {
        let limit = self.ctx.settings().cache_timeout;
        let removed = timeout(limit, self.ctx.store().del(token))
            .await
            .map_err(|_| AccessError::CacheUnavailable(format!("delete exceeded {}ms", limit.as_millis())))??;
        debug!(target: "cce::access::authz", "token={} revoked entries={}", fingerprint(token), removed);
        Ok(removed)
    }
}
