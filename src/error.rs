//! Unified error model for the access engine.
//! Policy rejections, credential corruption, token rejections and cache faults all share
//! one enum so callers can log a stable code while the public `authorize` contract stays boolean.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("password does not meet the strength policy")]
    InvalidPassword,
    #[error("email address is not syntactically valid")]
    InvalidEmail,
    #[error("stored password hash is not validly encoded: {0}")]
    HashEncoding(String),
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("malformed token: {0}")]
    MalformedToken(String),
    #[error("token failed authentication")]
    DecryptionFailed,
    #[error("malformed claims: {0}")]
    MalformedClaims(String),
    #[error("role '{0}' is not recognised")]
    UnknownRole(String),
    #[error("cache store unavailable: {0}")]
    CacheUnavailable(String),
    #[error("secure random source failed: {0}")]
    RandomSource(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl AccessError {
    /// Stable snake_case code for logs and metrics labels.
    pub fn code_str(&self) -> &'static str {
        match self {
            AccessError::InvalidPassword => "invalid_password",
            AccessError::InvalidEmail => "invalid_email",
            AccessError::HashEncoding(_) => "hash_encoding",
            AccessError::Hashing(_) => "hashing_failed",
            AccessError::MalformedToken(_) => "malformed_token",
            AccessError::DecryptionFailed => "decryption_failed",
            AccessError::MalformedClaims(_) => "malformed_claims",
            AccessError::UnknownRole(_) => "unknown_role",
            AccessError::CacheUnavailable(_) => "cache_unavailable",
            AccessError::RandomSource(_) => "random_source",
            AccessError::Config(_) => "config",
        }
    }

    /// True for every reason a presented token can be turned away.
    pub fn is_token_rejection(&self) -> bool {
        matches!(
            self,
            AccessError::MalformedToken(_)
                | AccessError::DecryptionFailed
                | AccessError::MalformedClaims(_)
                | AccessError::UnknownRole(_)
        )
    }

    /// Map to HTTP status code for the (external) request layer.
    pub fn http_status(&self) -> u16 {
        match self {
            AccessError::InvalidPassword | AccessError::InvalidEmail => 400,
            AccessError::MalformedToken(_)
            | AccessError::DecryptionFailed
            | AccessError::MalformedClaims(_)
            | AccessError::UnknownRole(_) => 401,
            AccessError::CacheUnavailable(_) => 503,
            AccessError::HashEncoding(_)
            | AccessError::Hashing(_)
            | AccessError::RandomSource(_)
            | AccessError::Config(_) => 500,
        }
    }
}

pub type AccessResult<T> = Result<T, AccessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_mapping() {
        assert_eq!(AccessError::InvalidPassword.http_status(), 400);
        assert_eq!(AccessError::InvalidEmail.http_status(), 400);
        assert_eq!(AccessError::MalformedToken("x".into()).http_status(), 401);
        assert_eq!(AccessError::DecryptionFailed.http_status(), 401);
        assert_eq!(AccessError::MalformedClaims("x".into()).http_status(), 401);
        assert_eq!(AccessError::UnknownRole("root".into()).http_status(), 401);
        assert_eq!(AccessError::CacheUnavailable("down".into()).http_status(), 503);
        assert_eq!(AccessError::HashEncoding("bad".into()).http_status(), 500);
        assert_eq!(AccessError::RandomSource("eof".into()).http_status(), 500);
    }

    #[test]
    fn token_rejections_are_grouped() {
        assert!(AccessError::DecryptionFailed.is_token_rejection());
        assert!(AccessError::UnknownRole("root".into()).is_token_rejection());
        assert!(!AccessError::CacheUnavailable("x".into()).is_token_rejection());
        assert!(!AccessError::InvalidPassword.is_token_rejection());
    }

    #[test]
    fn display_carries_detail() {
        let e = AccessError::UnknownRole("root".into());
        assert_eq!(e.to_string(), "role 'root' is not recognised");
        assert_eq!(e.code_str(), "unknown_role");
    }
}
