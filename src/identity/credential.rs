use serde::{Deserialize, Serialize};
use tracing::debug;

use super::claims::{Claims, Role};
use crate::error::AccessResult;
use crate::security::{check_email, check_password, PasswordHasher};

/// Durable user credential as kept by the (external) user-record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub email: String,
    pub role: Role,
    /// Base64-encoded password hash produced by [`PasswordHasher::hash`].
    pub password_hash: String,
}

impl Credential {
    /// Validate email and password against policy, then hash the password.
    pub fn enroll(email: &str, password: &str, role: Role, hasher: &PasswordHasher) -> AccessResult<Self> {
        check_email(email)?;
        check_password(password)?;
        let password_hash = hasher.hash(password)?;
        debug!(target: "cce::access::hasher", "credential enrolled role={}", role);
        Ok(Self { email: email.to_string(), role, password_hash })
    }

    /// `Ok(false)` for a wrong password; an error only if the stored hash is corrupt.
    pub fn verify(&self, password: &str, hasher: &PasswordHasher) -> AccessResult<bool> {
        hasher.verify(&self.password_hash, password)
    }

    /// Claims to seal into a session token for this user.
    pub fn claims(&self) -> Claims { Claims::new(self.email.clone(), self.role) }
}
