use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AccessError;

/// The four roles a token may carry. Anything else is rejected before it reaches the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    Facilitator,
    Analyst,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::User, Role::Facilitator, Role::Analyst];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::Facilitator => "facilitator",
            Role::Analyst => "analyst",
        }
    }
}

impl FromStr for Role {
    type Err = AccessError;

    /// Exact, case-sensitive match against the whitelist.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| AccessError::UnknownRole(s.to_string()))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Identity payload sealed inside a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Claims {
    pub email: String,
    pub role: Role,
}

impl Claims {
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        Self { email: email.into(), role }
    }
}

/// Wire shape used when opening a token: the role stays a plain string until it has been
/// checked, so an unrecognised role is reported as such rather than as a decode error.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawClaims {
    pub email: String,
    pub role: String,
}

impl TryFrom<RawClaims> for Claims {
    type Error = AccessError;

    fn try_from(raw: RawClaims) -> Result<Self, Self::Error> {
        let role = raw.role.parse::<Role>()?;
        Ok(Claims { email: raw.email, role })
    }
}
