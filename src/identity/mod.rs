//! Token issuance and authorization for CCE sessions.
//! Keep the public surface thin and split implementation across sub-modules.

mod claims;
mod cipher;
mod context;
mod credential;
mod authorizer;

pub use claims::{Claims, Role};
pub use cipher::{fingerprint, SymmetricKey, Token, TokenCipher, KEY_LEN, NONCE_LEN};
pub use context::{AccessContext, AuthzSettings};
pub use credential::Credential;
pub use authorizer::{AccessControl, Authenticator, AuthzDecision, DenyReason};
