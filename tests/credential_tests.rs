//! Credential integration tests: enrolment policy, hashing, and issuing a session token
//! from a verified credential.

use std::sync::Arc;

use anyhow::Result;

use cce_access::identity::{AccessControl, AccessContext, Authenticator, Credential, Role};
use cce_access::storage::MemoryStore;
use cce_access::{AccessConfig, AccessError, HashSettings, PasswordHasher};

const PASSWORD: &str = "TTT323dsa432!!";

fn hasher() -> PasswordHasher {
    PasswordHasher::new(HashSettings { memory_kib: 1024, iterations: 1, parallelism: 1 }).expect("hasher")
}

#[test]
fn enrolment_enforces_policy() {
    let h = hasher();
    assert_eq!(Credential::enroll("test", PASSWORD, Role::User, &h).unwrap_err(), AccessError::InvalidEmail);
    assert_eq!(Credential::enroll("test@test.com", "Tddfdafadfasdf", Role::User, &h).unwrap_err(), AccessError::InvalidPassword);
    assert_eq!(Credential::enroll("test@test.com", "31341421241", Role::User, &h).unwrap_err(), AccessError::InvalidPassword);
    assert_eq!(Credential::enroll("test@test.com", "TTTddafadfadfa!", Role::User, &h).unwrap_err(), AccessError::InvalidPassword);
}

#[test]
fn enrolled_credential_verifies_only_its_password() -> Result<()> {
    let h = hasher();
    let cred = Credential::enroll("test@test.com", PASSWORD, Role::Facilitator, &h)?;
    assert_ne!(cred.password_hash, PASSWORD);
    assert!(cred.verify(PASSWORD, &h)?);
    assert!(!cred.verify(&format!("{}x", PASSWORD), &h)?);
    Ok(())
}

#[test]
fn re_enrolling_the_same_password_changes_the_hash() -> Result<()> {
    let h = hasher();
    let a = Credential::enroll("test@test.com", PASSWORD, Role::User, &h)?;
    let b = Credential::enroll("test@test.com", PASSWORD, Role::User, &h)?;
    assert_ne!(a.password_hash, b.password_hash);
    Ok(())
}

#[test]
fn corrupt_stored_hash_surfaces_as_error() {
    let h = hasher();
    let cred = Credential { email: "test@test.com".into(), role: Role::User, password_hash: "!!corrupt!!".into() };
    assert!(matches!(cred.verify(PASSWORD, &h), Err(AccessError::HashEncoding(_))));
}

#[test]
fn credential_round_trips_through_json() -> Result<()> {
    let cred = Credential::enroll("test@test.com", PASSWORD, Role::Analyst, &hasher())?;
    let json = serde_json::to_string(&cred)?;
    assert!(json.contains(r#""role":"analyst""#));
    let back: Credential = serde_json::from_str(&json)?;
    assert_eq!(back, cred);
    Ok(())
}

#[tokio::test]
async fn login_flow_issues_an_authorized_token() -> Result<()> {
    let mut cfg = AccessConfig::with_secret("TestTest12345678909843434");
    cfg.hash = HashSettings { memory_kib: 1024, iterations: 1, parallelism: 1 };
    let kv = MemoryStore::default();
    let ctx = AccessContext::init(&cfg, Arc::new(kv.clone()))?;
    let auth = Authenticator::new(ctx);
    let hasher = auth.context().hasher();

    let cred = Credential::enroll("test@test.com", PASSWORD, Role::Admin, hasher)?;
    assert!(cred.verify(PASSWORD, hasher)?);
    let token = auth.seal(&cred.claims())?;

    assert!(auth.authorize(&token).await);
    assert_eq!(kv.lookup(&token).as_deref(), Some("admin"));
    assert_eq!(auth.open(&token)?, cred.claims());
    Ok(())
}
