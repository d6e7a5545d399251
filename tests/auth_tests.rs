//! Credential, token and resolver properties: digests never match plaintext,
//! tokens round-trip within their validity window, and resolution collapses
//! invalid-token and deleted-user into one failure kind.

use anyhow::Result;
use chrono::{Duration, Utc};

use maintrack::identity::{authenticate, resolve_identity, TokenService};
use maintrack::models::{Role, User};
use maintrack::security::{hash_password, verify_password};
use maintrack::store::Collection;

use axum::http::{header, HeaderMap, HeaderValue};

fn seeded_user(id: &str) -> User {
    User {
        id: id.into(),
        username: format!("user-{id}"),
        email: format!("{id}@example.com"),
        password_hash: String::new(),
        role: Role::Contributor,
        created_at: Utc::now(),
    }
}

#[test]
fn stored_digest_never_equals_plaintext() -> Result<()> {
    let digest = hash_password("pw1")?;
    assert_ne!(digest, "pw1");
    assert!(verify_password(&digest, "pw1"));
    assert!(!verify_password(&digest, "wrong"));
    Ok(())
}

#[test]
fn token_roundtrip_and_expiry() -> Result<()> {
    let tokens = TokenService::new("itest-secret");
    let issued = tokens.issue("user-42")?;
    assert_eq!(tokens.validate(&issued)?, "user-42");

    let expired = TokenService::with_validity("itest-secret", Duration::seconds(-120));
    let stale = expired.issue("user-42")?;
    let err = expired.validate(&stale).unwrap_err();
    assert_eq!(err.http_status(), 401);
    Ok(())
}

#[test]
fn resolver_returns_the_live_user() -> Result<()> {
    let tokens = TokenService::new("itest-secret");
    let users: Collection<User> = Collection::new();
    users.insert_one(seeded_user("u1"));

    let token = tokens.issue("u1")?;
    let resolved = resolve_identity(&tokens, &users, &token).map_err(anyhow::Error::from)?;
    assert_eq!(resolved.id, "u1");
    Ok(())
}

#[test]
fn resolver_fails_for_deleted_user_with_valid_token() -> Result<()> {
    // A still-valid token stops resolving the moment the user record is gone;
    // the failure is indistinguishable from an invalid token.
    let tokens = TokenService::new("itest-secret");
    let users: Collection<User> = Collection::new();
    users.insert_one(seeded_user("u1"));
    let token = tokens.issue("u1")?;

    users.delete_one("u1");
    let err = resolve_identity(&tokens, &users, &token).unwrap_err();
    assert_eq!(err.http_status(), 401);

    let garbage_err = resolve_identity(&tokens, &users, "not-a-token").unwrap_err();
    assert_eq!(garbage_err.code_str(), err.code_str());
    Ok(())
}

#[test]
fn authenticate_reads_the_bearer_header() -> Result<()> {
    let tokens = TokenService::new("itest-secret");
    let users: Collection<User> = Collection::new();
    users.insert_one(seeded_user("u1"));
    let token = tokens.issue("u1")?;

    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
    let user = authenticate(&tokens, &users, &headers).map_err(anyhow::Error::from)?;
    assert_eq!(user.id, "u1");

    let err = authenticate(&tokens, &users, &HeaderMap::new()).unwrap_err();
    assert_eq!(err.http_status(), 401);
    Ok(())
}
