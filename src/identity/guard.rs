//! Access predicates derived from a resolved identity: authenticated callers,
//! administrators and the ownership-or-admin mutation rule.

use axum::http::{header, HeaderMap};

use crate::error::{AppError, AppResult};
use crate::models::{Role, User};
use crate::store::Collection;

use super::{resolve_identity, TokenService};

fn auth_failure() -> AppError {
    AppError::auth("invalid_token", "invalid authentication credentials")
}

/// Extract the bearer token from the Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> AppResult<&str> {
    let value = headers.get(header::AUTHORIZATION).ok_or_else(auth_failure)?;
    let s = value.to_str().map_err(|_| auth_failure())?;
    s.strip_prefix("Bearer ").map(str::trim).ok_or_else(auth_failure)
}

/// Resolve the caller from request headers; every gated endpoint goes through
/// here first.
pub fn authenticate(tokens: &TokenService, users: &Collection<User>, headers: &HeaderMap) -> AppResult<User> {
    let token = bearer_token(headers)?;
    resolve_identity(tokens, users, token)
}

/// Admin-only actions fail with a permission error for everyone else.
pub fn require_admin(user: &User) -> AppResult<()> {
    if user.role == Role::Admin {
        Ok(())
    } else {
        Err(AppError::forbidden("admin_required", "admin access required"))
    }
}

/// The single mutation rule for every tracked-entity kind: administrators may
/// mutate anything, everyone else only their own records. Evaluated after the
/// entity fetch so not-found is reported before permission.
pub fn can_mutate(user: &User, created_by: &str) -> bool {
    user.role == Role::Admin || created_by == user.id
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Utc;

    fn user(id: &str, role: Role) -> User {
        User {
            id: id.into(),
            username: id.into(),
            email: format!("{id}@example.com"),
            password_hash: String::new(),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn bearer_token_parses_authorization_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn missing_or_malformed_header_is_auth_failure() {
        let headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers).unwrap_err().http_status(), 401);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(bearer_token(&headers).unwrap_err().http_status(), 401);
    }

    #[test]
    fn require_admin_gates_on_role() {
        assert!(require_admin(&user("a", Role::Admin)).is_ok());
        let err = require_admin(&user("b", Role::Contributor)).unwrap_err();
        assert_eq!(err.http_status(), 403);
    }

    #[test]
    fn can_mutate_owner_or_admin() {
        let owner = user("u1", Role::Contributor);
        let other = user("u2", Role::Contributor);
        let admin = user("u3", Role::Admin);
        assert!(can_mutate(&owner, "u1"));
        assert!(!can_mutate(&other, "u1"));
        assert!(can_mutate(&admin, "u1"));
    }
}
