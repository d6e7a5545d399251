//! Resolve a bearer token to a live user record.
//!
//! This is the single point where "invalid token" and "valid token for a
//! deleted user" collapse into one failure kind, so callers cannot tell which
//! case occurred. Because the user collection is re-read on every resolution,
//! a token issued before a user's deletion stops resolving immediately.

use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::store::Collection;

use super::TokenService;

pub fn resolve_identity(tokens: &TokenService, users: &Collection<User>, token: &str) -> AppResult<User> {
    let subject = tokens.validate(token)?;
    users
        .find_one(&subject)
        .ok_or_else(|| AppError::auth("invalid_token", "invalid authentication credentials"))
}
