//! Stateless bearer tokens: HS256-signed claims with a fixed validity window.
//! There is no revocation list; logout is client-local and a token stays
//! acceptable until its expiry elapses.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Fixed validity window for issued tokens.
pub const TOKEN_VALIDITY_HOURS: i64 = 24;

/// Signed claim set carried by every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject identity (user id).
    pub sub: String,
    /// Absolute expiry, seconds since the epoch.
    pub exp: i64,
}

/// Issues and validates signed session tokens against a process-wide secret.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validity: Duration,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self::with_validity(secret, Duration::hours(TOKEN_VALIDITY_HOURS))
    }

    /// Construct with an explicit validity window. Tests use short or negative
    /// windows to exercise expiry.
    pub fn with_validity(secret: &str, validity: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validity,
        }
    }

    /// Embed the subject identity and an absolute expiry, then sign.
    pub fn issue(&self, subject: &str) -> AppResult<String> {
        let claims = Claims {
            sub: subject.to_string(),
            exp: (Utc::now() + self.validity).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::internal("token_issue_failed", e.to_string()))
    }

    /// Verify signature and expiry, returning the subject identity.
    /// Bad signature, undecodable payload and elapsed expiry all collapse into
    /// the same generic authentication failure.
    pub fn validate(&self, token: &str) -> AppResult<String> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims.sub)
            .map_err(|_| AppError::auth("invalid_token", "invalid authentication credentials"))
    }
}
