use chrono::{DateTime, Duration, Utc};
use error_stack::{Report, Result, ResultExt};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::UserId;

const ISSUER: &str = "gatehouse.auth";

/// How long an issued session token stays valid.
const VALIDITY_HOURS: i64 = 24;

#[derive(Debug, Deserialize, Serialize)]
struct Claims {
    sub: i64,
    iat: i64,
    exp: i64,
    iss: String,
}

#[derive(Debug, Error)]
#[error("Failed to encode session token")]
pub struct EncodeTokenError;

/// Reasons a session token can fail verification.
///
/// Expiry is deliberately distinct from the malformed/forged cases so
/// callers can tell a stale session apart from a bad one.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("session token is malformed")]
    Malformed,
    #[error("session token has an invalid signature")]
    BadSignature,
    #[error("session token has expired")]
    Expired,
}

/// Issues and verifies signed, self-contained session tokens.
///
/// Tokens are HS512 JWTs carrying the user id as subject, valid for a
/// fixed 24 hours from issuance. The signing key is injected once at
/// construction and never rotated while the process lives. Since
/// verification is pure signature plus expiry checking, there is no
/// server-side revocation — a known limitation of this design.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Mints a token bound to `user_id`, valid for the next 24 hours.
    pub fn issue(&self, user_id: UserId) -> Result<String, EncodeTokenError> {
        self.issue_at(user_id, Utc::now())
    }

    pub(crate) fn issue_at(
        &self,
        user_id: UserId,
        issued_at: DateTime<Utc>,
    ) -> Result<String, EncodeTokenError> {
        let claims = Claims {
            sub: user_id.0,
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::hours(VALIDITY_HOURS)).timestamp(),
            iss: ISSUER.to_string(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS512), &claims, &self.encoding)
            .change_context(EncodeTokenError)
    }

    /// Verifies a token and returns the user id it was bound to.
    ///
    /// Pure verification; no I/O, no side effects.
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let mut validation = Validation::new(Algorithm::HS512);
        validation.leeway = 0;
        validation.set_issuer(&[ISSUER]);

        match jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => Ok(UserId(data.claims.sub)),
            Err(error) => {
                let kind = match error.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                        TokenError::BadSignature
                    }
                    _ => TokenError::Malformed,
                };

                Err(Report::new(error).change_context(kind))
            }
        }
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("unit-test-signing-key")
    }

    #[test]
    fn roundtrips_the_user_id() {
        let tokens = service();
        for id in [1, 42, i64::MAX] {
            let token = tokens.issue(UserId(id)).unwrap();
            assert_eq!(tokens.verify(&token).unwrap(), UserId(id));
        }
    }

    #[test]
    fn expiry_is_expired_not_malformed() {
        let tokens = service();
        let issued_at = Utc::now() - Duration::hours(VALIDITY_HOURS + 1);
        let token = tokens.issue_at(UserId(7), issued_at).unwrap();

        let report = tokens.verify(&token).unwrap_err();
        assert_eq!(*report.current_context(), TokenError::Expired);
    }

    #[test]
    fn tokens_stay_valid_inside_the_window() {
        let tokens = service();
        let issued_at = Utc::now() - Duration::hours(VALIDITY_HOURS - 1);
        let token = tokens.issue_at(UserId(7), issued_at).unwrap();

        assert_eq!(tokens.verify(&token).unwrap(), UserId(7));
    }

    #[test]
    fn garbage_is_malformed() {
        let report = service().verify("definitely-not-a-jwt").unwrap_err();
        assert_eq!(*report.current_context(), TokenError::Malformed);
    }

    #[test]
    fn foreign_signatures_are_rejected() {
        let tokens = service();
        let other = TokenService::new("a-different-signing-key");
        let token = other.issue(UserId(7)).unwrap();

        let report = tokens.verify(&token).unwrap_err();
        assert_eq!(*report.current_context(), TokenError::BadSignature);
    }
}
