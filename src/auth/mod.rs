use error_stack::{Report, Result, ResultExt};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::spawn_blocking;

use crate::schema::{InsertUser, UserId, UserProfile};
use crate::store::{StoreError, UserStore};

mod password;
mod token;

pub use password::{HashPasswordError, PasswordHasher, VerifyPasswordError};
pub use token::{EncodeTokenError, TokenError, TokenService};

/// Error taxonomy of the auth core.
///
/// `InvalidCredentials` intentionally covers both an unknown username
/// and a wrong password; callers must not be able to tell the two
/// apart. `UserNotFound` is the odd one out: the token was fine but
/// the user behind it is gone. Transports may still collapse it into
/// a generic unauthorized response.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid session token")]
    InvalidToken,
    #[error("session token has expired")]
    TokenExpired,
    #[error("user behind the session token no longer exists")]
    UserNotFound,
    #[error("username is already taken")]
    UsernameTaken,
    #[error("internal authentication error")]
    Internal,
}

/// Orchestrates credential verification, token issuance and profile
/// resolution over its collaborators.
///
/// Every operation is a stateless read/verify followed by at most one
/// token creation. All failures are terminal for the calling request;
/// nothing in here retries.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    tokens: TokenService,
}

impl AuthService {
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>, hasher: PasswordHasher, tokens: TokenService) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    /// Looks up the user and checks the password against the stored
    /// hash.
    ///
    /// An unknown username and a wrong password fail with the same
    /// error kind, so the response never leaks whether an account
    /// exists.
    #[tracing::instrument(skip_all, name = "auth.authenticate")]
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserProfile, AuthError> {
        let user = self
            .users
            .find_by_username(username)
            .await
            .change_context(AuthError::Internal)?;

        let Some(user) = user else {
            return Err(Report::new(AuthError::InvalidCredentials));
        };

        let hasher = self.hasher;
        let password = password.to_owned();
        let stored_hash = user.password_hash.clone();

        // argon2 is CPU-bound on purpose; keep it off the async workers.
        let matched = spawn_blocking(move || hasher.verify(password, &stored_hash))
            .await
            .change_context(AuthError::Internal)?
            .change_context(AuthError::Internal)?;

        if !matched {
            return Err(Report::new(AuthError::InvalidCredentials));
        }

        Ok(user.into_profile())
    }

    /// Mints a session token for an already-authenticated user.
    ///
    /// Pure function of the user id; no side effects on the store.
    #[tracing::instrument(skip_all, name = "auth.login")]
    pub fn login(&self, user: &UserProfile) -> Result<String, AuthError> {
        self.tokens
            .issue(user.id)
            .change_context(AuthError::Internal)
    }

    /// Verifies a token's signature and expiry without touching the
    /// store. The streaming endpoints use this cheaper path.
    pub fn verify_token(&self, token: &str) -> Result<UserId, AuthError> {
        self.tokens.verify(token).map_err(map_token_error)
    }

    /// Verifies the token, then resolves the embedded user id against
    /// the store.
    #[tracing::instrument(skip_all, name = "auth.get_profile")]
    pub async fn get_profile(&self, token: &str) -> Result<UserProfile, AuthError> {
        let user_id = self.verify_token(token)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await
            .change_context(AuthError::Internal)?;

        match user {
            Some(user) => Ok(user.into_profile()),
            // The token outlived its user record.
            None => Err(Report::new(AuthError::UserNotFound)),
        }
    }

    /// Hashes the password and inserts a new user through the store.
    #[tracing::instrument(skip_all, name = "auth.register")]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, AuthError> {
        let hasher = self.hasher;
        let password = password.to_owned();

        let password_hash = spawn_blocking(move || hasher.hash(password))
            .await
            .change_context(AuthError::Internal)?
            .change_context(AuthError::Internal)?;

        let form = InsertUser {
            name: username,
            email,
            password_hash: &password_hash,
        };

        let user = self
            .users
            .insert(form)
            .await
            .map_err(|report| match report.current_context() {
                StoreError::NameTaken => report.change_context(AuthError::UsernameTaken),
                StoreError::Unavailable => report.change_context(AuthError::Internal),
            })?;

        Ok(user.into_profile())
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService").finish_non_exhaustive()
    }
}

fn map_token_error(report: Report<TokenError>) -> Report<AuthError> {
    let kind = match report.current_context() {
        TokenError::Expired => AuthError::TokenExpired,
        TokenError::Malformed | TokenError::BadSignature => AuthError::InvalidToken,
    };

    report.change_context(kind)
}
