use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier as _};
use error_stack::{Report, Result, ResultExt};
use once_cell::sync::Lazy;
use thiserror::Error;

static CONTEXT: Lazy<Argon2<'static>> = Lazy::new(|| {
    Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2::Params::default(),
    )
});

#[derive(Debug, Error)]
#[error("Failed to generate password hash")]
pub struct HashPasswordError;

#[derive(Debug, Error)]
#[error("Failed to verify password")]
pub struct VerifyPasswordError;

/// One-way salted password hashing.
///
/// Every call to [`hash`](PasswordHasher::hash) draws a fresh random
/// salt, so hashing the same password twice yields different strings.
/// Verification re-derives the hash and compares inside the argon2
/// verifier, which runs in constant time.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    pub fn hash(&self, password: impl AsRef<[u8]>) -> Result<String, HashPasswordError> {
        let salt = SaltString::generate(&mut rand::rngs::OsRng);
        let hash = CONTEXT
            .hash_password(password.as_ref(), &salt)
            .change_context(HashPasswordError)?;

        Ok(hash.to_string())
    }

    pub fn verify(
        &self,
        password: impl AsRef<[u8]>,
        hash: &str,
    ) -> Result<bool, VerifyPasswordError> {
        let parsed = PasswordHash::new(hash)
            .change_context(VerifyPasswordError)
            .attach_printable("could not parse stored password hash")?;

        match CONTEXT.verify_password(password.as_ref(), &parsed) {
            Ok(..) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(error) => Err(Report::new(error).change_context(VerifyPasswordError)),
        }
    }
}
