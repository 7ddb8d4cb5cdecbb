//! Share link passwords.
//!
//! A protected link stores only the PHC string of its password. Visitors
//! present the plaintext on every view or download and it is checked against
//! that string.

use argon2::Argon2;
use argon2::password_hash::{
    Error as PhcError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    rand_core::OsRng,
};

use vaultbox_core::error::AppError;
use vaultbox_core::result::AppResult;

/// Seals and checks share link passwords with Argon2id.
#[derive(Debug, Clone, Default)]
pub struct LinkPasswordHasher;

impl LinkPasswordHasher {
    /// Creates a hasher with the default Argon2id parameters.
    pub fn new() -> Self {
        Self
    }

    /// Returns the PHC string stored on the link in place of `password`.
    pub fn seal(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|phc| phc.to_string())
            .map_err(|e| AppError::internal(format!("Failed to seal link password: {e}")))
    }

    /// Checks a visitor's password against the link's stored PHC string.
    ///
    /// A mismatch is `InvalidPassword`. A stored value that is not a PHC
    /// string is an internal error, never a mismatch.
    pub fn check(&self, password: &str, sealed: &str) -> AppResult<()> {
        let phc = PasswordHash::new(sealed)
            .map_err(|e| AppError::internal(format!("Stored link password is corrupt: {e}")))?;

        match Argon2::default().verify_password(password.as_bytes(), &phc) {
            Ok(()) => Ok(()),
            Err(PhcError::Password) => Err(AppError::invalid_password("Incorrect link password")),
            Err(e) => Err(AppError::internal(format!(
                "Failed to check link password: {e}"
            ))),
        }
    }
}
