//! Account password hashing for registration and login.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use blog_core::ports::{AuthError, PasswordService};

/// Stores account passwords as Argon2id PHC strings, each with its own salt.
#[derive(Default)]
pub struct Argon2PasswordService {
    argon2: Argon2<'static>,
}

impl Argon2PasswordService {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordService for Argon2PasswordService {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::HashingError(format!("cannot hash new password: {e}")))
    }

    /// `Ok(false)` is a wrong password; `Err` means the stored hash is unusable.
    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, AuthError> {
        let stored = PasswordHash::new(stored_hash)
            .map_err(|e| AuthError::HashingError(format!("stored hash unreadable: {e}")))?;

        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &stored)
            .is_ok())
    }
}
