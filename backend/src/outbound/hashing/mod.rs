//! Argon2id implementation of the `PasswordHasher` port.
//!
//! Hashes are stored in PHC string format (`$argon2id$v=19$...`), so the
//! parameters travel with each hash and can be raised later without
//! invalidating existing accounts.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    self, PasswordHash as EncodedHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};

use crate::domain::ports::{PasswordHasher, PasswordHasherError};
use crate::domain::{Password, PasswordHash};

/// Argon2id hasher with the crate's default parameters.
#[derive(Clone, Default)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHasherError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.expose().as_bytes(), &salt)
            .map(|encoded| PasswordHash::new(encoded.to_string()))
            .map_err(|err| PasswordHasherError::hash(err.to_string()))
    }

    fn verify(&self, candidate: &str, hash: &PasswordHash) -> Result<bool, PasswordHasherError> {
        let parsed = EncodedHash::new(hash.as_str())
            .map_err(|err| PasswordHasherError::malformed_hash(err.to_string()))?;
        match self.argon2.verify_password(candidate.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(PasswordHasherError::hash(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> Argon2PasswordHasher {
        Argon2PasswordHasher::new()
    }

    fn password(raw: &str) -> Password {
        Password::new(raw).expect("valid password")
    }

    #[rstest]
    fn hashes_verify_against_the_original_password(hasher: Argon2PasswordHasher) {
        let hash = hasher.hash(&password("terracotta-9")).expect("hash");

        assert!(hash.as_str().starts_with("$argon2id$"));
        assert!(hasher.verify("terracotta-9", &hash).expect("verify"));
        assert!(!hasher.verify("terracotta-8", &hash).expect("verify"));
    }

    #[rstest]
    fn salts_differ_between_hashes(hasher: Argon2PasswordHasher) {
        let first = hasher.hash(&password("same-secret")).expect("hash");
        let second = hasher.hash(&password("same-secret")).expect("hash");

        assert_ne!(first, second);
    }

    #[rstest]
    fn malformed_hashes_are_reported(hasher: Argon2PasswordHasher) {
        let err = hasher
            .verify("anything", &PasswordHash::new("not-a-phc-string"))
            .expect_err("malformed");

        assert!(matches!(err, PasswordHasherError::MalformedHash { .. }));
    }
}
