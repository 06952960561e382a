//! Port for one-way password hashing.

use crate::domain::{Password, PasswordHash};

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHasherError {
        /// Hashing failed, for example because parameters were rejected.
        Hash { message: String } => "password hashing failed: {message}",
        /// A stored hash could not be parsed.
        MalformedHash { message: String } => "stored password hash is malformed: {message}",
    }
}

/// Hashes new passwords and verifies candidates against stored hashes.
///
/// Implementations are CPU bound and synchronous.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHasherError>;

    /// `Ok(false)` for a wrong password; errors only for unusable hashes.
    fn verify(&self, candidate: &str, hash: &PasswordHash) -> Result<bool, PasswordHasherError>;
}
