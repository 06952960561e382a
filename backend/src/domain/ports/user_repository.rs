//! Port for account persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use crate::domain::{
    AccountStatus, EmailAddress, PasswordHash, ProductId, ProfileUpdate, Role, User, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses this email.
        DuplicateEmail { email: String } => "email {email} is already registered",
    }
}

/// Filters for the admin account listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    pub role: Option<Role>,
    pub status: Option<AccountStatus>,
    /// Case-insensitive match against name or email.
    pub search: Option<String>,
}

/// An account together with its stored password hash.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    pub user: User,
    pub password_hash: PasswordHash,
}

/// Result of adding or removing a favorite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteChange {
    Changed,
    /// The product was already in (or already absent from) the list.
    Unchanged,
    AccountMissing,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account. Fails with `DuplicateEmail` when the
    /// normalised email is taken.
    async fn insert(&self, user: &User, password_hash: &PasswordHash)
    -> Result<(), UserRepositoryError>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Look up an account and its hash for sign-in.
    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError>;

    async fn find_password_hash(
        &self,
        id: &UserId,
    ) -> Result<Option<PasswordHash>, UserRepositoryError>;

    /// Write the name and profile fields `update` sets. Every other column
    /// keeps its stored value. Returns the stored account, or `None` when it
    /// no longer exists.
    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Write the role and moderation status only.
    async fn set_standing(
        &self,
        id: &UserId,
        role: Role,
        status: AccountStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Append `product` to the stored favorites unless already present.
    async fn add_favorite(
        &self,
        id: &UserId,
        product: &ProductId,
        updated_at: DateTime<Utc>,
    ) -> Result<FavoriteChange, UserRepositoryError>;

    async fn remove_favorite(
        &self,
        id: &UserId,
        product: &ProductId,
        updated_at: DateTime<Utc>,
    ) -> Result<FavoriteChange, UserRepositoryError>;

    async fn update_password(
        &self,
        id: &UserId,
        password_hash: &PasswordHash,
    ) -> Result<bool, UserRepositoryError>;

    async fn delete(&self, id: &UserId) -> Result<bool, UserRepositoryError>;

    /// Newest accounts first.
    async fn list(
        &self,
        query: &UserQuery,
        page: PageRequest,
    ) -> Result<Page<User>, UserRepositoryError>;

    async fn exists_with_role(&self, role: Role) -> Result<bool, UserRepositoryError>;
}
