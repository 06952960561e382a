//! Account use cases: registration, sign-in, profiles, favorites and admin
//! moderation of accounts.

use std::sync::Arc;

use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::info;

use super::port_errors::{map_hasher_error, map_product_error, map_user_error};
use super::ports::{FavoriteChange, PasswordHasher, ProductRepository, UserQuery, UserRepository};
use super::{
    AccountStatus, Actor, EmailAddress, Error, LoginCredentials, Password, PasswordChange,
    PersonName, Product, ProductId, Profile, ProfileUpdate, Registration, Role, User, UserId,
};

/// Email of the bootstrap administrator.
pub const INITIAL_ADMIN_EMAIL: &str = "admin@karigari.com";
/// Password used for the bootstrap administrator when none is supplied.
pub const INITIAL_ADMIN_PASSWORD: &str = "admin123";
const INITIAL_ADMIN_NAME: &str = "Admin";

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const USER_NOT_FOUND: &str = "User not found";
const SUSPENDED: &str = "Your account has been suspended. Please contact support.";

/// Fully specified account created by the seeding binary.
#[derive(Debug, Clone)]
pub struct SeedAccount {
    pub name: PersonName,
    pub email: EmailAddress,
    pub password: Password,
    pub role: Role,
    pub status: AccountStatus,
}

/// Whether [`AccountService::seed_account`] created anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created,
    AlreadyExists,
}

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    products: Arc<dyn ProductRepository>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        products: Arc<dyn ProductRepository>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            products,
            hasher,
            clock,
        }
    }

    /// Create a customer or artisan account.
    pub async fn register(&self, registration: Registration) -> Result<User, Error> {
        let hash = self
            .hasher
            .hash(&registration.password)
            .map_err(map_hasher_error)?;
        let user = User::register(
            UserId::random(),
            registration.name,
            registration.email,
            registration.role,
            registration.profile,
            self.clock.utc(),
        );
        self.users
            .insert(&user, &hash)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id, role = %user.role, "account registered");
        Ok(user)
    }

    /// Check credentials and return the account.
    ///
    /// Unknown emails and wrong passwords produce the same error.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let stored = self
            .users
            .find_credentials(credentials.email())
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::invalid_request(INVALID_CREDENTIALS))?;
        let valid = self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .map_err(map_hasher_error)?;
        if !valid {
            return Err(Error::invalid_request(INVALID_CREDENTIALS));
        }
        if stored.user.status == AccountStatus::Suspended {
            return Err(Error::forbidden(SUSPENDED));
        }
        info!(user_id = %stored.user.id, "login succeeded");
        Ok(stored.user)
    }

    /// Resolve the session's user into an [`Actor`].
    ///
    /// A session pointing at a deleted account is treated as signed out.
    pub async fn actor(&self, id: &UserId) -> Result<Actor, Error> {
        let user = self
            .users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("Not authenticated"))?;
        if user.status == AccountStatus::Suspended {
            return Err(Error::forbidden(SUSPENDED));
        }
        Ok(Actor::from(&user))
    }

    pub async fn get(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND))
    }

    pub async fn update_profile(&self, actor: &Actor, update: ProfileUpdate) -> Result<User, Error> {
        self.users
            .update_profile(&actor.id, &update, self.clock.utc())
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND))
    }

    pub async fn change_password(&self, actor: &Actor, change: PasswordChange) -> Result<(), Error> {
        let current = self
            .users
            .find_password_hash(&actor.id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND))?;
        let matches = self
            .hasher
            .verify(change.current(), &current)
            .map_err(map_hasher_error)?;
        if !matches {
            return Err(Error::invalid_request("Current password is incorrect"));
        }
        let replacement = self
            .hasher
            .hash(change.replacement())
            .map_err(map_hasher_error)?;
        let updated = self
            .users
            .update_password(&actor.id, &replacement)
            .await
            .map_err(map_user_error)?;
        if !updated {
            return Err(Error::not_found(USER_NOT_FOUND));
        }
        info!(user_id = %actor.id, "password changed");
        Ok(())
    }

    /// Create the first administrator; refused once any admin exists.
    pub async fn create_initial_admin(&self, password: Option<&str>) -> Result<User, Error> {
        let exists = self
            .users
            .exists_with_role(Role::Admin)
            .await
            .map_err(map_user_error)?;
        if exists {
            return Err(Error::invalid_request("Admin user already exists"));
        }
        let password = Password::new(password.unwrap_or(INITIAL_ADMIN_PASSWORD))
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let account = SeedAccount {
            name: PersonName::new(INITIAL_ADMIN_NAME)
                .map_err(|err| Error::internal(err.to_string()))?,
            email: EmailAddress::new(INITIAL_ADMIN_EMAIL)
                .map_err(|err| Error::internal(err.to_string()))?,
            password,
            role: Role::Admin,
            status: AccountStatus::Approved,
        };
        let user = self.create_account(account).await?;
        info!(user_id = %user.id, "initial admin created");
        Ok(user)
    }

    /// Create an account unless its email is already registered.
    pub async fn seed_account(&self, account: SeedAccount) -> Result<SeedOutcome, Error> {
        let existing = self
            .users
            .find_credentials(&account.email)
            .await
            .map_err(map_user_error)?;
        if existing.is_some() {
            return Ok(SeedOutcome::AlreadyExists);
        }
        self.create_account(account).await?;
        Ok(SeedOutcome::Created)
    }

    async fn create_account(&self, account: SeedAccount) -> Result<User, Error> {
        let hash = self
            .hasher
            .hash(&account.password)
            .map_err(map_hasher_error)?;
        let mut user = User::register(
            UserId::random(),
            account.name,
            account.email,
            account.role,
            Profile::default(),
            self.clock.utc(),
        );
        user.status = account.status;
        self.users
            .insert(&user, &hash)
            .await
            .map_err(map_user_error)?;
        Ok(user)
    }

    pub async fn list(
        &self,
        actor: &Actor,
        query: &UserQuery,
        page: PageRequest,
    ) -> Result<Page<User>, Error> {
        actor.require_admin()?;
        self.users.list(query, page).await.map_err(map_user_error)
    }

    /// Apply an admin moderation decision to an account.
    pub async fn moderate(
        &self,
        actor: &Actor,
        id: &UserId,
        status: AccountStatus,
    ) -> Result<User, Error> {
        actor.require_admin()?;
        let mut user = self.get(id).await?;
        user.moderate(status, self.clock.utc());
        let user = self
            .users
            .set_standing(id, user.role, user.status, user.updated_at)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND))?;
        info!(admin = %actor.id, user_id = %user.id, status = %status, "account moderated");
        Ok(user)
    }

    pub async fn delete(&self, actor: &Actor, id: &UserId) -> Result<(), Error> {
        actor.require_admin()?;
        if actor.id == *id {
            return Err(Error::invalid_request("Admins cannot delete their own account"));
        }
        let deleted = self.users.delete(id).await.map_err(map_user_error)?;
        if !deleted {
            return Err(Error::not_found(USER_NOT_FOUND));
        }
        info!(admin = %actor.id, user_id = %id, "account deleted");
        Ok(())
    }

    /// Favorite products in the order they were added. Products deleted
    /// since are skipped.
    pub async fn favorites(&self, actor: &Actor) -> Result<Vec<Product>, Error> {
        let user = self.get(&actor.id).await?;
        let mut products = self
            .products
            .find_many(&user.favorites)
            .await
            .map_err(map_product_error)?;
        products.sort_by_key(|product| {
            user.favorites
                .iter()
                .position(|id| *id == product.id)
                .unwrap_or(usize::MAX)
        });
        Ok(products)
    }

    pub async fn add_favorite(&self, actor: &Actor, product: ProductId) -> Result<(), Error> {
        self.products
            .find_by_id(&product)
            .await
            .map_err(map_product_error)?
            .ok_or_else(|| Error::not_found("Product not found"))?;
        let change = self
            .users
            .add_favorite(&actor.id, &product, self.clock.utc())
            .await
            .map_err(map_user_error)?;
        match change {
            FavoriteChange::Changed => Ok(()),
            FavoriteChange::Unchanged => {
                Err(Error::invalid_request("Product already in favorites"))
            }
            FavoriteChange::AccountMissing => Err(Error::not_found(USER_NOT_FOUND)),
        }
    }

    /// Removing a product that is not a favorite is not an error.
    pub async fn remove_favorite(&self, actor: &Actor, product: ProductId) -> Result<(), Error> {
        let change = self
            .users
            .remove_favorite(&actor.id, &product, self.clock.utc())
            .await
            .map_err(map_user_error)?;
        if change == FavoriteChange::AccountMissing {
            return Err(Error::not_found(USER_NOT_FOUND));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
