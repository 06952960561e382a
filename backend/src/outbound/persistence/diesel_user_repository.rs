//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Timestamptz, Uuid as SqlUuid};
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};

use crate::domain::ports::{
    FavoriteChange, StoredCredentials, UserQuery, UserRepository, UserRepositoryError,
};
use crate::domain::{
    AccountStatus, EmailAddress, PasswordHash, PersonName, ProductId, ProfileUpdate, Role, User,
    UserId,
};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, unique_violation,
};
use super::diesel_helpers::{contains_pattern, page_window, total_from_count};
use super::json_serializers::{from_json, to_json};
use super::models::{NewUserRow, ProfileChanges, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Run a guarded favorites statement. No affected row means either the
    /// guard failed or the account is gone; a follow-up lookup tells which.
    async fn change_favorites(
        &self,
        statement: &'static str,
        id: &UserId,
        product: &ProductId,
        updated_at: DateTime<Utc>,
    ) -> Result<FavoriteChange, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changed = sql_query(statement)
            .bind::<SqlUuid, _>(product.as_uuid())
            .bind::<Timestamptz, _>(updated_at)
            .bind::<SqlUuid, _>(id.as_uuid())
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if changed > 0 {
            return Ok(FavoriteChange::Changed);
        }
        let exists: bool = diesel::select(diesel::dsl::exists(users::table.find(id.as_uuid())))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(if exists {
            FavoriteChange::Unchanged
        } else {
            FavoriteChange::AccountMissing
        })
    }
}

const ADD_FAVORITE_SQL: &str = r#"
UPDATE users
SET favorites = array_append(favorites, $1), updated_at = $2
WHERE id = $3 AND NOT ($1 = ANY(favorites))
"#;

const REMOVE_FAVORITE_SQL: &str = r#"
UPDATE users
SET favorites = array_remove(favorites, $1), updated_at = $2
WHERE id = $3 AND $1 = ANY(favorites)
"#;

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    map_basic_pool_error(error, UserRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    map_basic_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

/// Unique violations on the email index become `DuplicateEmail`.
fn map_write_error(error: diesel::result::Error, email: &EmailAddress) -> UserRepositoryError {
    match unique_violation(&error) {
        Some(constraint) if constraint.contains("email") => {
            UserRepositoryError::duplicate_email(email.as_str())
        }
        _ => map_diesel_error(error),
    }
}

fn row_to_user(row: UserRow) -> Result<StoredCredentials, UserRepositoryError> {
    let UserRow {
        id,
        name,
        email,
        password_hash,
        role,
        status,
        profile,
        stats,
        favorites,
        created_at,
        updated_at,
    } = row;

    let name = PersonName::new(name).map_err(|err| UserRepositoryError::query(err.to_string()))?;
    let email =
        EmailAddress::new(email).map_err(|err| UserRepositoryError::query(err.to_string()))?;
    let role = Role::parse(&role)
        .ok_or_else(|| UserRepositoryError::query(format!("unknown role {role}")))?;
    let status = AccountStatus::parse(&status)
        .ok_or_else(|| UserRepositoryError::query(format!("unknown account status {status}")))?;
    let profile = from_json(profile, "profile").map_err(UserRepositoryError::query)?;
    let stats = from_json(stats, "stats").map_err(UserRepositoryError::query)?;

    Ok(StoredCredentials {
        user: User {
            id: UserId::from_uuid(id),
            name,
            email,
            role,
            status,
            profile,
            stats,
            favorites: favorites.into_iter().map(ProductId::from_uuid).collect(),
            created_at,
            updated_at,
        },
        password_hash: PasswordHash::new(password_hash),
    })
}

fn filtered(query: &UserQuery) -> users::BoxedQuery<'static, Pg> {
    let mut statement = users::table.into_boxed();
    if let Some(role) = query.role {
        statement = statement.filter(users::role.eq(role.as_str()));
    }
    if let Some(status) = query.status {
        statement = statement.filter(users::status.eq(status.as_str()));
    }
    if let Some(search) = query.search.as_deref() {
        let pattern = contains_pattern(search);
        statement = statement.filter(
            users::name
                .ilike(pattern.clone())
                .or(users::email.ilike(pattern)),
        );
    }
    statement
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let profile = to_json(&user.profile, "profile").map_err(UserRepositoryError::query)?;
        let stats = to_json(&user.stats, "stats").map_err(UserRepositoryError::query)?;
        let favorites: Vec<_> = user.favorites.iter().map(|id| *id.as_uuid()).collect();

        let row = NewUserRow {
            id: *user.id.as_uuid(),
            name: user.name.as_str(),
            email: user.email.as_str(),
            password_hash: password_hash.as_str(),
            role: user.role.as_str(),
            status: user.status.as_str(),
            profile: &profile,
            stats: &stats,
            favorites: &favorites,
            created_at: user.created_at,
            updated_at: user.updated_at,
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_write_error(err, &user.email))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| row_to_user(row).map(|stored| stored.user))
            .transpose()
    }

    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::email.eq(email.as_str()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_password_hash(
        &self,
        id: &UserId,
    ) -> Result<Option<PasswordHash>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let hash = users::table
            .find(id.as_uuid())
            .select(users::password_hash)
            .first::<String>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(hash.map(PasswordHash::new))
    }

    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<User>, UserRepositoryError> {
        let profile = update
            .profile
            .as_ref()
            .map(|profile| to_json(profile, "profile"))
            .transpose()
            .map_err(UserRepositoryError::query)?;
        let changes = ProfileChanges {
            name: update.name.as_ref().map(PersonName::as_str),
            profile: profile.as_ref(),
            updated_at,
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(users::table.find(id.as_uuid()))
            .set(&changes)
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| row_to_user(row).map(|stored| stored.user))
            .transpose()
    }

    async fn set_standing(
        &self,
        id: &UserId,
        role: Role,
        status: AccountStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(users::table.find(id.as_uuid()))
            .set((
                users::role.eq(role.as_str()),
                users::status.eq(status.as_str()),
                users::updated_at.eq(updated_at),
            ))
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| row_to_user(row).map(|stored| stored.user))
            .transpose()
    }

    async fn add_favorite(
        &self,
        id: &UserId,
        product: &ProductId,
        updated_at: DateTime<Utc>,
    ) -> Result<FavoriteChange, UserRepositoryError> {
        self.change_favorites(ADD_FAVORITE_SQL, id, product, updated_at)
            .await
    }

    async fn remove_favorite(
        &self,
        id: &UserId,
        product: &ProductId,
        updated_at: DateTime<Utc>,
    ) -> Result<FavoriteChange, UserRepositoryError> {
        self.change_favorites(REMOVE_FAVORITE_SQL, id, product, updated_at)
            .await
    }

    async fn update_password(
        &self,
        id: &UserId,
        password_hash: &PasswordHash,
    ) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(users::table.find(id.as_uuid()))
            .set((
                users::password_hash.eq(password_hash.as_str()),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map(|updated| updated > 0)
            .map_err(map_diesel_error)
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(users::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map(|deleted| deleted > 0)
            .map_err(map_diesel_error)
    }

    async fn list(
        &self,
        query: &UserQuery,
        page: PageRequest,
    ) -> Result<Page<User>, UserRepositoryError> {
        let (offset, limit) = page_window(page).map_err(UserRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = filtered(query)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<UserRow> = filtered(query)
            .order((users::created_at.desc(), users::id.desc()))
            .offset(offset)
            .limit(limit)
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(|row| row_to_user(row).map(|stored| stored.user))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, total_from_count(total)))
    }

    async fn exists_with_role(&self, role: Role) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            users::table.filter(users::role.eq(role.as_str())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }
}
