//! PostgreSQL-backed `UserRepository` implementation using Diesel.
//!
//! Email uniqueness is enforced by the database index; a unique violation
//! on insert surfaces as the typed `DuplicateEmail` variant so a racing
//! registration loses cleanly instead of crashing.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{EmailAddress, PasswordHash, Role, User, UserId};

use super::error_mapping::{
    diesel_error_message, is_connection_error, is_unique_violation, pool_error_message,
};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the identity store port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error, operation: &str) -> UserPersistenceError {
    if is_unique_violation(&error) {
        return UserPersistenceError::DuplicateEmail;
    }
    let message = diesel_error_message(&error, operation);
    if is_connection_error(&error) {
        UserPersistenceError::connection(message)
    } else {
        UserPersistenceError::query(message)
    }
}

/// Convert a database row into the domain aggregate.
fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let corrupt =
        |what: &str| UserPersistenceError::query(format!("corrupt user record: {what}"));
    Ok(User::new(
        UserId::from_uuid(row.id),
        EmailAddress::new(&row.email).map_err(|_| corrupt("email"))?,
        PasswordHash::new(row.password_hash),
        Role::parse(&row.role).map_err(|_| corrupt("role"))?,
        row.created_at,
        row.updated_at,
    ))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            email: user.email().as_ref(),
            password_hash: user.password_hash().as_ref(),
            role: user.role().as_str(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, "user insert"))
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "user lookup"))?;

        row.map(row_to_user).transpose()
    }
}
