//! PostgreSQL-backed `SessionStore` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{SessionPersistenceError, SessionStore};
use crate::domain::{Role, Session, TokenDigest, UserId};

use super::error_mapping::{diesel_error_message, is_connection_error, pool_error_message};
use super::models::{NewSessionRow, SessionRow};
use super::pool::{DbPool, PoolError};
use super::schema::sessions;

/// Diesel-backed implementation of the session store port.
#[derive(Clone)]
pub struct DieselSessionStore {
    pool: DbPool,
}

impl DieselSessionStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SessionPersistenceError {
    SessionPersistenceError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error, operation: &str) -> SessionPersistenceError {
    let message = diesel_error_message(&error, operation);
    if is_connection_error(&error) {
        SessionPersistenceError::connection(message)
    } else {
        SessionPersistenceError::query(message)
    }
}

/// Convert a database row into the domain session.
fn row_to_session(row: SessionRow) -> Result<Session, SessionPersistenceError> {
    let role = Role::parse(&row.role)
        .map_err(|_| SessionPersistenceError::query("corrupt session record: role"))?;
    Ok(Session::new(
        TokenDigest::from_encoded(row.token_digest),
        UserId::from_uuid(row.user_id),
        role,
        row.issued_at,
        row.expires_at,
    ))
}

#[async_trait]
impl SessionStore for DieselSessionStore {
    async fn insert(&self, session: &Session) -> Result<(), SessionPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewSessionRow {
            token_digest: session.token_digest().as_str(),
            user_id: *session.user_id().as_uuid(),
            role: session.role().as_str(),
            issued_at: session.issued_at(),
            expires_at: session.expires_at(),
        };

        diesel::insert_into(sessions::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, "session insert"))
    }

    async fn find(
        &self,
        digest: &TokenDigest,
    ) -> Result<Option<Session>, SessionPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<SessionRow> = sessions::table
            .filter(sessions::token_digest.eq(digest.as_str()))
            .select(SessionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "session lookup"))?;

        row.map(row_to_session).transpose()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn corrupt_role_maps_to_query_error() {
        let row = SessionRow {
            token_digest: "abc".to_owned(),
            user_id: uuid::Uuid::new_v4(),
            role: "owner".to_owned(),
            issued_at: Utc::now(),
            expires_at: Utc::now(),
        };
        let err = row_to_session(row).expect_err("unknown role must not convert");
        assert!(matches!(err, SessionPersistenceError::Query { .. }));
    }
}
