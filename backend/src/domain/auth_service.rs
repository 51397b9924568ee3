//! Registration and login over the identity and session stores.

use std::sync::Arc;

use chrono::Duration;
use mockable::Clock;
use thiserror::Error;

use super::auth::{LoginCredentials, RegistrationDetails};
use super::credentials::{hash_password, issue_token, verify_password};
use super::ports::{
    SessionPersistenceError, SessionStore, UserPersistenceError, UserRepository,
};
use super::session::{Session, SessionToken};
use super::user::{User, UserProfile};

/// Typed failures of registration and login.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Another user already registered this email.
    #[error("User already exists")]
    EmailTaken,
    /// Unknown email or wrong password. Deliberately a single variant so
    /// the response cannot reveal which of the two was wrong.
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// The identity store failed.
    #[error(transparent)]
    Users(#[from] UserPersistenceError),
    /// The session store failed.
    #[error(transparent)]
    Sessions(#[from] SessionPersistenceError),
}

/// A successful registration or login: the bearer token plus the profile.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Bearer token for subsequent requests; shown to the client once.
    pub token: SessionToken,
    /// Client-safe profile of the authenticated user.
    pub user: UserProfile,
}

/// Credential service wiring registration and login to storage.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    session_ttl: Duration,
}

impl AuthService {
    /// Create a service over the given stores.
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            users,
            sessions,
            clock,
            session_ttl,
        }
    }

    /// Register a new user and issue their first session.
    ///
    /// The identity store enforces email uniqueness; the pre-check here
    /// keeps the common duplicate path cheap, and an insert-time
    /// [`UserPersistenceError::DuplicateEmail`] from a racing registration
    /// maps to the same [`AuthError::EmailTaken`].
    pub async fn register(
        &self,
        details: &RegistrationDetails,
    ) -> Result<AuthenticatedUser, AuthError> {
        if self.users.find_by_email(details.email()).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let now = self.clock.utc();
        let user = User::register(
            details.email().clone(),
            hash_password(details.password()),
            details.role(),
            now,
        );
        self.users.insert(&user).await.map_err(|error| match error {
            UserPersistenceError::DuplicateEmail => AuthError::EmailTaken,
            other => AuthError::Users(other),
        })?;

        self.open_session(&user).await
    }

    /// Authenticate an existing user and issue a fresh session.
    pub async fn login(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedUser, AuthError> {
        let Some(user) = self.users.find_by_email(credentials.email()).await? else {
            return Err(AuthError::InvalidCredentials);
        };
        if !verify_password(user.password_hash(), credentials.password()) {
            return Err(AuthError::InvalidCredentials);
        }
        self.open_session(&user).await
    }

    async fn open_session(&self, user: &User) -> Result<AuthenticatedUser, AuthError> {
        let issued = issue_token();
        let session = Session::issue(
            issued.digest,
            *user.id(),
            user.role(),
            self.clock.utc(),
            self.session_ttl,
        );
        self.sessions.insert(&session).await?;
        Ok(AuthenticatedUser {
            token: issued.token,
            user: user.profile(),
        })
    }
}
