//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the catalog store, identity store, session store, and stock ledger).
//! Each trait exposes strongly typed errors so adapters map their failures
//! into predictable variants instead of returning `anyhow::Result`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::PageRequest;
use thiserror::Error;

use super::ledger::{MovementKind, StockMovement};
use super::session::{Session, TokenDigest};
use super::sweet::{StockAmount, Sweet, SweetFilter, SweetId, SweetUpdate};
use super::user::{EmailAddress, User};

/// Persistence errors raised by [`SweetRepository`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SweetPersistenceError {
    /// Repository connection could not be established or timed out.
    #[error("catalog store connection failed: {message}")]
    Connection {
        /// Adapter-provided failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("catalog store query failed: {message}")]
    Query {
        /// Adapter-provided failure description.
        message: String,
    },
}

impl SweetPersistenceError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Persistence errors raised by [`UserRepository`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserPersistenceError {
    /// Repository connection could not be established or timed out.
    #[error("identity store connection failed: {message}")]
    Connection {
        /// Adapter-provided failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("identity store query failed: {message}")]
    Query {
        /// Adapter-provided failure description.
        message: String,
    },
    /// Another user already holds this email.
    #[error("email is already registered")]
    DuplicateEmail,
}

impl UserPersistenceError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Persistence errors raised by [`SessionStore`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionPersistenceError {
    /// Store connection could not be established or timed out.
    #[error("session store connection failed: {message}")]
    Connection {
        /// Adapter-provided failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("session store query failed: {message}")]
    Query {
        /// Adapter-provided failure description.
        message: String,
    },
}

impl SessionPersistenceError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Persistence errors raised by [`StockLedger`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerPersistenceError {
    /// Ledger connection could not be established or timed out.
    #[error("stock ledger connection failed: {message}")]
    Connection {
        /// Adapter-provided failure description.
        message: String,
    },
    /// Append or read failed during execution.
    #[error("stock ledger query failed: {message}")]
    Query {
        /// Adapter-provided failure description.
        message: String,
    },
}

impl LedgerPersistenceError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// A signed stock change requested from the catalog store.
///
/// Both directions carry a validated positive [`StockAmount`]; the store
/// applies the change as a single conditional update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDelta {
    /// Remove stock; only applies while `quantity >= amount`.
    Decrement(StockAmount),
    /// Add stock; no upper bound.
    Increment(StockAmount),
}

impl StockDelta {
    /// The positive magnitude of the change.
    pub const fn amount(&self) -> StockAmount {
        match self {
            Self::Decrement(amount) | Self::Increment(amount) => *amount,
        }
    }

    /// The ledger kind this delta is recorded as.
    pub const fn movement_kind(&self) -> MovementKind {
        match self {
            Self::Decrement(_) => MovementKind::Purchase,
            Self::Increment(_) => MovementKind::Restock,
        }
    }
}

/// Outcome of a conditional stock adjustment.
///
/// The adapter applies the delta and classifies failure in the same
/// operation so callers never observe a read-modify-write gap.
#[derive(Debug, Clone, PartialEq)]
pub enum StockAdjustment {
    /// The delta was applied; carries the updated record.
    Applied(Sweet),
    /// No sweet with the given id exists.
    Missing,
    /// A decrement would have driven the stock negative; carries the stock
    /// level observed when the conditional update failed.
    Rejected {
        /// Units available at rejection time.
        available: u32,
    },
}

/// Persistence port for the sweet catalog.
#[async_trait]
pub trait SweetRepository: Send + Sync {
    /// Persist a freshly created sweet.
    async fn insert(&self, sweet: &Sweet) -> Result<(), SweetPersistenceError>;

    /// Fetch a sweet by identifier.
    async fn find_by_id(&self, id: &SweetId) -> Result<Option<Sweet>, SweetPersistenceError>;

    /// One page of sweets ordered by creation time descending, plus the
    /// total number of records.
    async fn page(&self, request: PageRequest) -> Result<(Vec<Sweet>, u64), SweetPersistenceError>;

    /// All sweets matching the filter, ordered by creation time descending.
    async fn search(&self, filter: &SweetFilter) -> Result<Vec<Sweet>, SweetPersistenceError>;

    /// Apply a partial update and stamp `updated_at`; `None` when the id is
    /// unknown.
    async fn update(
        &self,
        id: &SweetId,
        update: &SweetUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Sweet>, SweetPersistenceError>;

    /// Delete a sweet; `false` when the id is unknown.
    async fn delete(&self, id: &SweetId) -> Result<bool, SweetPersistenceError>;

    /// Atomically apply a stock delta.
    ///
    /// Decrements must be conditional on `quantity >= amount` at the
    /// storage layer; two concurrent decrements totalling more than the
    /// available stock must never both report [`StockAdjustment::Applied`].
    async fn adjust_stock(
        &self,
        id: &SweetId,
        delta: StockDelta,
        now: DateTime<Utc>,
    ) -> Result<StockAdjustment, SweetPersistenceError>;
}

/// Persistence port for user identities.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user; the store enforces email uniqueness and reports
    /// [`UserPersistenceError::DuplicateEmail`] when violated.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Fetch a user by login email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError>;
}

/// Persistence port for bearer sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a freshly issued session.
    async fn insert(&self, session: &Session) -> Result<(), SessionPersistenceError>;

    /// Look up a session by token fingerprint.
    async fn find(
        &self,
        digest: &TokenDigest,
    ) -> Result<Option<Session>, SessionPersistenceError>;
}

/// Append-only port for the stock movement ledger.
#[async_trait]
pub trait StockLedger: Send + Sync {
    /// Append one movement.
    async fn append(&self, movement: &StockMovement) -> Result<(), LedgerPersistenceError>;

    /// All movements for a sweet, newest first.
    async fn list_for_sweet(
        &self,
        sweet_id: &SweetId,
    ) -> Result<Vec<StockMovement>, LedgerPersistenceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn delta_exposes_amount_and_kind() {
        let amount = StockAmount::new(4).expect("positive amount");
        let decrement = StockDelta::Decrement(amount);
        let increment = StockDelta::Increment(amount);
        assert_eq!(decrement.amount(), amount);
        assert_eq!(decrement.movement_kind(), MovementKind::Purchase);
        assert_eq!(increment.movement_kind(), MovementKind::Restock);
    }

    #[rstest]
    fn persistence_error_helpers_carry_messages() {
        let err = SweetPersistenceError::connection("pool timed out");
        assert!(err.to_string().contains("pool timed out"));
        let err = UserPersistenceError::query("bad statement");
        assert!(err.to_string().contains("bad statement"));
    }
}
