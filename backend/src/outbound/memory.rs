//! In-process adapters implementing every persistence port.
//!
//! Used when the server runs without a configured database and by tests
//! that need end-to-end flows without I/O. The mutex around each store is
//! the serialization point that gives [`SweetRepository::adjust_stock`] the
//! same no-oversell guarantee the Diesel adapter gets from its conditional
//! `UPDATE`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::PageRequest;

use crate::domain::ports::{
    LedgerPersistenceError, SessionPersistenceError, SessionStore, StockAdjustment, StockDelta,
    StockLedger, SweetPersistenceError, SweetRepository, UserPersistenceError, UserRepository,
};
use crate::domain::{
    EmailAddress, Session, StockMovement, Sweet, SweetFilter, SweetId, SweetUpdate, TokenDigest,
    User,
};

/// In-memory catalog store; newest records first.
#[derive(Default)]
pub struct InMemorySweetRepository {
    store: Mutex<Vec<Sweet>>,
}

impl InMemorySweetRepository {
    fn lock(&self) -> Result<MutexGuard<'_, Vec<Sweet>>, SweetPersistenceError> {
        self.store
            .lock()
            .map_err(|_| SweetPersistenceError::connection("catalog store lock poisoned"))
    }
}

#[async_trait]
impl SweetRepository for InMemorySweetRepository {
    async fn insert(&self, sweet: &Sweet) -> Result<(), SweetPersistenceError> {
        self.lock()?.push(sweet.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &SweetId) -> Result<Option<Sweet>, SweetPersistenceError> {
        let guard = self.lock()?;
        Ok(guard.iter().find(|sweet| sweet.id() == id).cloned())
    }

    async fn page(
        &self,
        request: PageRequest,
    ) -> Result<(Vec<Sweet>, u64), SweetPersistenceError> {
        let guard = self.lock()?;
        let total = guard.len() as u64;
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let items = guard
            .iter()
            .rev()
            .skip(offset)
            .take(request.limit() as usize)
            .cloned()
            .collect();
        Ok((items, total))
    }

    async fn search(&self, filter: &SweetFilter) -> Result<Vec<Sweet>, SweetPersistenceError> {
        let guard = self.lock()?;
        Ok(guard
            .iter()
            .rev()
            .filter(|sweet| filter.matches(sweet))
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        id: &SweetId,
        update: &SweetUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Sweet>, SweetPersistenceError> {
        let mut guard = self.lock()?;
        let Some(sweet) = guard.iter_mut().find(|sweet| sweet.id() == id) else {
            return Ok(None);
        };
        sweet.apply_update(update, now);
        Ok(Some(sweet.clone()))
    }

    async fn delete(&self, id: &SweetId) -> Result<bool, SweetPersistenceError> {
        let mut guard = self.lock()?;
        let before = guard.len();
        guard.retain(|sweet| sweet.id() != id);
        Ok(guard.len() < before)
    }

    async fn adjust_stock(
        &self,
        id: &SweetId,
        delta: StockDelta,
        now: DateTime<Utc>,
    ) -> Result<StockAdjustment, SweetPersistenceError> {
        let mut guard = self.lock()?;
        let Some(sweet) = guard.iter_mut().find(|sweet| sweet.id() == id) else {
            return Ok(StockAdjustment::Missing);
        };
        let amount = delta.amount().get();
        let next = match delta {
            StockDelta::Decrement(_) => match sweet.quantity().checked_sub(amount) {
                Some(next) => next,
                None => {
                    return Ok(StockAdjustment::Rejected {
                        available: sweet.quantity(),
                    });
                }
            },
            StockDelta::Increment(_) => sweet.quantity().saturating_add(amount),
        };
        sweet.set_quantity(next, now);
        Ok(StockAdjustment::Applied(sweet.clone()))
    }
}

/// In-memory identity store enforcing email uniqueness.
#[derive(Default)]
pub struct InMemoryUserRepository {
    store: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    fn lock(&self) -> Result<MutexGuard<'_, Vec<User>>, UserPersistenceError> {
        self.store
            .lock()
            .map_err(|_| UserPersistenceError::connection("identity store lock poisoned"))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut guard = self.lock()?;
        if guard.iter().any(|existing| existing.email() == user.email()) {
            return Err(UserPersistenceError::DuplicateEmail);
        }
        guard.push(user.clone());
        Ok(())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let guard = self.lock()?;
        Ok(guard.iter().find(|user| user.email() == email).cloned())
    }
}

/// In-memory session store keyed by token fingerprint.
#[derive(Default)]
pub struct InMemorySessionStore {
    store: Mutex<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Session>>, SessionPersistenceError> {
        self.store
            .lock()
            .map_err(|_| SessionPersistenceError::connection("session store lock poisoned"))
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, session: &Session) -> Result<(), SessionPersistenceError> {
        self.lock()?
            .insert(session.token_digest().as_str().to_owned(), session.clone());
        Ok(())
    }

    async fn find(
        &self,
        digest: &TokenDigest,
    ) -> Result<Option<Session>, SessionPersistenceError> {
        let guard = self.lock()?;
        Ok(guard.get(digest.as_str()).cloned())
    }
}

/// In-memory append-only stock ledger.
#[derive(Default)]
pub struct InMemoryStockLedger {
    store: Mutex<Vec<StockMovement>>,
}

impl InMemoryStockLedger {
    fn lock(&self) -> Result<MutexGuard<'_, Vec<StockMovement>>, LedgerPersistenceError> {
        self.store
            .lock()
            .map_err(|_| LedgerPersistenceError::connection("stock ledger lock poisoned"))
    }
}

#[async_trait]
impl StockLedger for InMemoryStockLedger {
    async fn append(&self, movement: &StockMovement) -> Result<(), LedgerPersistenceError> {
        self.lock()?.push(movement.clone());
        Ok(())
    }

    async fn list_for_sweet(
        &self,
        sweet_id: &SweetId,
    ) -> Result<Vec<StockMovement>, LedgerPersistenceError> {
        let guard = self.lock()?;
        Ok(guard
            .iter()
            .rev()
            .filter(|movement| movement.sweet_id() == sweet_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rstest::rstest;

    use super::*;
    use crate::domain::credentials::hash_password;
    use crate::domain::sweet::{StockAmount, SweetDraft};
    use crate::domain::user::Role;

    fn sweet(quantity: u32) -> Sweet {
        let draft = SweetDraft::try_from_parts(
            "Chocolate Bar",
            "Chocolate",
            Some(2.99),
            Some(i64::from(quantity)),
        )
        .expect("valid draft");
        Sweet::create(draft, Utc::now())
    }

    #[tokio::test]
    async fn adjust_rejects_decrement_below_zero() {
        let repo = InMemorySweetRepository::default();
        let record = sweet(3);
        let id = *record.id();
        repo.insert(&record).await.expect("insert");

        let amount = StockAmount::new(5).expect("positive amount");
        let outcome = repo
            .adjust_stock(&id, StockDelta::Decrement(amount), Utc::now())
            .await
            .expect("adjust runs");

        assert_eq!(outcome, StockAdjustment::Rejected { available: 3 });
        let stored = repo.find_by_id(&id).await.expect("find").expect("present");
        assert_eq!(stored.quantity(), 3, "rejected decrement writes nothing");
    }

    #[tokio::test]
    async fn concurrent_decrements_never_oversell() {
        let repo = Arc::new(InMemorySweetRepository::default());
        let record = sweet(50);
        let id = *record.id();
        repo.insert(&record).await.expect("insert");

        let amount = StockAmount::new(10).expect("positive amount");
        let mut tasks = Vec::new();
        for _ in 0..10 {
            let repo = repo.clone();
            tasks.push(tokio::spawn(async move {
                repo.adjust_stock(&id, StockDelta::Decrement(amount), Utc::now())
                    .await
            }));
        }

        let mut applied = 0;
        for task in tasks {
            let outcome = task.await.expect("task joins").expect("adjust runs");
            if matches!(outcome, StockAdjustment::Applied(_)) {
                applied += 1;
            }
        }

        assert_eq!(applied, 5, "only five 10-unit purchases fit in 50 units");
        let stored = repo.find_by_id(&id).await.expect("find").expect("present");
        assert_eq!(stored.quantity(), 0);
    }

    #[tokio::test]
    async fn page_returns_newest_first_with_total() {
        let repo = InMemorySweetRepository::default();
        for index in 0..12 {
            let draft = SweetDraft::try_from_parts(
                &format!("Sweet {index}"),
                "Sugar",
                Some(1.0),
                None,
            )
            .expect("valid draft");
            repo.insert(&Sweet::create(draft, Utc::now()))
                .await
                .expect("insert");
        }

        let request = PageRequest::new(1, 10).expect("valid window");
        let (items, total) = repo.page(request).await.expect("page");
        assert_eq!(total, 12);
        assert_eq!(items.len(), 10);
        assert_eq!(items[0].name().as_ref(), "Sweet 11", "newest first");
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_email_insert_is_rejected() {
        let repo = InMemoryUserRepository::default();
        let email = EmailAddress::new("user@example.com").expect("valid email");
        let first = User::register(
            email.clone(),
            hash_password("Password123"),
            Role::User,
            Utc::now(),
        );
        let second = User::register(
            email,
            hash_password("OtherPassword"),
            Role::Admin,
            Utc::now(),
        );

        repo.insert(&first).await.expect("first insert");
        let err = repo.insert(&second).await.expect_err("duplicate must fail");
        assert_eq!(err, UserPersistenceError::DuplicateEmail);
    }

    #[tokio::test]
    async fn ledger_lists_newest_first_per_sweet() {
        let ledger = InMemoryStockLedger::default();
        let id = SweetId::random();
        let other = SweetId::random();
        let amount = StockAmount::new(1).expect("positive amount");
        for (target, after) in [(id, 9), (other, 5), (id, 8)] {
            let movement = StockMovement::record(
                target,
                crate::domain::MovementKind::Purchase,
                amount,
                after,
                Utc::now(),
            );
            ledger.append(&movement).await.expect("append");
        }

        let listed = ledger.list_for_sweet(&id).await.expect("list");
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].quantity_after(), 8, "newest first");
    }
}
