//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and ports, and remain testable without I/O.

use std::sync::Arc;

use chrono::Duration;
use mockable::{Clock, DefaultClock};

use crate::domain::ports::SessionStore;
use crate::domain::{AuthService, CatalogService, InventoryService};
use crate::outbound::memory::{
    InMemorySessionStore, InMemoryStockLedger, InMemorySweetRepository, InMemoryUserRepository,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Registration and login.
    pub auth: Arc<AuthService>,
    /// Catalog CRUD.
    pub catalog: Arc<CatalogService>,
    /// Purchase/restock engine.
    pub inventory: Arc<InventoryService>,
    /// Session lookups for the access layer.
    pub sessions: Arc<dyn SessionStore>,
}

impl HttpState {
    /// Construct state from pre-built services.
    pub fn new(
        auth: Arc<AuthService>,
        catalog: Arc<CatalogService>,
        inventory: Arc<InventoryService>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            auth,
            catalog,
            inventory,
            sessions,
        }
    }

    /// State backed entirely by in-memory adapters.
    ///
    /// Used when no database is configured and by tests.
    pub fn in_memory(session_ttl: Duration) -> Self {
        Self::in_memory_with_clock(session_ttl, Arc::new(DefaultClock))
    }

    /// In-memory state with an injected clock, for tests that pin time.
    pub fn in_memory_with_clock(session_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let sweets = Arc::new(InMemorySweetRepository::default());
        let users = Arc::new(InMemoryUserRepository::default());
        let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::default());
        let ledger = Arc::new(InMemoryStockLedger::default());

        Self {
            auth: Arc::new(AuthService::new(
                users,
                sessions.clone(),
                clock.clone(),
                session_ttl,
            )),
            catalog: Arc::new(CatalogService::new(sweets.clone(), clock.clone())),
            inventory: Arc::new(InventoryService::new(sweets, ledger, clock)),
            sessions,
        }
    }
}
