//! Build HTTP state from configuration.
//!
//! With a database pool every port gets its Diesel adapter; without one the
//! in-memory adapters serve, keeping the binary runnable for demos and the
//! integration suite free of external services.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use crate::domain::ports::SessionStore;
use crate::domain::{AuthService, CatalogService, InventoryService};
use crate::inbound::http::state::HttpState;
use crate::outbound::persistence::{
    DieselSessionStore, DieselStockLedger, DieselSweetRepository, DieselUserRepository,
};

use super::config::ServerConfig;

pub(crate) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let state = match &config.db_pool {
        Some(pool) => {
            let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
            let sweets = Arc::new(DieselSweetRepository::new(pool.clone()));
            let users = Arc::new(DieselUserRepository::new(pool.clone()));
            let sessions: Arc<dyn SessionStore> =
                Arc::new(DieselSessionStore::new(pool.clone()));
            let ledger = Arc::new(DieselStockLedger::new(pool.clone()));

            HttpState::new(
                Arc::new(AuthService::new(
                    users,
                    sessions.clone(),
                    clock.clone(),
                    config.session_ttl,
                )),
                Arc::new(CatalogService::new(sweets.clone(), clock.clone())),
                Arc::new(InventoryService::new(sweets, ledger, clock)),
                sessions,
            )
        }
        None => HttpState::in_memory(config.session_ttl),
    };
    web::Data::new(state)
}
