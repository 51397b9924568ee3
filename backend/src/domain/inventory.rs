//! Inventory engine: purchase and restock.
//!
//! The only component allowed to mutate stock levels. Quantity changes go
//! through [`SweetRepository::adjust_stock`], a storage-level conditional
//! update, so a decrement can never drive stock negative even under
//! concurrent requests. The engine performs no authorization; the access
//! layer gates restock behind the admin role before calling in.

use std::sync::Arc;

use mockable::Clock;
use thiserror::Error;
use tracing::warn;

use super::ledger::StockMovement;
use super::ports::{
    LedgerPersistenceError, StockAdjustment, StockDelta, StockLedger, SweetPersistenceError,
    SweetRepository,
};
use super::sweet::{StockAmount, Sweet, SweetId};

/// Typed failures of the purchase/restock contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// Requested quantity was missing, zero, or negative.
    #[error("Quantity must be greater than 0")]
    InvalidQuantity,
    /// No sweet with the given id exists.
    #[error("Sweet not found")]
    NotFound,
    /// The sweet has no stock at all.
    #[error("Sweet is out of stock")]
    OutOfStock,
    /// More stock was requested than is available.
    #[error("Insufficient stock available")]
    InsufficientStock {
        /// Units available when the request was rejected.
        available: u32,
        /// Units the caller asked for.
        requested: u32,
    },
    /// The catalog store failed; the stock level is unchanged.
    #[error(transparent)]
    Storage(#[from] SweetPersistenceError),
}

/// Purchase/restock engine over the catalog store and the stock ledger.
#[derive(Clone)]
pub struct InventoryService {
    sweets: Arc<dyn SweetRepository>,
    ledger: Arc<dyn StockLedger>,
    clock: Arc<dyn Clock>,
}

impl InventoryService {
    /// Create an engine over the given ports.
    pub fn new(
        sweets: Arc<dyn SweetRepository>,
        ledger: Arc<dyn StockLedger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sweets,
            ledger,
            clock,
        }
    }

    /// Decrement stock by a positive amount.
    ///
    /// Exactly one persisted write to the sweet on success, none on any
    /// failure path. Failure order matches the contract: `NotFound`, then
    /// `OutOfStock`, then `InsufficientStock`.
    pub async fn purchase(&self, id: &SweetId, requested: i64) -> Result<Sweet, InventoryError> {
        self.apply(id, requested, StockDelta::Decrement).await
    }

    /// Increment stock by a positive amount; no upper bound.
    pub async fn restock(&self, id: &SweetId, requested: i64) -> Result<Sweet, InventoryError> {
        self.apply(id, requested, StockDelta::Increment).await
    }

    async fn apply(
        &self,
        id: &SweetId,
        requested: i64,
        make_delta: fn(StockAmount) -> StockDelta,
    ) -> Result<Sweet, InventoryError> {
        let amount =
            StockAmount::new(requested).map_err(|_| InventoryError::InvalidQuantity)?;
        let delta = make_delta(amount);
        let now = self.clock.utc();

        match self.sweets.adjust_stock(id, delta, now).await? {
            StockAdjustment::Applied(sweet) => {
                self.record_movement(&sweet, delta, amount).await;
                Ok(sweet)
            }
            StockAdjustment::Missing => Err(InventoryError::NotFound),
            StockAdjustment::Rejected { available: 0 } => Err(InventoryError::OutOfStock),
            StockAdjustment::Rejected { available } => Err(InventoryError::InsufficientStock {
                available,
                requested: amount.get(),
            }),
        }
    }

    /// Append the movement to the audit ledger.
    ///
    /// The quantity projection on the sweet is the source of truth; a
    /// ledger append failure is logged and does not undo the adjustment.
    async fn record_movement(&self, sweet: &Sweet, delta: StockDelta, amount: StockAmount) {
        let movement = StockMovement::record(
            *sweet.id(),
            delta.movement_kind(),
            amount,
            sweet.quantity(),
            sweet.updated_at(),
        );
        if let Err(error) = self.ledger.append(&movement).await {
            warn!(
                sweet_id = %sweet.id(),
                kind = %delta.movement_kind(),
                %error,
                "stock movement not recorded"
            );
        }
    }

    /// All recorded movements for a sweet, newest first.
    ///
    /// Returns [`InventoryError::NotFound`] when the sweet itself does not
    /// exist, so callers can distinguish an empty history from a bad id.
    pub async fn movements(
        &self,
        id: &SweetId,
    ) -> Result<Vec<StockMovement>, InventoryError> {
        if self.sweets.find_by_id(id).await?.is_none() {
            return Err(InventoryError::NotFound);
        }
        self.ledger
            .list_for_sweet(id)
            .await
            .map_err(map_ledger_error)
    }
}

fn map_ledger_error(error: LedgerPersistenceError) -> InventoryError {
    match error {
        LedgerPersistenceError::Connection { message } => {
            InventoryError::Storage(SweetPersistenceError::connection(message))
        }
        LedgerPersistenceError::Query { message } => {
            InventoryError::Storage(SweetPersistenceError::query(message))
        }
    }
}
