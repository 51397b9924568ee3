//! PostgreSQL-backed `StockLedger` implementation using Diesel.
//!
//! Append-only: rows are inserted and read, never updated or deleted.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{LedgerPersistenceError, StockLedger};
use crate::domain::{MovementKind, StockMovement, SweetId};

use super::error_mapping::{diesel_error_message, is_connection_error, pool_error_message};
use super::models::{NewStockMovementRow, StockMovementRow};
use super::pool::{DbPool, PoolError};
use super::schema::stock_movements;

/// Diesel-backed implementation of the stock ledger port.
#[derive(Clone)]
pub struct DieselStockLedger {
    pool: DbPool,
}

impl DieselStockLedger {
    /// Create a new ledger with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> LedgerPersistenceError {
    LedgerPersistenceError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error, operation: &str) -> LedgerPersistenceError {
    let message = diesel_error_message(&error, operation);
    if is_connection_error(&error) {
        LedgerPersistenceError::connection(message)
    } else {
        LedgerPersistenceError::query(message)
    }
}

fn cast_units(value: i64, what: &str) -> Result<u32, LedgerPersistenceError> {
    u32::try_from(value)
        .map_err(|_| LedgerPersistenceError::query(format!("corrupt movement record: {what}")))
}

/// Convert a database row into the domain movement.
fn row_to_movement(row: StockMovementRow) -> Result<StockMovement, LedgerPersistenceError> {
    let kind = MovementKind::parse(&row.kind)
        .ok_or_else(|| LedgerPersistenceError::query("corrupt movement record: kind"))?;
    Ok(StockMovement::new(
        row.id,
        SweetId::from_uuid(row.sweet_id),
        kind,
        cast_units(row.amount, "amount")?,
        cast_units(row.quantity_after, "quantity_after")?,
        row.recorded_at,
    ))
}

#[async_trait]
impl StockLedger for DieselStockLedger {
    async fn append(&self, movement: &StockMovement) -> Result<(), LedgerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewStockMovementRow {
            id: *movement.id(),
            sweet_id: *movement.sweet_id().as_uuid(),
            kind: movement.kind().as_str(),
            amount: i64::from(movement.amount()),
            quantity_after: i64::from(movement.quantity_after()),
            recorded_at: movement.recorded_at(),
        };

        diesel::insert_into(stock_movements::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, "movement append"))
    }

    async fn list_for_sweet(
        &self,
        sweet_id: &SweetId,
    ) -> Result<Vec<StockMovement>, LedgerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<StockMovementRow> = stock_movements::table
            .filter(stock_movements::sweet_id.eq(sweet_id.as_uuid()))
            .order(stock_movements::recorded_at.desc())
            .select(StockMovementRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "movement list"))?;

        rows.into_iter().map(row_to_movement).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("refund")]
    #[case("")]
    fn corrupt_kind_maps_to_query_error(#[case] kind: &str) {
        let row = StockMovementRow {
            id: uuid::Uuid::new_v4(),
            sweet_id: uuid::Uuid::new_v4(),
            kind: kind.to_owned(),
            amount: 1,
            quantity_after: 1,
            recorded_at: Utc::now(),
        };
        let err = row_to_movement(row).expect_err("unknown kind must not convert");
        assert!(matches!(err, LedgerPersistenceError::Query { .. }));
    }
}
