//! PostgreSQL-backed `SweetRepository` implementation using Diesel.
//!
//! The stock adjustment is the load-bearing query: a conditional `UPDATE`
//! guarded by `quantity >= amount` applies the decrement and the stock
//! check as one storage-level operation, so concurrent purchases can never
//! oversell. A failed conditional triggers one classification re-read to
//! produce the same error a sequential check would.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageRequest;

use crate::domain::ports::{
    StockAdjustment, StockDelta, SweetPersistenceError, SweetRepository,
};
use crate::domain::{
    CategoryName, Price, Sweet, SweetFilter, SweetId, SweetName, SweetUpdate,
};

use super::error_mapping::{diesel_error_message, is_connection_error, pool_error_message};
use super::models::{NewSweetRow, SweetChangeset, SweetRow};
use super::pool::{DbPool, PoolError};
use super::schema::sweets;

/// Diesel-backed implementation of the catalog store port.
#[derive(Clone)]
pub struct DieselSweetRepository {
    pool: DbPool,
}

impl DieselSweetRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SweetPersistenceError {
    SweetPersistenceError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error, operation: &str) -> SweetPersistenceError {
    let message = diesel_error_message(&error, operation);
    if is_connection_error(&error) {
        SweetPersistenceError::connection(message)
    } else {
        SweetPersistenceError::query(message)
    }
}

fn cast_quantity(value: i64) -> Result<u32, SweetPersistenceError> {
    u32::try_from(value)
        .map_err(|_| SweetPersistenceError::query("stored quantity out of range"))
}

/// Convert a database row into the domain aggregate.
fn row_to_sweet(row: SweetRow) -> Result<Sweet, SweetPersistenceError> {
    let corrupt =
        |what: &str| SweetPersistenceError::query(format!("corrupt sweet record: {what}"));
    Ok(Sweet::new(
        SweetId::from_uuid(row.id),
        SweetName::new(&row.name).map_err(|_| corrupt("name"))?,
        CategoryName::new(&row.category).map_err(|_| corrupt("category"))?,
        Price::new(row.price).map_err(|_| corrupt("price"))?,
        cast_quantity(row.quantity)?,
        row.created_at,
        row.updated_at,
    ))
}

/// Escape SQL `LIKE` wildcards in user-supplied search terms.
fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn contains_pattern(value: &str) -> String {
    format!("%{}%", escape_like(value))
}

#[async_trait]
impl SweetRepository for DieselSweetRepository {
    async fn insert(&self, sweet: &Sweet) -> Result<(), SweetPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewSweetRow {
            id: *sweet.id().as_uuid(),
            name: sweet.name().as_ref(),
            category: sweet.category().as_ref(),
            price: sweet.price().value(),
            quantity: i64::from(sweet.quantity()),
            created_at: sweet.created_at(),
            updated_at: sweet.updated_at(),
        };

        diesel::insert_into(sweets::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, "sweet insert"))
    }

    async fn find_by_id(&self, id: &SweetId) -> Result<Option<Sweet>, SweetPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<SweetRow> = sweets::table
            .filter(sweets::id.eq(id.as_uuid()))
            .select(SweetRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "sweet lookup"))?;

        row.map(row_to_sweet).transpose()
    }

    async fn page(
        &self,
        request: PageRequest,
    ) -> Result<(Vec<Sweet>, u64), SweetPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = sweets::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "sweet count"))?;

        let rows: Vec<SweetRow> = sweets::table
            .order(sweets::created_at.desc())
            .offset(request.offset())
            .limit(i64::from(request.limit()))
            .select(SweetRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "sweet page"))?;

        let items = rows
            .into_iter()
            .map(row_to_sweet)
            .collect::<Result<Vec<_>, _>>()?;
        let total = u64::try_from(total)
            .map_err(|_| SweetPersistenceError::query("negative row count"))?;
        Ok((items, total))
    }

    async fn search(&self, filter: &SweetFilter) -> Result<Vec<Sweet>, SweetPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = sweets::table
            .select(SweetRow::as_select())
            .into_boxed();
        if let Some(name) = &filter.name {
            query = query.filter(sweets::name.ilike(contains_pattern(name)));
        }
        if let Some(category) = &filter.category {
            query = query.filter(sweets::category.ilike(contains_pattern(category)));
        }
        if let Some(min_price) = filter.min_price {
            query = query.filter(sweets::price.ge(min_price.value()));
        }
        if let Some(max_price) = filter.max_price {
            query = query.filter(sweets::price.le(max_price.value()));
        }

        let rows: Vec<SweetRow> = query
            .order(sweets::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "sweet search"))?;

        rows.into_iter().map(row_to_sweet).collect()
    }

    async fn update(
        &self,
        id: &SweetId,
        update: &SweetUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Sweet>, SweetPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changeset = SweetChangeset {
            name: update.name.as_ref().map(AsRef::as_ref),
            category: update.category.as_ref().map(AsRef::as_ref),
            price: update.price.map(|price| price.value()),
            quantity: update.quantity.map(i64::from),
            updated_at: now,
        };

        let row: Option<SweetRow> = diesel::update(sweets::table.filter(sweets::id.eq(id.as_uuid())))
            .set(&changeset)
            .returning(SweetRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "sweet update"))?;

        row.map(row_to_sweet).transpose()
    }

    async fn delete(&self, id: &SweetId) -> Result<bool, SweetPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(sweets::table.filter(sweets::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "sweet delete"))?;
        Ok(deleted > 0)
    }

    async fn adjust_stock(
        &self,
        id: &SweetId,
        delta: StockDelta,
        now: DateTime<Utc>,
    ) -> Result<StockAdjustment, SweetPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let amount = i64::from(delta.amount().get());

        let updated: Option<SweetRow> = match delta {
            StockDelta::Decrement(_) => {
                diesel::update(
                    sweets::table
                        .filter(sweets::id.eq(id.as_uuid()))
                        .filter(sweets::quantity.ge(amount)),
                )
                .set((
                    sweets::quantity.eq(sweets::quantity - amount),
                    sweets::updated_at.eq(now),
                ))
                .returning(SweetRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(|err| map_diesel_error(err, "stock decrement"))?
            }
            StockDelta::Increment(_) => {
                diesel::update(sweets::table.filter(sweets::id.eq(id.as_uuid())))
                    .set((
                        sweets::quantity.eq(sweets::quantity + amount),
                        sweets::updated_at.eq(now),
                    ))
                    .returning(SweetRow::as_returning())
                    .get_result(&mut conn)
                    .await
                    .optional()
                    .map_err(|err| map_diesel_error(err, "stock increment"))?
            }
        };

        if let Some(row) = updated {
            return row_to_sweet(row).map(StockAdjustment::Applied);
        }

        // The conditional update matched no row: either the sweet is gone
        // or the decrement guard rejected it. One re-read disambiguates.
        let current: Option<SweetRow> = sweets::table
            .filter(sweets::id.eq(id.as_uuid()))
            .select(SweetRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "stock classification"))?;

        match current {
            None => Ok(StockAdjustment::Missing),
            Some(row) => Ok(StockAdjustment::Rejected {
                available: cast_quantity(row.quantity)?,
            }),
        }
    }
}
