//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and
//! must never be exposed to the domain. They exist solely to satisfy
//! Diesel's type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{sessions, stock_movements, sweets, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for reading from the sweets table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = sweets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SweetRow {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new sweet records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = sweets)]
pub(crate) struct NewSweetRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub category: &'a str,
    pub price: f64,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset for partial sweet updates; absent fields are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = sweets)]
pub(crate) struct SweetChangeset<'a> {
    pub name: Option<&'a str>,
    pub category: Option<&'a str>,
    pub price: Option<f64>,
    pub quantity: Option<i64>,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for reading from the sessions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SessionRow {
    pub token_digest: String,
    pub user_id: Uuid,
    pub role: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Insertable struct for creating new session records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = sessions)]
pub(crate) struct NewSessionRow<'a> {
    pub token_digest: &'a str,
    pub user_id: Uuid,
    pub role: &'a str,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Row struct for reading from the stock movements table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = stock_movements)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StockMovementRow {
    pub id: Uuid,
    pub sweet_id: Uuid,
    pub kind: String,
    pub amount: i64,
    pub quantity_after: i64,
    pub recorded_at: DateTime<Utc>,
}

/// Insertable struct for appending stock movements.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = stock_movements)]
pub(crate) struct NewStockMovementRow<'a> {
    pub id: Uuid,
    pub sweet_id: Uuid,
    pub kind: &'a str,
    pub amount: i64,
    pub quantity_after: i64,
    pub recorded_at: DateTime<Utc>,
}
