//! Append-only stock movement ledger.
//!
//! Quantity mutations are recorded as auditable events keyed by sweet id,
//! independent of the mutable quantity projection on the sweet itself.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::sweet::{StockAmount, SweetId};

/// Direction of a recorded stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    /// Stock left the shelf.
    Purchase,
    /// Stock was added by an administrator.
    Restock,
}

impl MovementKind {
    /// Stable string form stored in the database.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Restock => "restock",
        }
    }

    /// Parse a stored movement kind.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "purchase" => Some(Self::Purchase),
            "restock" => Some(Self::Restock),
            _ => None,
        }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded quantity mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    /// Stable movement identifier.
    #[schema(value_type = String)]
    id: Uuid,
    /// Sweet the movement applies to.
    #[schema(value_type = String)]
    sweet_id: SweetId,
    /// Movement direction.
    kind: MovementKind,
    /// Units moved; always positive.
    amount: u32,
    /// Stock level immediately after the movement.
    quantity_after: u32,
    /// When the movement was applied.
    recorded_at: DateTime<Utc>,
}

impl StockMovement {
    /// Record a movement that was just applied.
    pub fn record(
        sweet_id: SweetId,
        kind: MovementKind,
        amount: StockAmount,
        quantity_after: u32,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sweet_id,
            kind,
            amount: amount.get(),
            quantity_after,
            recorded_at,
        }
    }

    /// Assemble a movement from stored components.
    pub const fn new(
        id: Uuid,
        sweet_id: SweetId,
        kind: MovementKind,
        amount: u32,
        quantity_after: u32,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            sweet_id,
            kind,
            amount,
            quantity_after,
            recorded_at,
        }
    }

    /// Stable movement identifier.
    pub const fn id(&self) -> &Uuid {
        &self.id
    }

    /// Sweet the movement applies to.
    pub const fn sweet_id(&self) -> &SweetId {
        &self.sweet_id
    }

    /// Movement direction.
    pub const fn kind(&self) -> MovementKind {
        self.kind
    }

    /// Units moved.
    pub const fn amount(&self) -> u32 {
        self.amount
    }

    /// Stock level immediately after the movement.
    pub const fn quantity_after(&self) -> u32 {
        self.quantity_after
    }

    /// When the movement was applied.
    pub const fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}
