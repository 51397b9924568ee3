//! Sweet catalog aggregate.
//!
//! A sweet is an independent record: no foreign keys to users, purchases
//! are not attributed. The two load-bearing invariants are enforced by
//! construction: `price` is finite and non-negative, `quantity` is a
//! non-negative integer (`u32`).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors returned by the sweet constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweetValidationError {
    /// Identifier was empty or not a UUID.
    InvalidId,
    /// Name was blank once trimmed.
    EmptyName,
    /// Category was blank once trimmed.
    EmptyCategory,
    /// Price was absent, negative, or not a finite number.
    InvalidPrice,
    /// Quantity was negative.
    NegativeQuantity,
    /// A stock amount was zero or negative.
    QuantityNotPositive,
}

impl fmt::Display for SweetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "Invalid sweet ID"),
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::EmptyCategory => write!(f, "category must not be empty"),
            Self::InvalidPrice => write!(f, "Valid price is required"),
            Self::NegativeQuantity => write!(f, "Quantity cannot be negative"),
            Self::QuantityNotPositive => write!(f, "Quantity must be greater than 0"),
        }
    }
}

impl std::error::Error for SweetValidationError {}

/// Stable sweet identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SweetId(Uuid);

impl SweetId {
    /// Validate and construct a [`SweetId`] from string input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, SweetValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| SweetValidationError::InvalidId)
    }

    /// Generate a new random [`SweetId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an already-parsed UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SweetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<SweetId> for String {
    fn from(value: SweetId) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for SweetId {
    type Error = SweetValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Display name of a sweet, non-empty once trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SweetName(String);

impl SweetName {
    /// Validate and construct a [`SweetName`].
    pub fn new(name: impl AsRef<str>) -> Result<Self, SweetValidationError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(SweetValidationError::EmptyName);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for SweetName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for SweetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<SweetName> for String {
    fn from(value: SweetName) -> Self {
        value.0
    }
}

impl TryFrom<String> for SweetName {
    type Error = SweetValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Category label of a sweet, non-empty once trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryName(String);

impl CategoryName {
    /// Validate and construct a [`CategoryName`].
    pub fn new(category: impl AsRef<str>) -> Result<Self, SweetValidationError> {
        let trimmed = category.as_ref().trim();
        if trimmed.is_empty() {
            return Err(SweetValidationError::EmptyCategory);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CategoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<CategoryName> for String {
    fn from(value: CategoryName) -> Self {
        value.0
    }
}

impl TryFrom<String> for CategoryName {
    type Error = SweetValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unit price of a sweet: a finite, non-negative number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(f64);

impl Price {
    /// Validate and construct a [`Price`].
    pub fn new(value: f64) -> Result<Self, SweetValidationError> {
        if !value.is_finite() || value < 0.0 {
            return Err(SweetValidationError::InvalidPrice);
        }
        Ok(Self(value))
    }

    /// Raw numeric value.
    pub const fn value(&self) -> f64 {
        self.0
    }
}

impl From<Price> for f64 {
    fn from(value: Price) -> Self {
        value.0
    }
}

impl TryFrom<f64> for Price {
    type Error = SweetValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A positive amount of stock to purchase or restock.
///
/// Zero and negative requests are rejected at construction, which is the
/// `InvalidQuantity` gate of the inventory contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockAmount(u32);

impl StockAmount {
    /// Validate a raw client-supplied amount.
    pub fn new(requested: i64) -> Result<Self, SweetValidationError> {
        match u32::try_from(requested) {
            Ok(amount) if amount > 0 => Ok(Self(amount)),
            _ => Err(SweetValidationError::QuantityNotPositive),
        }
    }

    /// The validated amount.
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for StockAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Catalog record for a sweet.
///
/// ## Invariants
/// - `price` is finite and non-negative.
/// - `quantity` is a non-negative integer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sweet {
    /// Stable identifier.
    #[schema(value_type = String, example = "6a1f6f1e-52c6-4c2c-9a30-0d0f8c5e9b11")]
    id: SweetId,
    /// Display name.
    #[schema(value_type = String, example = "Chocolate Bar")]
    name: SweetName,
    /// Category label.
    #[schema(value_type = String, example = "Chocolate")]
    category: CategoryName,
    /// Unit price.
    #[schema(value_type = f64, example = 2.99)]
    price: Price,
    /// Units currently in stock.
    #[schema(example = 100)]
    quantity: u32,
    /// Creation timestamp.
    created_at: DateTime<Utc>,
    /// Last-modified timestamp, stamped on update, purchase, and restock.
    updated_at: DateTime<Utc>,
}

impl Sweet {
    /// Assemble a sweet from validated components.
    pub const fn new(
        id: SweetId,
        name: SweetName,
        category: CategoryName,
        price: Price,
        quantity: u32,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            category,
            price,
            quantity,
            created_at,
            updated_at,
        }
    }

    /// Create a fresh record from a validated draft; both timestamps start
    /// at `now`.
    pub fn create(draft: SweetDraft, now: DateTime<Utc>) -> Self {
        Self::new(
            SweetId::random(),
            draft.name,
            draft.category,
            draft.price,
            draft.quantity,
            now,
            now,
        )
    }

    /// Stable identifier.
    pub const fn id(&self) -> &SweetId {
        &self.id
    }

    /// Display name.
    pub const fn name(&self) -> &SweetName {
        &self.name
    }

    /// Category label.
    pub const fn category(&self) -> &CategoryName {
        &self.category
    }

    /// Unit price.
    pub const fn price(&self) -> Price {
        self.price
    }

    /// Units currently in stock.
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Creation timestamp.
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last-modified timestamp.
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Apply a partial update and stamp `updated_at`.
    pub fn apply_update(&mut self, update: &SweetUpdate, now: DateTime<Utc>) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(category) = &update.category {
            self.category = category.clone();
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
        self.updated_at = now;
    }

    /// Replace the stock level and stamp `updated_at`.
    pub fn set_quantity(&mut self, quantity: u32, now: DateTime<Utc>) {
        self.quantity = quantity;
        self.updated_at = now;
    }
}

/// Validated payload for creating a sweet.
#[derive(Debug, Clone, PartialEq)]
pub struct SweetDraft {
    /// Display name.
    pub name: SweetName,
    /// Category label.
    pub category: CategoryName,
    /// Unit price.
    pub price: Price,
    /// Initial stock, defaulting to zero when absent.
    pub quantity: u32,
}

impl SweetDraft {
    /// Validate raw creation input.
    ///
    /// `price` is required; `quantity` defaults to 0 when absent and must
    /// not be negative.
    pub fn try_from_parts(
        name: &str,
        category: &str,
        price: Option<f64>,
        quantity: Option<i64>,
    ) -> Result<Self, SweetValidationError> {
        let name = SweetName::new(name)?;
        let category = CategoryName::new(category)?;
        let price = Price::new(price.ok_or(SweetValidationError::InvalidPrice)?)?;
        let quantity = match quantity {
            None => 0,
            Some(raw) => {
                u32::try_from(raw).map_err(|_| SweetValidationError::NegativeQuantity)?
            }
        };
        Ok(Self {
            name,
            category,
            price,
            quantity,
        })
    }
}

/// Validated partial update for a sweet.
///
/// Absent fields are left untouched; provided `price`/`quantity` values are
/// revalidated for non-negativity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweetUpdate {
    /// Replacement name, if provided.
    pub name: Option<SweetName>,
    /// Replacement category, if provided.
    pub category: Option<CategoryName>,
    /// Replacement price, if provided.
    pub price: Option<Price>,
    /// Replacement stock level, if provided.
    pub quantity: Option<u32>,
}

impl SweetUpdate {
    /// Validate raw partial-update input.
    pub fn try_from_parts(
        name: Option<&str>,
        category: Option<&str>,
        price: Option<f64>,
        quantity: Option<i64>,
    ) -> Result<Self, SweetValidationError> {
        let name = name.map(SweetName::new).transpose()?;
        let category = category.map(CategoryName::new).transpose()?;
        let price = price.map(Price::new).transpose()?;
        let quantity = quantity
            .map(|raw| u32::try_from(raw).map_err(|_| SweetValidationError::NegativeQuantity))
            .transpose()?;
        Ok(Self {
            name,
            category,
            price,
            quantity,
        })
    }
}

/// Search filter for the catalog.
///
/// Unset filters are omitted from the storage query entirely rather than
/// treated as zero values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweetFilter {
    /// Case-insensitive substring match on the name.
    pub name: Option<String>,
    /// Case-insensitive substring match on the category.
    pub category: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<Price>,
    /// Inclusive upper price bound.
    pub max_price: Option<Price>,
}

impl SweetFilter {
    /// Validate raw search input; price bounds must be valid prices.
    pub fn try_from_parts(
        name: Option<String>,
        category: Option<String>,
        min_price: Option<f64>,
        max_price: Option<f64>,
    ) -> Result<Self, SweetValidationError> {
        let min_price = min_price.map(Price::new).transpose()?;
        let max_price = max_price.map(Price::new).transpose()?;
        Ok(Self {
            name: name.filter(|value| !value.trim().is_empty()),
            category: category.filter(|value| !value.trim().is_empty()),
            min_price,
            max_price,
        })
    }

    /// Whether a sweet matches every set filter.
    pub fn matches(&self, sweet: &Sweet) -> bool {
        let name_ok = self.name.as_ref().is_none_or(|needle| {
            sweet
                .name()
                .as_ref()
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });
        let category_ok = self.category.as_ref().is_none_or(|needle| {
            sweet
                .category()
                .as_ref()
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });
        let min_ok = self
            .min_price
            .is_none_or(|bound| sweet.price().value() >= bound.value());
        let max_ok = self
            .max_price
            .is_none_or(|bound| sweet.price().value() <= bound.value());
        name_ok && category_ok && min_ok && max_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sweet(name: &str, category: &str, price: f64, quantity: u32) -> Sweet {
        let draft = SweetDraft::try_from_parts(name, category, Some(price), Some(i64::from(quantity)))
            .expect("valid draft");
        Sweet::create(draft, Utc::now())
    }

    #[rstest]
    #[case("", "Chocolate", SweetValidationError::EmptyName)]
    #[case("   ", "Chocolate", SweetValidationError::EmptyName)]
    #[case("Fudge", "", SweetValidationError::EmptyCategory)]
    #[case("Fudge", "  ", SweetValidationError::EmptyCategory)]
    fn draft_rejects_blank_fields(
        #[case] name: &str,
        #[case] category: &str,
        #[case] expected: SweetValidationError,
    ) {
        let err = SweetDraft::try_from_parts(name, category, Some(1.0), None)
            .expect_err("blank fields must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn draft_requires_price() {
        let err = SweetDraft::try_from_parts("Fudge", "Chocolate", None, None)
            .expect_err("missing price must fail");
        assert_eq!(err, SweetValidationError::InvalidPrice);
    }

    #[rstest]
    #[case(-0.01)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn price_rejects_invalid_values(#[case] raw: f64) {
        assert_eq!(
            Price::new(raw).expect_err("invalid price"),
            SweetValidationError::InvalidPrice
        );
    }

    #[rstest]
    fn draft_defaults_quantity_to_zero() {
        let draft = SweetDraft::try_from_parts("Fudge", "Chocolate", Some(1.5), None)
            .expect("valid draft");
        assert_eq!(draft.quantity, 0);
    }

    #[rstest]
    fn draft_rejects_negative_quantity() {
        let err = SweetDraft::try_from_parts("Fudge", "Chocolate", Some(1.5), Some(-1))
            .expect_err("negative quantity must fail");
        assert_eq!(err, SweetValidationError::NegativeQuantity);
    }

    #[rstest]
    #[case(0)]
    #[case(-5)]
    fn stock_amount_rejects_non_positive(#[case] raw: i64) {
        let err = StockAmount::new(raw).expect_err("non-positive amount must fail");
        assert_eq!(err, SweetValidationError::QuantityNotPositive);
    }

    #[rstest]
    fn apply_update_stamps_updated_at() {
        let mut record = sweet("Fudge", "Chocolate", 1.5, 3);
        let created = record.created_at();
        let later = created + chrono::Duration::seconds(60);
        let update = SweetUpdate::try_from_parts(None, None, Some(2.0), None)
            .expect("valid update");
        record.apply_update(&update, later);
        assert_eq!(record.price().value(), 2.0);
        assert_eq!(record.quantity(), 3);
        assert_eq!(record.updated_at(), later);
        assert_eq!(record.created_at(), created);
    }

    #[rstest]
    #[case(Some("choc"), None, true)]
    #[case(Some("CHOC"), None, true)]
    #[case(Some("mint"), None, false)]
    #[case(None, Some("late"), true)]
    fn filter_matches_substrings_case_insensitively(
        #[case] name: Option<&str>,
        #[case] category: Option<&str>,
        #[case] expected: bool,
    ) {
        let record = sweet("Chocolate Bar", "Chocolate", 2.99, 10);
        let filter = SweetFilter::try_from_parts(
            name.map(str::to_owned),
            category.map(str::to_owned),
            None,
            None,
        )
        .expect("valid filter");
        assert_eq!(filter.matches(&record), expected);
    }

    #[rstest]
    #[case(1.99, false)]
    #[case(2.0, true)]
    #[case(2.99, true)]
    #[case(3.0, true)]
    #[case(3.01, false)]
    fn filter_price_bounds_are_inclusive(#[case] price: f64, #[case] expected: bool) {
        let record = sweet("Bonbon", "Sugar", price, 1);
        let filter = SweetFilter::try_from_parts(None, None, Some(2.0), Some(3.0))
            .expect("valid filter");
        assert_eq!(filter.matches(&record), expected);
    }

    #[rstest]
    fn sweet_serializes_camel_case() {
        let record = sweet("Fudge", "Chocolate", 1.5, 3);
        let value = serde_json::to_value(&record).expect("serializable sweet");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert!(value.get("created_at").is_none());
    }
}
