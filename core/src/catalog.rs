//! Product catalog types.
//!
//! A product owns exactly one inventory record; the catalog creates both
//! together and deletes both together. Orders only reference products by id.

use crate::error::{Result, StoreError};
use crate::money;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fields a product cannot be created without.
pub const REQUIRED_FIELDS: [&str; 4] = ["name", "sku", "price", "cost"];

/// Message returned when a required product field is missing.
pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields: name, sku, price, cost";

/// Default reorder threshold for a newly created product.
pub const DEFAULT_MIN_STOCK_LEVEL: i32 = 10;

/// Default storage location for a newly created product.
pub const DEFAULT_LOCATION: &str = "Warehouse A";

/// Unique identifier for a product
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

impl ProductId {
    /// Creates a `ProductId` from its database value
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the inner value
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A catalog entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier
    pub id: ProductId,
    /// Display name
    pub name: String,
    /// Free-text description
    pub description: Option<String>,
    /// Category label
    pub category: Option<String>,
    /// Stock-keeping unit, unique across the catalog
    pub sku: String,
    /// Current selling price
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Purchase cost
    #[serde(with = "rust_decimal::serde::float")]
    pub cost: Decimal,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// A product joined with its inventory record, as listed by the catalog.
///
/// The inventory columns are optional because the join is a left join.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductView {
    /// Product columns
    #[serde(flatten)]
    pub product: Product,
    /// Units on hand
    pub quantity: Option<i32>,
    /// Reorder threshold
    pub min_stock_level: Option<i32>,
    /// Storage location
    pub location: Option<String>,
}

impl ProductView {
    /// Whether the product is at or below its reorder threshold.
    #[must_use]
    pub fn is_low_stock(&self) -> bool {
        matches!((self.quantity, self.min_stock_level), (Some(q), Some(min)) if q <= min)
    }
}

/// Unvalidated product creation payload.
///
/// Every field is optional so that missing fields surface as a validation
/// error naming them rather than as a deserialization failure.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProductDraft {
    /// Display name (required)
    pub name: Option<String>,
    /// Free-text description
    pub description: Option<String>,
    /// Category label
    pub category: Option<String>,
    /// SKU (required)
    pub sku: Option<String>,
    /// Selling price (required, positive)
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    /// Purchase cost (required, positive)
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub cost: Option<Decimal>,
    /// Initial units on hand (default 0)
    pub quantity: Option<i32>,
    /// Reorder threshold (default 10)
    pub min_stock_level: Option<i32>,
    /// Storage location (default "Warehouse A")
    pub location: Option<String>,
}

/// Validated product creation command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewProduct {
    /// Display name
    pub name: String,
    /// Free-text description
    pub description: Option<String>,
    /// Category label
    pub category: Option<String>,
    /// SKU
    pub sku: String,
    /// Selling price
    pub price: Decimal,
    /// Purchase cost
    pub cost: Decimal,
    /// Initial units on hand
    pub quantity: i32,
    /// Reorder threshold
    pub min_stock_level: i32,
    /// Storage location
    pub location: String,
}

impl ProductDraft {
    /// Validate the draft into a [`NewProduct`], applying defaults.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if a required field is missing or
    /// blank, if price or cost is not positive, or if a stock figure is negative.
    pub fn validate(self) -> Result<NewProduct> {
        let name = non_blank(self.name);
        let sku = non_blank(self.sku);

        let (Some(name), Some(sku), Some(price), Some(cost)) = (name, sku, self.price, self.cost)
        else {
            return Err(StoreError::validation(MISSING_FIELDS_MESSAGE));
        };

        let price = positive_amount(price, "Price")?;
        let cost = positive_amount(cost, "Cost")?;
        let quantity = non_negative(self.quantity.unwrap_or(0), "Quantity")?;
        let min_stock_level = non_negative(
            self.min_stock_level.unwrap_or(DEFAULT_MIN_STOCK_LEVEL),
            "Minimum stock level",
        )?;

        Ok(NewProduct {
            name,
            description: self.description,
            category: self.category,
            sku,
            price,
            cost,
            quantity,
            min_stock_level,
            location: non_blank(self.location).unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
        })
    }
}

/// Partial product update. Absent fields keep their current value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ProductPatch {
    /// New display name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New category
    pub category: Option<String>,
    /// New SKU
    pub sku: Option<String>,
    /// New selling price
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    /// New purchase cost
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub cost: Option<Decimal>,
    /// New units on hand (recorded as a stock adjustment)
    pub quantity: Option<i32>,
    /// New reorder threshold
    pub min_stock_level: Option<i32>,
    /// New storage location
    pub location: Option<String>,
}

impl ProductPatch {
    /// Validate the provided fields, normalising amounts to cents.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if a provided name or SKU is blank,
    /// a provided price or cost is not positive, or a provided stock figure is
    /// negative.
    pub fn validate(mut self) -> Result<Self> {
        if self.name.as_deref().is_some_and(|s| s.trim().is_empty()) {
            return Err(StoreError::validation("Name must not be blank"));
        }
        if self.sku.as_deref().is_some_and(|s| s.trim().is_empty()) {
            return Err(StoreError::validation("SKU must not be blank"));
        }
        self.name = self.name.map(|s| s.trim().to_string());
        self.sku = self.sku.map(|s| s.trim().to_string());
        self.price = self.price.map(|p| positive_amount(p, "Price")).transpose()?;
        self.cost = self.cost.map(|c| positive_amount(c, "Cost")).transpose()?;
        self.quantity = self.quantity.map(|q| non_negative(q, "Quantity")).transpose()?;
        self.min_stock_level = self
            .min_stock_level
            .map(|m| non_negative(m, "Minimum stock level"))
            .transpose()?;
        Ok(self)
    }

    /// Whether any product column (as opposed to inventory column) changes.
    #[must_use]
    pub const fn touches_product(&self) -> bool {
        self.name.is_some()
            || self.description.is_some()
            || self.category.is_some()
            || self.sku.is_some()
            || self.price.is_some()
            || self.cost.is_some()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn positive_amount(amount: Decimal, field: &str) -> Result<Decimal> {
    let amount = money::round_cents(amount);
    if amount <= Decimal::ZERO {
        return Err(StoreError::validation(format!(
            "{field} must be a positive number"
        )));
    }
    if amount > money::MAX_UNIT_PRICE {
        return Err(StoreError::validation(format!("{field} is too large")));
    }
    Ok(amount)
}

fn non_negative(value: i32, field: &str) -> Result<i32> {
    if value < 0 {
        return Err(StoreError::validation(format!("{field} must not be negative")));
    }
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect
mod tests {
    use super::*;

    fn draft() -> ProductDraft {
        ProductDraft {
            name: Some("Wireless Mouse".into()),
            sku: Some("WM-001".into()),
            price: Some(Decimal::new(2999, 2)),
            cost: Some(Decimal::new(1599, 2)),
            ..ProductDraft::default()
        }
    }

    #[test]
    fn test_draft_applies_defaults() {
        let product = draft().validate().unwrap();
        assert_eq!(product.quantity, 0);
        assert_eq!(product.min_stock_level, DEFAULT_MIN_STOCK_LEVEL);
        assert_eq!(product.location, DEFAULT_LOCATION);
    }

    #[test]
    fn test_draft_requires_name_sku_price_cost() {
        let err = ProductDraft {
            sku: None,
            ..draft()
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, StoreError::Validation(msg) if msg.contains("Missing required fields")));

        let err = ProductDraft {
            name: Some("   ".into()),
            ..draft()
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn test_draft_rejects_non_positive_amounts() {
        let err = ProductDraft {
            price: Some(Decimal::ZERO),
            ..draft()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, StoreError::validation("Price must be a positive number"));

        let err = ProductDraft {
            cost: Some(Decimal::new(-5, 0)),
            ..draft()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, StoreError::validation("Cost must be a positive number"));
    }

    #[test]
    fn test_draft_rejects_amounts_beyond_column_precision() {
        let err = ProductDraft {
            price: Some(Decimal::new(100_000_000, 0)),
            ..draft()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, StoreError::validation("Price is too large"));

        let err = ProductPatch {
            cost: Some(Decimal::new(100_000_000, 0)),
            ..ProductPatch::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, StoreError::validation("Cost is too large"));
    }

    #[test]
    fn test_draft_rejects_negative_quantity() {
        let err = ProductDraft {
            quantity: Some(-1),
            ..draft()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, StoreError::validation("Quantity must not be negative"));
    }

    #[test]
    fn test_patch_keeps_absent_fields_absent() {
        let patch = ProductPatch {
            price: Some(Decimal::new(10005, 3)),
            ..ProductPatch::default()
        }
        .validate()
        .unwrap();

        assert_eq!(patch.price, Some(Decimal::new(1001, 2)));
        assert!(patch.name.is_none());
        assert!(patch.touches_product());
        assert!(!ProductPatch::default().touches_product());
    }

    #[test]
    fn test_draft_deserializes_json_numbers() {
        let draft: ProductDraft = serde_json::from_str(
            r#"{"name":"Desk","sku":"SD-001","price":599.99,"cost":399.99,"quantity":12}"#,
        )
        .unwrap();
        assert_eq!(draft.price, Some(Decimal::new(59999, 2)));
        assert_eq!(draft.quantity, Some(12));
    }
}
