//! Order types and order-placement validation.
//!
//! Orders progress through `pending → processing → completed` or are
//! `cancelled`; the service does not enforce a transition graph.
//!
//! Placement goes through three shapes:
//!
//! 1. [`NewOrder`]: the loosely-typed request payload
//! 2. [`ValidatedOrder`]: every line has a product, a positive quantity and a
//!    positive price
//! 3. [`OrderPlan`]: a validated order plus its generated order number and
//!    exact total, ready to be written as one unit of work

use crate::catalog::ProductId;
use crate::error::{Result, StoreError};
use crate::money;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use std::str::FromStr;

/// Unique identifier for an order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(i64);

impl OrderId {
    /// Creates an `OrderId` from its database value
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

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of an order in its lifecycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order has been placed and awaits processing
    #[default]
    Pending,
    /// Order is being prepared
    Processing,
    /// Order has been fulfilled
    Completed,
    /// Order was cancelled
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::Processing,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// String forms of every status, for error payloads.
    #[must_use]
    pub fn valid_values() -> Vec<&'static str> {
        Self::ALL.iter().map(Self::as_str).collect()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                StoreError::validation(format!(
                    "Invalid status '{s}', expected one of: {}",
                    Self::valid_values().join(", ")
                ))
            })
    }
}

/// An order header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order identifier
    pub id: OrderId,
    /// Human-readable order number
    pub order_number: String,
    /// Customer name
    pub customer_name: String,
    /// Customer email
    pub customer_email: Option<String>,
    /// Customer phone
    pub customer_phone: Option<String>,
    /// Sum of item subtotals
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    /// Current status
    pub status: OrderStatus,
    /// When the order was placed
    pub created_at: DateTime<Utc>,
    /// When the order was last modified
    pub updated_at: DateTime<Utc>,
}

/// A line of a placed order. Never modified after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Item identifier
    pub id: i64,
    /// Owning order
    pub order_id: OrderId,
    /// Referenced product (may no longer exist)
    pub product_id: ProductId,
    /// Units ordered
    pub quantity: i32,
    /// Unit price at the time the order was placed
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// `price * quantity`
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    /// Current product name, `None` once the product is deleted
    pub name: Option<String>,
    /// Current product SKU, `None` once the product is deleted
    pub sku: Option<String>,
}

/// An order with its items.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetail {
    /// Order header
    #[serde(flatten)]
    pub order: Order,
    /// Items in insertion order
    pub items: Vec<OrderItem>,
}

/// One requested line, as received.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct OrderLineInput {
    /// Product to order
    pub product_id: Option<i64>,
    /// Units to order
    pub quantity: Option<i64>,
    /// Unit price to charge
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
}

/// Order placement request, as received.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewOrder {
    /// Customer name (required)
    pub customer_name: Option<String>,
    /// Customer email
    pub customer_email: Option<String>,
    /// Customer phone
    pub customer_phone: Option<String>,
    /// Requested lines (at least one)
    #[serde(default)]
    pub items: Vec<OrderLineInput>,
}

/// Customer contact details captured on the order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Customer {
    /// Name
    pub name: String,
    /// Email
    pub email: Option<String>,
    /// Phone
    pub phone: Option<String>,
}

/// A validated order line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderLine {
    /// Product to order
    pub product_id: ProductId,
    /// Units to order (positive)
    pub quantity: i32,
    /// Unit price snapshot (positive, whole cents)
    pub price: Decimal,
}

impl OrderLine {
    /// `price * quantity`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if the subtotal does not fit an
    /// order amount.
    pub fn subtotal(&self) -> Result<Decimal> {
        money::subtotal(self.price, self.quantity)
    }
}

/// An order that passed input validation. Stock has not been checked yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedOrder {
    /// Customer details
    pub customer: Customer,
    /// Lines in request order
    pub lines: Vec<OrderLine>,
    /// Exact sum of line subtotals
    pub total_amount: Decimal,
}

impl NewOrder {
    /// Validate the request.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] when the item list is empty, a line
    /// is missing `product_id`, `quantity` or `price`, a quantity or price is
    /// not positive, a price or amount exceeds what an order can store, or the
    /// customer name is blank.
    pub fn validate(self) -> Result<ValidatedOrder> {
        if self.items.is_empty() {
            return Err(StoreError::validation(
                "Order must contain at least one item",
            ));
        }

        let lines = self
            .items
            .into_iter()
            .map(validate_line)
            .collect::<Result<Vec<_>>>()?;
        let total_amount = money::total(lines.iter().map(OrderLine::subtotal))?;

        let name = self
            .customer_name
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| StoreError::validation("Customer name is required"))?;

        Ok(ValidatedOrder {
            customer: Customer {
                name,
                email: blank_to_none(self.customer_email),
                phone: blank_to_none(self.customer_phone),
            },
            lines,
            total_amount,
        })
    }
}

fn validate_line(line: OrderLineInput) -> Result<OrderLine> {
    let (Some(product_id), Some(quantity), Some(price)) =
        (line.product_id, line.quantity, line.price)
    else {
        return Err(StoreError::validation(
            "Each item must have product_id, quantity, and price",
        ));
    };

    if quantity <= 0 {
        return Err(StoreError::validation("Quantity must be a positive number"));
    }
    let quantity = i32::try_from(quantity)
        .map_err(|_| StoreError::validation("Quantity is too large"))?;

    let price = money::round_cents(price);
    if price <= Decimal::ZERO {
        return Err(StoreError::validation("Price must be a positive number"));
    }
    if price > money::MAX_UNIT_PRICE {
        return Err(StoreError::validation("Price is too large"));
    }

    Ok(OrderLine {
        product_id: ProductId::new(product_id),
        quantity,
        price,
    })
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl ValidatedOrder {
    /// Requested quantity per product, summed over repeated lines, in order
    /// of first appearance.
    #[must_use]
    pub fn requested_per_product(&self) -> Vec<(ProductId, i64)> {
        let mut requested: Vec<(ProductId, i64)> = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            match requested.iter_mut().find(|(id, _)| *id == line.product_id) {
                Some((_, total)) => *total += i64::from(line.quantity),
                None => requested.push((line.product_id, i64::from(line.quantity))),
            }
        }
        requested
    }
}

/// Everything a store needs to write an order as one unit of work.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderPlan {
    /// Generated order number
    pub order_number: String,
    /// Customer details
    pub customer: Customer,
    /// Lines, written in this order
    pub lines: Vec<OrderLine>,
    /// Exact total
    pub total_amount: Decimal,
    /// Budget for the writes before commit. A store abandons and rolls back
    /// an attempt that overruns it, but never interrupts the commit itself.
    pub write_timeout: Duration,
}

impl OrderPlan {
    /// Build a plan for `order` under `order_number`.
    #[must_use]
    pub fn new(order: &ValidatedOrder, order_number: String, write_timeout: Duration) -> Self {
        Self {
            order_number,
            customer: order.customer.clone(),
            lines: order.lines.clone(),
            total_amount: order.total_amount,
            write_timeout,
        }
    }
}

/// Result of a successful placement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlacedOrder {
    /// New order identifier
    pub id: OrderId,
    /// Generated order number
    pub order_number: String,
    /// Exact total
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect
mod tests {
    use super::*;

    fn line(product_id: i64, quantity: i64, price: Decimal) -> OrderLineInput {
        OrderLineInput {
            product_id: Some(product_id),
            quantity: Some(quantity),
            price: Some(price),
        }
    }

    fn order(items: Vec<OrderLineInput>) -> NewOrder {
        NewOrder {
            customer_name: Some("Alice".into()),
            items,
            ..NewOrder::default()
        }
    }

    #[test]
    fn test_empty_items_rejected() {
        let err = order(vec![]).validate().unwrap_err();
        assert_eq!(err, StoreError::validation("Order must contain at least one item"));
    }

    #[test]
    fn test_missing_line_field_rejected() {
        let err = order(vec![OrderLineInput {
            product_id: Some(1),
            quantity: None,
            price: Some(Decimal::ONE),
        }])
        .validate()
        .unwrap_err();
        assert_eq!(
            err,
            StoreError::validation("Each item must have product_id, quantity, and price")
        );
    }

    #[test]
    fn test_non_positive_quantity_and_price_rejected() {
        let err = order(vec![line(1, 0, Decimal::ONE)]).validate().unwrap_err();
        assert_eq!(err, StoreError::validation("Quantity must be a positive number"));

        let err = order(vec![line(1, 1, Decimal::new(-100, 2))])
            .validate()
            .unwrap_err();
        assert_eq!(err, StoreError::validation("Price must be a positive number"));

        // Rounds to 0.00
        let err = order(vec![line(1, 1, Decimal::new(4, 3))])
            .validate()
            .unwrap_err();
        assert_eq!(err, StoreError::validation("Price must be a positive number"));
    }

    #[test]
    fn test_blank_customer_name_rejected() {
        let err = NewOrder {
            customer_name: Some("  ".into()),
            items: vec![line(1, 1, Decimal::ONE)],
            ..NewOrder::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, StoreError::validation("Customer name is required"));
    }

    #[test]
    fn test_total_is_exact_sum_of_subtotals() {
        let validated = order(vec![
            line(1, 2, Decimal::new(1000, 2)),
            line(2, 1, Decimal::new(500, 2)),
        ])
        .validate()
        .unwrap();
        assert_eq!(validated.total_amount, Decimal::new(2500, 2));
    }

    #[test]
    fn test_price_above_column_limit_rejected() {
        let err = order(vec![line(1, 1, Decimal::new(100_000_000, 0))])
            .validate()
            .unwrap_err();
        assert_eq!(err, StoreError::validation("Price is too large"));

        let ok = order(vec![line(1, 1, money::MAX_UNIT_PRICE)]).validate();
        assert!(ok.is_ok());
    }

    #[test]
    fn test_huge_price_is_rejected_without_overflow() {
        let huge = Decimal::from_i128_with_scale(10_i128.pow(28), 0);
        let err = order(vec![line(1, 10, huge)]).validate().unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn test_total_above_column_limit_rejected() {
        let err = order(vec![
            line(1, 60, money::MAX_UNIT_PRICE),
            line(2, 60, money::MAX_UNIT_PRICE),
        ])
        .validate()
        .unwrap_err();
        assert_eq!(err, StoreError::validation(money::AMOUNT_TOO_LARGE));

        let err = order(vec![line(1, i64::from(i32::MAX), money::MAX_UNIT_PRICE)])
            .validate()
            .unwrap_err();
        assert_eq!(err, StoreError::validation(money::AMOUNT_TOO_LARGE));
    }

    #[test]
    fn test_requested_per_product_sums_repeated_lines() {
        let validated = order(vec![
            line(2, 1, Decimal::ONE),
            line(1, 6, Decimal::ONE),
            line(2, 4, Decimal::ONE),
        ])
        .validate()
        .unwrap();

        assert_eq!(
            validated.requested_per_product(),
            vec![(ProductId::new(2), 5), (ProductId::new(1), 6)]
        );
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("completed".parse::<OrderStatus>(), Ok(OrderStatus::Completed));
        let err = "bogus".parse::<OrderStatus>().unwrap_err();
        assert!(matches!(err, StoreError::Validation(msg) if msg.contains("pending, processing, completed, cancelled")));
    }

    #[test]
    fn test_new_order_from_json() {
        let parsed: NewOrder = serde_json::from_str(
            r#"{"customer_name":"Bob","items":[{"product_id":1,"quantity":2,"price":10.5}]}"#,
        )
        .unwrap();
        let validated = parsed.validate().unwrap();
        assert_eq!(validated.lines[0].price, Decimal::new(1050, 2));
        assert!(validated.customer.email.is_none());
    }
}
