//! Inventory ledger and stock movement types.
//!
//! Every change to an [`InventoryRecord`]'s quantity is paired with an
//! append-only [`StockMovement`] describing the delta and its cause.

use crate::catalog::ProductId;
use crate::error::{Result, StoreError};
use crate::order::OrderId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reason recorded for stock leaving through a placed order.
pub const ORDER_SALE_REASON: &str = "Order sale";

/// Reason recorded when an operator sets a product's quantity directly.
pub const MANUAL_ADJUSTMENT_REASON: &str = "Manual adjustment";

/// Reference type pointing a movement at an order.
pub const ORDER_REFERENCE: &str = "order";

/// Reference type pointing a movement at a product edit.
pub const PRODUCT_REFERENCE: &str = "product";

/// On-hand stock for one product.
///
/// `quantity` is never negative; stores only mutate it through a conditional
/// decrement or an explicit set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    /// Owning product
    pub product_id: ProductId,
    /// Units on hand
    pub quantity: i32,
    /// Reorder threshold
    pub min_stock_level: i32,
    /// Storage location
    pub location: Option<String>,
}

impl InventoryRecord {
    /// Low stock means `quantity <= min_stock_level`.
    #[must_use]
    pub const fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_stock_level
    }

    /// Whether `requested` units can be taken from this record.
    #[must_use]
    pub fn can_fulfil(&self, requested: i64) -> bool {
        i64::from(self.quantity) >= requested
    }
}

/// Direction of a stock movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    /// Stock received or adjusted upwards
    In,
    /// Stock sold or adjusted downwards
    Out,
}

impl MovementType {
    /// Database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementType {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            _ => Err(StoreError::Database(format!("Invalid movement type: {s}"))),
        }
    }
}

/// A recorded stock movement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    /// Movement identifier
    pub id: i64,
    /// Product whose stock moved
    pub product_id: ProductId,
    /// Direction
    pub movement_type: MovementType,
    /// Absolute number of units moved
    pub quantity: i32,
    /// Free-text cause
    pub reason: Option<String>,
    /// Kind of entity that caused the movement
    pub reference_type: Option<String>,
    /// Identifier of the entity that caused the movement
    pub reference_id: Option<i64>,
    /// When the movement was recorded
    pub created_at: DateTime<Utc>,
}

/// A movement about to be appended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewStockMovement {
    /// Product whose stock moved
    pub product_id: ProductId,
    /// Direction
    pub movement_type: MovementType,
    /// Absolute number of units moved (positive)
    pub quantity: i32,
    /// Free-text cause
    pub reason: &'static str,
    /// Kind of entity that caused the movement
    pub reference_type: &'static str,
    /// Identifier of the entity that caused the movement
    pub reference_id: i64,
}

impl NewStockMovement {
    /// Outgoing movement for one line of a placed order.
    #[must_use]
    pub const fn order_sale(product_id: ProductId, quantity: i32, order_id: OrderId) -> Self {
        Self {
            product_id,
            movement_type: MovementType::Out,
            quantity,
            reason: ORDER_SALE_REASON,
            reference_type: ORDER_REFERENCE,
            reference_id: order_id.get(),
        }
    }

    /// Movement for a direct quantity change from `previous` to `current`.
    ///
    /// Returns `None` when the quantity did not change.
    #[must_use]
    pub fn adjustment(product_id: ProductId, previous: i32, current: i32) -> Option<Self> {
        let delta = i64::from(current) - i64::from(previous);
        let movement_type = match delta.signum() {
            1 => MovementType::In,
            -1 => MovementType::Out,
            _ => return None,
        };

        Some(Self {
            product_id,
            movement_type,
            quantity: i32::try_from(delta.abs()).ok()?,
            reason: MANUAL_ADJUSTMENT_REASON,
            reference_type: PRODUCT_REFERENCE,
            reference_id: product_id.get(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_stock_is_inclusive() {
        let record = InventoryRecord {
            product_id: ProductId::new(1),
            quantity: 5,
            min_stock_level: 5,
            location: None,
        };
        assert!(record.is_low_stock());
        assert!(record.can_fulfil(5));
        assert!(!record.can_fulfil(6));
    }

    #[test]
    fn test_order_sale_movement() {
        let movement = NewStockMovement::order_sale(ProductId::new(3), 2, OrderId::new(9));
        assert_eq!(movement.movement_type, MovementType::Out);
        assert_eq!(movement.reason, "Order sale");
        assert_eq!(movement.reference_type, "order");
        assert_eq!(movement.reference_id, 9);
    }

    #[test]
    fn test_adjustment_direction_and_magnitude() {
        let up = NewStockMovement::adjustment(ProductId::new(1), 10, 25);
        assert!(matches!(up, Some(m) if m.movement_type == MovementType::In && m.quantity == 15));

        let down = NewStockMovement::adjustment(ProductId::new(1), 10, 4);
        assert!(matches!(down, Some(m) if m.movement_type == MovementType::Out && m.quantity == 6));

        assert!(NewStockMovement::adjustment(ProductId::new(1), 7, 7).is_none());
    }

    #[test]
    fn test_movement_type_round_trips_through_str() {
        assert_eq!("out".parse::<MovementType>(), Ok(MovementType::Out));
        assert!("sideways".parse::<MovementType>().is_err());
    }
}
