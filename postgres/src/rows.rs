//! Row shapes returned by queries, and their conversion into domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use stockroom_core::catalog::{Product, ProductId, ProductView};
use stockroom_core::inventory::{InventoryRecord, StockMovement};
use stockroom_core::order::{Order, OrderId, OrderItem};
use stockroom_core::{Result, StoreError};

/// Columns selected for a product joined with its inventory.
pub const PRODUCT_VIEW_COLUMNS: &str = r"
    p.id, p.name, p.description, p.category, p.sku, p.price, p.cost,
    p.created_at, p.updated_at,
    i.quantity, i.min_stock_level, i.location
";

/// Columns selected for an order header.
pub const ORDER_COLUMNS: &str = r"
    id, order_number, customer_name, customer_email, customer_phone,
    total_amount, status, created_at, updated_at
";

#[derive(sqlx::FromRow)]
pub struct ProductViewRow {
    id: i64,
    name: String,
    description: Option<String>,
    category: Option<String>,
    sku: String,
    price: Decimal,
    cost: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    quantity: Option<i32>,
    min_stock_level: Option<i32>,
    location: Option<String>,
}

impl From<ProductViewRow> for ProductView {
    fn from(row: ProductViewRow) -> Self {
        Self {
            product: Product {
                id: ProductId::new(row.id),
                name: row.name,
                description: row.description,
                category: row.category,
                sku: row.sku,
                price: row.price,
                cost: row.cost,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            quantity: row.quantity,
            min_stock_level: row.min_stock_level,
            location: row.location,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct InventoryRow {
    product_id: i64,
    quantity: i32,
    min_stock_level: i32,
    location: Option<String>,
}

impl From<InventoryRow> for InventoryRecord {
    fn from(row: InventoryRow) -> Self {
        Self {
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
            min_stock_level: row.min_stock_level,
            location: row.location,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct StockMovementRow {
    id: i64,
    product_id: i64,
    movement_type: String,
    quantity: i32,
    reason: Option<String>,
    reference_type: Option<String>,
    reference_id: Option<i64>,
    created_at: DateTime<Utc>,
}

impl TryFrom<StockMovementRow> for StockMovement {
    type Error = StoreError;

    fn try_from(row: StockMovementRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            product_id: ProductId::new(row.product_id),
            movement_type: row.movement_type.parse()?,
            quantity: row.quantity,
            reason: row.reason,
            reference_type: row.reference_type,
            reference_id: row.reference_id,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
pub struct OrderRow {
    id: i64,
    order_number: String,
    customer_name: String,
    customer_email: Option<String>,
    customer_phone: Option<String>,
    total_amount: Decimal,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self> {
        let status = row
            .status
            .parse()
            .map_err(|_| StoreError::Database(format!("Invalid order status: {}", row.status)))?;

        Ok(Self {
            id: OrderId::new(row.id),
            order_number: row.order_number,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            customer_phone: row.customer_phone,
            total_amount: row.total_amount,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
pub struct OrderItemRow {
    id: i64,
    order_id: i64,
    product_id: i64,
    quantity: i32,
    price: Decimal,
    subtotal: Decimal,
    name: Option<String>,
    sku: Option<String>,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: row.id,
            order_id: OrderId::new(row.order_id),
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
            price: row.price,
            subtotal: row.subtotal,
            name: row.name,
            sku: row.sku,
        }
    }
}
