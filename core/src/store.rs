//! Datastore abstractions.
//!
//! The service layer talks to the datastore only through these traits.
//! `stockroom-postgres` provides the production implementation and
//! `stockroom-testing` an in-memory one with the same semantics.
//!
//! # Dyn Compatibility
//!
//! Methods return [`StoreFuture`] instead of using `async fn` so the traits can
//! be used as `Arc<dyn InventoryStore>` in application state.
//!
//! # Atomicity
//!
//! Every write method is one unit of work: it either applies completely or
//! leaves no trace. In particular [`OrderStore::place_order`] must decrement
//! stock conditionally (never below zero) and roll back the order, its items,
//! every decrement and every movement if any step fails.

use crate::catalog::{NewProduct, ProductId, ProductPatch, ProductView};
use crate::error::Result;
use crate::inventory::{InventoryRecord, StockMovement};
use crate::order::{Order, OrderDetail, OrderId, OrderPlan, OrderStatus, PlacedOrder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by every store method.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Product catalog operations.
pub trait CatalogStore: Send + Sync {
    /// All products joined with their inventory, newest first.
    ///
    /// # Errors
    ///
    /// - `Database`: query failed
    fn list_products(&self) -> StoreFuture<'_, Vec<ProductView>>;

    /// One product joined with its inventory.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no product with this id
    /// - `Database`: query failed
    fn get_product(&self, id: ProductId) -> StoreFuture<'_, ProductView>;

    /// Create a product together with its inventory record.
    ///
    /// # Errors
    ///
    /// - `Conflict`: the SKU is already taken
    /// - `Database`: write failed (nothing is persisted)
    fn create_product(&self, product: NewProduct) -> StoreFuture<'_, ProductId>;

    /// Apply a partial update.
    ///
    /// A quantity change sets the inventory record and appends a manual
    /// adjustment movement in the same unit of work.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no product with this id
    /// - `Conflict`: the new SKU is already taken
    /// - `Database`: write failed (nothing is persisted)
    fn update_product(&self, id: ProductId, patch: ProductPatch) -> StoreFuture<'_, ()>;

    /// Delete a product and its inventory record.
    ///
    /// Order items and stock movements that reference the product are kept.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no product with this id
    /// - `Database`: write failed
    fn delete_product(&self, id: ProductId) -> StoreFuture<'_, ()>;
}

/// Inventory ledger and stock movement reads.
pub trait InventoryLedger: Send + Sync {
    /// Current inventory record for a product.
    ///
    /// # Errors
    ///
    /// - `NotFound`: the product has no inventory record
    /// - `Database`: query failed
    fn get_inventory(&self, product_id: ProductId) -> StoreFuture<'_, InventoryRecord>;

    /// Movements recorded for a product, newest first.
    ///
    /// # Errors
    ///
    /// - `NotFound`: the product does not exist and no movement references it
    /// - `Database`: query failed
    fn list_stock_movements(&self, product_id: ProductId) -> StoreFuture<'_, Vec<StockMovement>>;
}

/// Order operations.
pub trait OrderStore: Send + Sync {
    /// All orders, newest first (ties broken by id descending).
    ///
    /// # Errors
    ///
    /// - `Database`: query failed
    fn list_orders(&self) -> StoreFuture<'_, Vec<Order>>;

    /// One order with its items in insertion order.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no order with this id
    /// - `Database`: query failed
    fn get_order(&self, id: OrderId) -> StoreFuture<'_, OrderDetail>;

    /// Write an order, its items, the stock decrements and the movements as
    /// one unit of work.
    ///
    /// # Errors
    ///
    /// - `NotFound`: a line references a product without inventory
    /// - `Conflict`: a conditional decrement affected no row (lost race)
    /// - `Transient`: serialization failure, deadlock or order-number collision
    /// - `Timeout`: the writes before commit overran `plan.write_timeout`
    /// - `Database`: any other failure
    ///
    /// In every error case nothing is persisted. Once the commit has been
    /// sent it runs to completion regardless of `plan.write_timeout`.
    fn place_order(&self, plan: OrderPlan) -> StoreFuture<'_, PlacedOrder>;

    /// Overwrite an order's status.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no order with this id
    /// - `Database`: write failed
    fn set_order_status(&self, id: OrderId, status: OrderStatus) -> StoreFuture<'_, Order>;
}

/// Everything the HTTP boundary needs from a datastore.
pub trait InventoryStore: CatalogStore + InventoryLedger + OrderStore {
    /// Aggregate counts for the dashboard. `day_start` is the start of the
    /// current UTC day.
    ///
    /// # Errors
    ///
    /// - `Database`: query failed
    fn dashboard(&self, day_start: DateTime<Utc>) -> StoreFuture<'_, DashboardStats>;

    /// Check that the datastore answers.
    ///
    /// # Errors
    ///
    /// - `Database`: the datastore is unreachable
    fn ping(&self) -> StoreFuture<'_, ()>;
}

/// Dashboard counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Products in the catalog
    pub total_products: i64,
    /// Products at or below their reorder threshold
    pub low_stock_items: i64,
    /// Orders placed since the start of the current UTC day
    pub orders_today: i64,
    /// Orders ever placed
    pub total_orders: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_serializes_camel_case() {
        let stats = DashboardStats {
            total_products: 5,
            low_stock_items: 1,
            orders_today: 2,
            total_orders: 9,
        };
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "totalProducts": 5,
                "lowStockItems": 1,
                "ordersToday": 2,
                "totalOrders": 9
            })
        );
    }
}
