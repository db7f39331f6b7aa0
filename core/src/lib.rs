//! # Stockroom Core
//!
//! Domain model and business rules for the Stockroom inventory service.
//!
//! This crate has no knowledge of HTTP or of a particular database. It provides:
//!
//! - **Domain types**: products, inventory records, orders, order items and
//!   stock movements
//! - **Validation**: turning loosely-typed request payloads into validated
//!   commands before anything is written
//! - **Store traits**: the Catalog, Inventory Ledger and Order stores that a
//!   datastore adapter implements (`stockroom-postgres`, `stockroom-testing`)
//! - **Order placement**: the [`service::OrderPlacementService`] that checks
//!   stock, then commits the order, its items, the inventory decrements and the
//!   audit trail as a single unit of work
//!
//! ## Order placement flow
//!
//! ```text
//! NewOrder ──validate──▶ ValidatedOrder ──stock snapshot check──▶ OrderPlan
//!                                                                     │
//!                               ┌─────────────────────────────────────┘
//!                               ▼
//!                  OrderStore::place_order (one transaction)
//!                    ├─ insert order (status = pending)
//!                    ├─ insert order items (price snapshot, subtotal)
//!                    ├─ conditional decrement of inventory
//!                    └─ append stock movement (type = out)
//! ```
//!
//! Transient datastore conflicts are retried a bounded number of times with a
//! fresh order number; any other failure rolls the whole order back.

pub mod catalog;
pub mod environment;
pub mod error;
pub mod inventory;
pub mod money;
pub mod order;
pub mod retry;
pub mod service;
pub mod store;

pub use catalog::{NewProduct, Product, ProductDraft, ProductId, ProductPatch, ProductView};
pub use environment::{Clock, SystemClock};
pub use error::{Result, StoreError};
pub use inventory::{InventoryRecord, MovementType, NewStockMovement, StockMovement};
pub use order::{
    Customer, NewOrder, Order, OrderDetail, OrderId, OrderItem, OrderLine, OrderLineInput,
    OrderPlan, OrderStatus, PlacedOrder, ValidatedOrder,
};
pub use retry::RetryPolicy;
pub use service::OrderPlacementService;
pub use store::{CatalogStore, DashboardStats, InventoryLedger, InventoryStore, OrderStore, StoreFuture};

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use rust_decimal::Decimal;
