//! In-memory store.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use stockroom_core::catalog::{NewProduct, Product, ProductId, ProductPatch, ProductView};
use stockroom_core::environment::{Clock, SystemClock};
use stockroom_core::inventory::{InventoryRecord, NewStockMovement, StockMovement};
use stockroom_core::order::{
    Order, OrderDetail, OrderId, OrderItem, OrderLine, OrderPlan, OrderStatus, PlacedOrder,
};
use stockroom_core::store::{
    CatalogStore, DashboardStats, InventoryLedger, InventoryStore, OrderStore, StoreFuture,
};
use stockroom_core::{Result, StoreError};

const DUPLICATE_SKU: &str = "Product with this SKU already exists";

#[derive(Default)]
struct Tables {
    products: BTreeMap<i64, Product>,
    inventory: BTreeMap<i64, InventoryRecord>,
    orders: BTreeMap<i64, Order>,
    order_items: Vec<OrderItem>,
    movements: Vec<StockMovement>,
    next_product_id: i64,
    next_order_id: i64,
    next_item_id: i64,
    next_movement_id: i64,
}

impl Tables {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    fn view(&self, product: &Product) -> ProductView {
        let record = self.inventory.get(&product.id.get());
        ProductView {
            product: product.clone(),
            quantity: record.map(|r| r.quantity),
            min_stock_level: record.map(|r| r.min_stock_level),
            location: record.and_then(|r| r.location.clone()),
        }
    }

    fn sku_taken(&self, sku: &str, except: Option<ProductId>) -> bool {
        self.products
            .values()
            .any(|p| p.sku == sku && Some(p.id) != except)
    }

    fn record_movement(&mut self, movement: &NewStockMovement, now: DateTime<Utc>) {
        let id = Self::next_id(&mut self.next_movement_id);
        self.movements.push(StockMovement {
            id,
            product_id: movement.product_id,
            movement_type: movement.movement_type,
            quantity: movement.quantity,
            reason: Some(movement.reason.to_string()),
            reference_type: Some(movement.reference_type.to_string()),
            reference_id: Some(movement.reference_id),
            created_at: now,
        });
    }
}

/// A store held entirely in memory.
///
/// Every operation runs under one lock, so each write is atomic and
/// concurrent order placements serialize exactly as conditional decrements
/// would in the database. Timestamps come from the injected clock.
#[derive(Clone)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// An empty store using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// An empty store using `clock` for timestamps.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
            clock,
        }
    }

    /// A store seeded with the sample catalog from [`crate::fixtures::sample_products`].
    #[must_use]
    pub fn with_sample_data() -> Self {
        let store = Self::new();
        store.seed(crate::fixtures::sample_products());
        store
    }

    /// Insert products directly, skipping SKU checks. Returns their ids.
    pub fn seed(&self, products: impl IntoIterator<Item = NewProduct>) -> Vec<ProductId> {
        let now = self.clock.now();
        let Ok(mut tables) = self.tables.lock() else {
            return Vec::new();
        };
        products
            .into_iter()
            .map(|product| insert_product(&mut tables, product, now))
            .collect()
    }

    /// Number of orders stored.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.tables.lock().map_or(0, |t| t.orders.len())
    }

    /// Number of order items stored.
    #[must_use]
    pub fn order_item_count(&self) -> usize {
        self.tables.lock().map_or(0, |t| t.order_items.len())
    }

    /// Every recorded movement, oldest first.
    #[must_use]
    pub fn movements(&self) -> Vec<StockMovement> {
        self.tables
            .lock()
            .map(|t| t.movements.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Database("in-memory store lock poisoned".to_string()))
    }
}

fn insert_product(tables: &mut Tables, product: NewProduct, now: DateTime<Utc>) -> ProductId {
    let id = ProductId::new(Tables::next_id(&mut tables.next_product_id));
    tables.products.insert(
        id.get(),
        Product {
            id,
            name: product.name,
            description: product.description,
            category: product.category,
            sku: product.sku,
            price: product.price,
            cost: product.cost,
            created_at: now,
            updated_at: now,
        },
    );
    tables.inventory.insert(
        id.get(),
        InventoryRecord {
            product_id: id,
            quantity: product.quantity,
            min_stock_level: product.min_stock_level,
            location: Some(product.location),
        },
    );
    id
}

impl CatalogStore for InMemoryStore {
    fn list_products(&self) -> StoreFuture<'_, Vec<ProductView>> {
        Box::pin(async move {
            let tables = self.lock()?;
            let mut products: Vec<&Product> = tables.products.values().collect();
            products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            Ok(products.into_iter().map(|p| tables.view(p)).collect())
        })
    }

    fn get_product(&self, id: ProductId) -> StoreFuture<'_, ProductView> {
        Box::pin(async move {
            let tables = self.lock()?;
            tables
                .products
                .get(&id.get())
                .map(|p| tables.view(p))
                .ok_or_else(|| StoreError::not_found("Product", id.get()))
        })
    }

    fn create_product(&self, product: NewProduct) -> StoreFuture<'_, ProductId> {
        Box::pin(async move {
            let now = self.clock.now();
            let mut tables = self.lock()?;
            if tables.sku_taken(&product.sku, None) {
                return Err(StoreError::Conflict(DUPLICATE_SKU.to_string()));
            }
            Ok(insert_product(&mut tables, product, now))
        })
    }

    fn update_product(&self, id: ProductId, patch: ProductPatch) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let now = self.clock.now();
            let mut tables = self.lock()?;

            if !tables.products.contains_key(&id.get()) {
                return Err(StoreError::not_found("Product", id.get()));
            }
            if let Some(sku) = &patch.sku {
                if tables.sku_taken(sku, Some(id)) {
                    return Err(StoreError::Conflict(DUPLICATE_SKU.to_string()));
                }
            }

            if let Some(product) = tables.products.get_mut(&id.get()) {
                if patch.touches_product() {
                    product.updated_at = now;
                }
                if let Some(name) = patch.name {
                    product.name = name;
                }
                if let Some(description) = patch.description {
                    product.description = Some(description);
                }
                if let Some(category) = patch.category {
                    product.category = Some(category);
                }
                if let Some(sku) = patch.sku {
                    product.sku = sku;
                }
                if let Some(price) = patch.price {
                    product.price = price;
                }
                if let Some(cost) = patch.cost {
                    product.cost = cost;
                }
            }

            let record = tables.inventory.entry(id.get()).or_insert(InventoryRecord {
                product_id: id,
                quantity: 0,
                min_stock_level: stockroom_core::catalog::DEFAULT_MIN_STOCK_LEVEL,
                location: None,
            });
            let previous = record.quantity;
            if let Some(quantity) = patch.quantity {
                record.quantity = quantity;
            }
            if let Some(min) = patch.min_stock_level {
                record.min_stock_level = min;
            }
            if let Some(location) = patch.location {
                record.location = Some(location);
            }

            if let Some(movement) = patch
                .quantity
                .and_then(|current| NewStockMovement::adjustment(id, previous, current))
            {
                tables.record_movement(&movement, now);
            }
            Ok(())
        })
    }

    fn delete_product(&self, id: ProductId) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let mut tables = self.lock()?;
            tables
                .products
                .remove(&id.get())
                .ok_or_else(|| StoreError::not_found("Product", id.get()))?;
            tables.inventory.remove(&id.get());
            Ok(())
        })
    }
}

impl InventoryLedger for InMemoryStore {
    fn get_inventory(&self, product_id: ProductId) -> StoreFuture<'_, InventoryRecord> {
        Box::pin(async move {
            self.lock()?
                .inventory
                .get(&product_id.get())
                .cloned()
                .ok_or_else(|| StoreError::not_found("Product", product_id.get()))
        })
    }

    fn list_stock_movements(&self, product_id: ProductId) -> StoreFuture<'_, Vec<StockMovement>> {
        Box::pin(async move {
            let tables = self.lock()?;
            let mut movements: Vec<StockMovement> = tables
                .movements
                .iter()
                .filter(|m| m.product_id == product_id)
                .cloned()
                .collect();
            if movements.is_empty() && !tables.products.contains_key(&product_id.get()) {
                return Err(StoreError::not_found("Product", product_id.get()));
            }
            movements.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            Ok(movements)
        })
    }
}

impl OrderStore for InMemoryStore {
    fn list_orders(&self) -> StoreFuture<'_, Vec<Order>> {
        Box::pin(async move {
            let tables = self.lock()?;
            let mut orders: Vec<Order> = tables.orders.values().cloned().collect();
            orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            Ok(orders)
        })
    }

    fn get_order(&self, id: OrderId) -> StoreFuture<'_, OrderDetail> {
        Box::pin(async move {
            let tables = self.lock()?;
            let order = tables
                .orders
                .get(&id.get())
                .cloned()
                .ok_or_else(|| StoreError::not_found("Order", id.get()))?;
            let items = tables
                .order_items
                .iter()
                .filter(|item| item.order_id == id)
                .map(|item| {
                    let product = tables.products.get(&item.product_id.get());
                    OrderItem {
                        name: product.map(|p| p.name.clone()),
                        sku: product.map(|p| p.sku.clone()),
                        ..item.clone()
                    }
                })
                .collect();
            Ok(OrderDetail { order, items })
        })
    }

    fn place_order(&self, plan: OrderPlan) -> StoreFuture<'_, PlacedOrder> {
        Box::pin(async move {
            let now = self.clock.now();
            let mut tables = self.lock()?;

            if tables
                .orders
                .values()
                .any(|o| o.order_number == plan.order_number)
            {
                return Err(StoreError::Transient(format!(
                    "order number collision: {}",
                    plan.order_number
                )));
            }

            // Stage every decrement before touching the tables.
            let mut remaining: HashMap<i64, i32> = HashMap::new();
            for line in &plan.lines {
                let key = line.product_id.get();
                let available = match remaining.get(&key) {
                    Some(quantity) => *quantity,
                    None => tables
                        .inventory
                        .get(&key)
                        .map(|r| r.quantity)
                        .ok_or_else(|| StoreError::not_found("Product", key))?,
                };
                if available < line.quantity {
                    return Err(StoreError::Conflict(format!(
                        "Stock for product {} changed while the order was being placed",
                        line.product_id
                    )));
                }
                remaining.insert(key, available - line.quantity);
            }
            let subtotals = plan
                .lines
                .iter()
                .map(OrderLine::subtotal)
                .collect::<Result<Vec<_>>>()?;

            let order_id = OrderId::new(Tables::next_id(&mut tables.next_order_id));
            tables.orders.insert(
                order_id.get(),
                Order {
                    id: order_id,
                    order_number: plan.order_number.clone(),
                    customer_name: plan.customer.name,
                    customer_email: plan.customer.email,
                    customer_phone: plan.customer.phone,
                    total_amount: plan.total_amount,
                    status: OrderStatus::Pending,
                    created_at: now,
                    updated_at: now,
                },
            );

            for (line, subtotal) in plan.lines.iter().zip(subtotals) {
                let item_id = Tables::next_id(&mut tables.next_item_id);
                tables.order_items.push(OrderItem {
                    id: item_id,
                    order_id,
                    product_id: line.product_id,
                    quantity: line.quantity,
                    price: line.price,
                    subtotal,
                    name: None,
                    sku: None,
                });
                if let Some(record) = tables.inventory.get_mut(&line.product_id.get()) {
                    record.quantity -= line.quantity;
                }
                tables.record_movement(
                    &NewStockMovement::order_sale(line.product_id, line.quantity, order_id),
                    now,
                );
            }

            Ok(PlacedOrder {
                id: order_id,
                order_number: plan.order_number,
                total_amount: plan.total_amount,
            })
        })
    }

    fn set_order_status(&self, id: OrderId, status: OrderStatus) -> StoreFuture<'_, Order> {
        Box::pin(async move {
            let now = self.clock.now();
            let mut tables = self.lock()?;
            let order = tables
                .orders
                .get_mut(&id.get())
                .ok_or_else(|| StoreError::not_found("Order", id.get()))?;
            order.status = status;
            order.updated_at = now;
            Ok(order.clone())
        })
    }
}

impl InventoryStore for InMemoryStore {
    fn dashboard(&self, day_start: DateTime<Utc>) -> StoreFuture<'_, DashboardStats> {
        Box::pin(async move {
            let tables = self.lock()?;
            let count = |n: usize| i64::try_from(n).unwrap_or(i64::MAX);
            Ok(DashboardStats {
                total_products: count(tables.products.len()),
                low_stock_items: count(
                    tables
                        .inventory
                        .values()
                        .filter(|r| r.is_low_stock())
                        .count(),
                ),
                orders_today: count(
                    tables
                        .orders
                        .values()
                        .filter(|o| o.created_at >= day_start)
                        .count(),
                ),
                total_orders: count(tables.orders.len()),
            })
        })
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            drop(self.lock()?);
            Ok(())
        })
    }
}
