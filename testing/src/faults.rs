//! Fault injection around a real store.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use stockroom_core::catalog::{NewProduct, ProductId, ProductPatch, ProductView};
use stockroom_core::inventory::{InventoryRecord, StockMovement};
use stockroom_core::order::{Order, OrderDetail, OrderId, OrderPlan, OrderStatus, PlacedOrder};
use stockroom_core::store::{
    CatalogStore, DashboardStats, InventoryLedger, InventoryStore, OrderStore, StoreFuture,
};
use stockroom_core::StoreError;

/// Wraps a store and makes `place_order` misbehave.
///
/// The first `transient_failures` placements fail with
/// [`StoreError::Transient`] before reaching the inner store. A placement can
/// be slowed down before its writes, which counts against the plan's write
/// budget, or after the inner store has committed, which does not. Every
/// other method delegates unchanged.
#[derive(Clone)]
pub struct FaultyStore {
    inner: Arc<dyn InventoryStore>,
    transient_failures: usize,
    delay: Option<Duration>,
    commit_delay: Option<Duration>,
    attempts: Arc<AtomicUsize>,
    order_numbers: Arc<Mutex<Vec<String>>>,
}

impl FaultyStore {
    /// Wrap `inner` without injecting any fault.
    #[must_use]
    pub fn new(inner: Arc<dyn InventoryStore>) -> Self {
        Self {
            inner,
            transient_failures: 0,
            delay: None,
            commit_delay: None,
            attempts: Arc::new(AtomicUsize::new(0)),
            order_numbers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fail the first `count` placements with a transient conflict.
    #[must_use]
    pub const fn failing_transiently(mut self, count: usize) -> Self {
        self.transient_failures = count;
        self
    }

    /// Spend `delay` before writing each placement. A delay longer than the
    /// plan's write budget ends the attempt with [`StoreError::Timeout`] and
    /// nothing is written.
    #[must_use]
    pub const fn delaying(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sleep for `delay` after the inner store has committed each placement,
    /// as if the commit acknowledgement were slow.
    #[must_use]
    pub const fn delaying_commit(mut self, delay: Duration) -> Self {
        self.commit_delay = Some(delay);
        self
    }

    /// Number of `place_order` calls seen so far.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Order numbers of every `place_order` call, in call order.
    #[must_use]
    pub fn order_numbers(&self) -> Vec<String> {
        self.order_numbers
            .lock()
            .map(|numbers| numbers.clone())
            .unwrap_or_default()
    }
}

impl CatalogStore for FaultyStore {
    fn list_products(&self) -> StoreFuture<'_, Vec<ProductView>> {
        self.inner.list_products()
    }

    fn get_product(&self, id: ProductId) -> StoreFuture<'_, ProductView> {
        self.inner.get_product(id)
    }

    fn create_product(&self, product: NewProduct) -> StoreFuture<'_, ProductId> {
        self.inner.create_product(product)
    }

    fn update_product(&self, id: ProductId, patch: ProductPatch) -> StoreFuture<'_, ()> {
        self.inner.update_product(id, patch)
    }

    fn delete_product(&self, id: ProductId) -> StoreFuture<'_, ()> {
        self.inner.delete_product(id)
    }
}

impl InventoryLedger for FaultyStore {
    fn get_inventory(&self, product_id: ProductId) -> StoreFuture<'_, InventoryRecord> {
        self.inner.get_inventory(product_id)
    }

    fn list_stock_movements(&self, product_id: ProductId) -> StoreFuture<'_, Vec<StockMovement>> {
        self.inner.list_stock_movements(product_id)
    }
}

impl OrderStore for FaultyStore {
    fn list_orders(&self) -> StoreFuture<'_, Vec<Order>> {
        self.inner.list_orders()
    }

    fn get_order(&self, id: OrderId) -> StoreFuture<'_, OrderDetail> {
        self.inner.get_order(id)
    }

    fn place_order(&self, plan: OrderPlan) -> StoreFuture<'_, PlacedOrder> {
        Box::pin(async move {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut numbers) = self.order_numbers.lock() {
                numbers.push(plan.order_number.clone());
            }

            if let Some(delay) = self.delay {
                if delay > plan.write_timeout {
                    tokio::time::sleep(plan.write_timeout).await;
                    return Err(StoreError::Timeout(plan.write_timeout));
                }
                tokio::time::sleep(delay).await;
            }

            if attempt < self.transient_failures {
                tracing::debug!(attempt, "Injecting transient failure");
                return Err(StoreError::Transient(format!(
                    "injected failure {attempt}"
                )));
            }

            let placed = self.inner.place_order(plan).await?;

            if let Some(delay) = self.commit_delay {
                tokio::time::sleep(delay).await;
            }
            Ok(placed)
        })
    }

    fn set_order_status(&self, id: OrderId, status: OrderStatus) -> StoreFuture<'_, Order> {
        self.inner.set_order_status(id, status)
    }
}

impl InventoryStore for FaultyStore {
    fn dashboard(&self, day_start: DateTime<Utc>) -> StoreFuture<'_, DashboardStats> {
        self.inner.dashboard(day_start)
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        self.inner.ping()
    }
}
