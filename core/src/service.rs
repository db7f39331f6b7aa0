//! Order Placement Service.
//!
//! Orchestrates a placement in three phases:
//!
//! 1. **Validate** the request shape (no datastore access)
//! 2. **Snapshot check** every requested product against current stock, so
//!    the common failure cases are reported before any write begins
//! 3. **Commit** the order as one unit of work through
//!    [`OrderStore::place_order`], retrying on transient conflicts with a
//!    fresh order number
//!
//! The snapshot check is advisory. Two concurrent placements can both pass
//! it; the conditional decrement inside the unit of work is what keeps stock
//! from going negative.

use crate::catalog::ProductId;
use crate::environment::{Clock, generate_order_number};
use crate::error::{Result, StoreError};
use crate::order::{NewOrder, Order, OrderId, OrderPlan, OrderStatus, PlacedOrder, ValidatedOrder};
use crate::retry::{RetryPolicy, retry_with_predicate};
use crate::store::{InventoryLedger, InventoryStore, OrderStore};
use std::sync::Arc;
use std::time::Duration;

/// Default budget for the writes of one placement attempt.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(5);

/// Places orders and transitions their status.
///
/// Cheap to clone; clones share the underlying store and clock.
#[derive(Clone)]
pub struct OrderPlacementService {
    store: Arc<dyn InventoryStore>,
    clock: Arc<dyn Clock>,
    retry_policy: RetryPolicy,
    attempt_timeout: Duration,
}

impl OrderPlacementService {
    /// Create a service with the default retry policy and attempt timeout.
    #[must_use]
    pub fn new(store: Arc<dyn InventoryStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            retry_policy: RetryPolicy::default(),
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }

    /// Replace the retry policy used for transient conflicts.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Replace the per-attempt budget for the writes before commit.
    #[must_use]
    pub const fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn InventoryStore> {
        &self.store
    }

    /// The clock used for order numbers.
    #[must_use]
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Place an order.
    ///
    /// # Errors
    ///
    /// - `Validation`: malformed request, nothing written
    /// - `NotFound`: a product has no inventory record, nothing written
    /// - `InsufficientStock`: requested more than on hand, nothing written
    /// - `Conflict`: lost a stock race, or transient conflicts outlasted the
    ///   retry budget
    /// - `Timeout`: an attempt's writes overran their budget and were rolled
    ///   back; never returned for an order that was committed
    /// - `Database`: datastore failure
    #[tracing::instrument(skip_all, fields(item_count = order.items.len()))]
    pub async fn place_order(&self, order: NewOrder) -> Result<PlacedOrder> {
        let result = self.try_place_order(order).await;

        match &result {
            Ok(placed) => {
                metrics::counter!("stockroom_orders_placed_total").increment(1);
                tracing::info!(
                    order_id = %placed.id,
                    order_number = %placed.order_number,
                    total_amount = %placed.total_amount,
                    "Order placed"
                );
            }
            Err(err) => {
                metrics::counter!("stockroom_orders_rejected_total", "reason" => rejection_reason(err))
                    .increment(1);
                tracing::info!(error = %err, "Order rejected");
            }
        }

        result
    }

    async fn try_place_order(&self, order: NewOrder) -> Result<PlacedOrder> {
        let order = order.validate()?;
        self.check_stock(&order).await?;

        let placed = retry_with_predicate(
            &self.retry_policy,
            |attempt| self.attempt(&order, attempt),
            StoreError::is_transient,
        )
        .await
        .map_err(|err| match err {
            StoreError::Transient(reason) => {
                tracing::warn!(%reason, "Giving up after transient conflicts");
                StoreError::Conflict(
                    "Order could not be placed because of concurrent updates, please retry"
                        .to_string(),
                )
            }
            other => other,
        })?;

        let units: i64 = order.lines.iter().map(|l| i64::from(l.quantity)).sum();
        metrics::counter!("stockroom_units_sold_total").increment(units.unsigned_abs());

        Ok(placed)
    }

    async fn check_stock(&self, order: &ValidatedOrder) -> Result<()> {
        for (product_id, requested) in order.requested_per_product() {
            let record = self.store.get_inventory(product_id).await?;
            if !record.can_fulfil(requested) {
                return Err(insufficient(product_id, requested, record.quantity));
            }
        }
        Ok(())
    }

    async fn attempt(&self, order: &ValidatedOrder, attempt: usize) -> Result<PlacedOrder> {
        if attempt > 0 {
            metrics::counter!("stockroom_order_retries_total").increment(1);
        }

        let plan = OrderPlan::new(
            order,
            generate_order_number(self.clock.now()),
            self.attempt_timeout,
        );
        tracing::debug!(attempt, order_number = %plan.order_number, "Placing order");

        // The store bounds the writes before commit; the commit is never cut short.
        self.store.place_order(plan).await
    }

    /// Overwrite an order's status. Any status may follow any other.
    ///
    /// # Errors
    ///
    /// - `Validation`: `status` is not one of the known statuses
    /// - `NotFound`: no order with this id
    /// - `Database`: datastore failure
    pub async fn set_order_status(&self, id: OrderId, status: &str) -> Result<Order> {
        let status: OrderStatus = status.parse()?;
        let order = self.store.set_order_status(id, status).await?;
        tracing::info!(order_id = %id, %status, "Order status updated");
        Ok(order)
    }
}

const fn insufficient(product_id: ProductId, requested: i64, available: i32) -> StoreError {
    StoreError::InsufficientStock {
        product_id,
        requested,
        available,
    }
}

const fn rejection_reason(err: &StoreError) -> &'static str {
    match err {
        StoreError::Validation(_) => "validation",
        StoreError::NotFound { .. } => "not_found",
        StoreError::InsufficientStock { .. } => "insufficient_stock",
        StoreError::Conflict(_) | StoreError::Transient(_) => "conflict",
        StoreError::Timeout(_) => "timeout",
        StoreError::Database(_) => "database",
    }
}
