//! Application state shared by every handler.

use std::sync::Arc;
use stockroom_core::store::InventoryStore;
use stockroom_core::{Clock, OrderPlacementService};

/// Application state shared across all HTTP handlers.
///
/// Cloning is cheap: the store and the order service are reference counted.
#[derive(Clone)]
pub struct AppState {
    orders: OrderPlacementService,
}

impl AppState {
    /// Build state around an order placement service and its store.
    #[must_use]
    pub const fn new(orders: OrderPlacementService) -> Self {
        Self { orders }
    }

    /// The datastore.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn InventoryStore> {
        self.orders.store()
    }

    /// The order placement service.
    #[must_use]
    pub const fn orders(&self) -> &OrderPlacementService {
        &self.orders
    }

    /// The clock shared with the order service.
    #[must_use]
    pub fn clock(&self) -> &Arc<dyn Clock> {
        self.orders.clock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_is_clone_send_sync() {
        fn assert_state<T: Clone + Send + Sync + 'static>() {}
        assert_state::<AppState>();
    }
}
