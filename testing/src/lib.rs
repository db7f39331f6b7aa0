//! # Stockroom Testing
//!
//! Test doubles for the Stockroom store traits.
//!
//! This crate provides:
//! - [`InMemoryStore`]: a complete store held in process memory, atomic under
//!   a single lock, with the same observable semantics as the `PostgreSQL` store
//! - [`FixedClock`]: deterministic time
//! - [`FaultyStore`]: a wrapper that injects transient failures and latency
//!   into order placement
//! - [`fixtures`]: sample catalog and request builders
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use stockroom_core::OrderPlacementService;
//! use stockroom_testing::{InMemoryStore, test_clock};
//!
//! let store = InMemoryStore::with_sample_data();
//! let service = OrderPlacementService::new(Arc::new(store), Arc::new(test_clock()));
//! ```

mod faults;
pub mod fixtures;
mod memory;

pub use faults::FaultyStore;
pub use memory::InMemoryStore;
pub use mocks::{FixedClock, test_clock};

/// Mock implementations of environment traits.
pub mod mocks {
    use chrono::{DateTime, TimeZone, Utc};
    use stockroom_core::environment::Clock;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use stockroom_testing::mocks::FixedClock;
    /// use stockroom_core::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// A clock fixed at 2025-01-15 12:00:00 UTC.
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0)
                .single()
                .unwrap_or_default(),
        )
    }
}
