//! HTTP boundary for Stockroom.
//!
//! Maps JSON requests onto the catalog, inventory and order operations of
//! `stockroom-core` and serializes their results.
//!
//! # Request Flow
//!
//! 1. **Correlation id** is attached by [`middleware::correlation_id_layer`]
//! 2. **Extract** path parameters and the JSON body ([`extractors::ApiPath`],
//!    [`extractors::ApiJson`])
//! 3. **Call** the store or the order placement service
//! 4. **Map** the result, or the [`stockroom_core::StoreError`] through
//!    [`AppError`], to an HTTP response
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use stockroom_core::{OrderPlacementService, SystemClock};
//! use stockroom_web::{AppState, build_router};
//! # fn example(store: Arc<dyn stockroom_core::InventoryStore>) {
//! let service = OrderPlacementService::new(store, Arc::new(SystemClock));
//! let app = build_router(AppState::new(service), None);
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::AppError;
pub use extractors::{ApiJson, ApiPath, CorrelationId};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer};
pub use router::build_router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
