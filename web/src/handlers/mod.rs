//! HTTP request handlers, grouped by resource.

pub mod dashboard;
pub mod health;
pub mod inventory;
pub mod orders;
pub mod products;

use serde::Serialize;

/// Body of responses that only carry a confirmation.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable confirmation
    pub message: &'static str,
}
