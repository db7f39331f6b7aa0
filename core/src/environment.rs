//! Injected dependencies: wall clock and order-number generation.
//!
//! Production code uses [`SystemClock`]; tests swap in a fixed clock from
//! `stockroom-testing` so that order numbers and timestamps are predictable.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;

/// Prefix shared by every generated order number.
pub const ORDER_NUMBER_PREFIX: &str = "ORD";

/// Length of the random suffix appended to an order number.
const ORDER_NUMBER_SUFFIX_LEN: usize = 6;

/// Clock trait - abstracts time operations for testability
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Generate an order number of the form `ORD-<unix millis>-<6 alphanumerics>`.
///
/// The random suffix makes same-millisecond collisions unlikely; the store's
/// uniqueness constraint catches the rest and the caller retries with a fresh
/// number.
#[must_use]
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ORDER_NUMBER_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{ORDER_NUMBER_PREFIX}-{}-{suffix}", now.timestamp_millis())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_order_number_format() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let number = generate_order_number(now);

        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert_eq!(parts[1], "1700000000123");
        assert_eq!(parts[2].len(), 6);
        assert!(parts[2].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_order_numbers_differ_within_same_millisecond() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let numbers: std::collections::HashSet<String> =
            (0..50).map(|_| generate_order_number(now)).collect();
        assert!(numbers.len() > 1);
    }
}
