//! Exact money arithmetic.
//!
//! Amounts are [`Decimal`] values with two fractional digits. Totals are summed
//! in fixed point, so adding many line items never accumulates binary
//! floating-point error.

use crate::error::{Result, StoreError};
use rust_decimal::{Decimal, RoundingStrategy};

/// Number of fractional digits stored for every amount.
pub const SCALE: u32 = 2;

/// Largest unit price a product or order line can carry (`NUMERIC(10,2)`).
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, SCALE);

/// Largest line subtotal or order total (`NUMERIC(12,2)`).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, SCALE);

/// Message returned when a computed amount exceeds [`MAX_AMOUNT`].
pub const AMOUNT_TOO_LARGE: &str = "Order amount is too large";

/// Round an amount to whole cents, halves away from zero.
#[must_use]
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// `price * quantity` for a single line.
///
/// # Errors
///
/// Returns [`StoreError::Validation`] if the product overflows or exceeds
/// [`MAX_AMOUNT`].
pub fn subtotal(price: Decimal, quantity: i32) -> Result<Decimal> {
    price
        .checked_mul(Decimal::from(quantity))
        .filter(|amount| *amount <= MAX_AMOUNT)
        .ok_or_else(|| StoreError::validation(AMOUNT_TOO_LARGE))
}

/// Sum of line subtotals.
///
/// # Errors
///
/// Returns [`StoreError::Validation`] if the sum overflows or exceeds
/// [`MAX_AMOUNT`].
pub fn total<I>(subtotals: I) -> Result<Decimal>
where
    I: IntoIterator<Item = Result<Decimal>>,
{
    subtotals.into_iter().try_fold(Decimal::ZERO, |sum, amount| {
        sum.checked_add(amount?)
            .filter(|sum| *sum <= MAX_AMOUNT)
            .ok_or_else(|| StoreError::validation(AMOUNT_TOO_LARGE))
    })
}
