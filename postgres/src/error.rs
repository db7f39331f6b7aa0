//! Translation of sqlx errors into [`StoreError`].

use stockroom_core::StoreError;

const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

const SKU_CONSTRAINT: &str = "products_sku_key";
const ORDER_NUMBER_CONSTRAINT: &str = "orders_order_number_key";

/// Message returned when a SKU is already taken.
pub const DUPLICATE_SKU_MESSAGE: &str = "Product with this SKU already exists";

/// Map a sqlx error raised while performing `context`.
///
/// - duplicate SKU → `Conflict`
/// - serialization failure, deadlock, duplicate order number → `Transient`
/// - anything else → `Database`
#[must_use]
pub fn map_sqlx_error(context: &str, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if matches!(
            db_err.code().as_deref(),
            Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED)
        ) {
            return StoreError::Transient(format!("{context}: {db_err}"));
        }

        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some(SKU_CONSTRAINT) => {
                    return StoreError::Conflict(DUPLICATE_SKU_MESSAGE.to_string());
                }
                Some(ORDER_NUMBER_CONSTRAINT) => {
                    return StoreError::Transient(format!("{context}: order number collision"));
                }
                _ => {}
            }
        }
    }

    StoreError::Database(format!("Failed to {context}: {err}"))
}
