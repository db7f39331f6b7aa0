//! Inventory ledger reads and the stock movement recorder.

use crate::error::map_sqlx_error;
use crate::rows::{InventoryRow, StockMovementRow};
use crate::PostgresStore;
use sqlx::{Postgres, Transaction};
use stockroom_core::catalog::ProductId;
use stockroom_core::inventory::{InventoryRecord, NewStockMovement, StockMovement};
use stockroom_core::store::{InventoryLedger, StoreFuture};
use stockroom_core::{Result, StoreError};

impl InventoryLedger for PostgresStore {
    fn get_inventory(&self, product_id: ProductId) -> StoreFuture<'_, InventoryRecord> {
        Box::pin(async move {
            let row: InventoryRow = sqlx::query_as(
                r"
                SELECT product_id, quantity, min_stock_level, location
                FROM inventory
                WHERE product_id = $1
                ",
            )
            .bind(product_id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get inventory", e))?
            .ok_or_else(|| StoreError::not_found("Product", product_id.get()))?;

            Ok(row.into())
        })
    }

    fn list_stock_movements(&self, product_id: ProductId) -> StoreFuture<'_, Vec<StockMovement>> {
        Box::pin(async move {
            let rows: Vec<StockMovementRow> = sqlx::query_as(
                r"
                SELECT id, product_id, movement_type, quantity, reason,
                       reference_type, reference_id, created_at
                FROM stock_movements
                WHERE product_id = $1
                ORDER BY created_at DESC, id DESC
                ",
            )
            .bind(product_id.get())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list stock movements", e))?;

            if rows.is_empty() {
                let exists: bool =
                    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                        .bind(product_id.get())
                        .fetch_one(&self.pool)
                        .await
                        .map_err(|e| map_sqlx_error("check product", e))?;
                if !exists {
                    return Err(StoreError::not_found("Product", product_id.get()));
                }
            }

            rows.into_iter().map(StockMovement::try_from).collect()
        })
    }
}

/// Append a movement inside an open transaction.
pub(crate) async fn record_movement(
    tx: &mut Transaction<'_, Postgres>,
    movement: &NewStockMovement,
) -> Result<()> {
    sqlx::query(
        r"
        INSERT INTO stock_movements
            (product_id, movement_type, quantity, reason, reference_type, reference_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        ",
    )
    .bind(movement.product_id.get())
    .bind(movement.movement_type.as_str())
    .bind(movement.quantity)
    .bind(movement.reason)
    .bind(movement.reference_type)
    .bind(movement.reference_id)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("record stock movement", e))?;

    tracing::debug!(
        product_id = %movement.product_id,
        movement_type = %movement.movement_type,
        quantity = movement.quantity,
        reason = movement.reason,
        "Stock movement recorded"
    );
    Ok(())
}
