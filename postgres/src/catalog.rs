//! Catalog writes and reads.

use crate::error::map_sqlx_error;
use crate::rows::{PRODUCT_VIEW_COLUMNS, ProductViewRow};
use crate::PostgresStore;
use stockroom_core::catalog::{NewProduct, ProductId, ProductPatch, ProductView};
use stockroom_core::inventory::NewStockMovement;
use stockroom_core::store::{CatalogStore, StoreFuture};
use stockroom_core::{Result, StoreError};
use sqlx::{Postgres, Transaction};

const PRODUCT: &str = "Product";

impl CatalogStore for PostgresStore {
    fn list_products(&self) -> StoreFuture<'_, Vec<ProductView>> {
        Box::pin(async move {
            let rows: Vec<ProductViewRow> = sqlx::query_as(&format!(
                "SELECT {PRODUCT_VIEW_COLUMNS}
                 FROM products p
                 LEFT JOIN inventory i ON i.product_id = p.id
                 ORDER BY p.created_at DESC, p.id DESC"
            ))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list products", e))?;

            Ok(rows.into_iter().map(ProductView::from).collect())
        })
    }

    fn get_product(&self, id: ProductId) -> StoreFuture<'_, ProductView> {
        Box::pin(async move {
            let row: ProductViewRow = sqlx::query_as(&format!(
                "SELECT {PRODUCT_VIEW_COLUMNS}
                 FROM products p
                 LEFT JOIN inventory i ON i.product_id = p.id
                 WHERE p.id = $1"
            ))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get product", e))?
            .ok_or_else(|| StoreError::not_found(PRODUCT, id.get()))?;

            Ok(row.into())
        })
    }

    fn create_product(&self, product: NewProduct) -> StoreFuture<'_, ProductId> {
        Box::pin(async move {
            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(|e| map_sqlx_error("start transaction", e))?;

            let (id,): (i64,) = sqlx::query_as(
                r"
                INSERT INTO products (name, description, category, sku, price, cost)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id
                ",
            )
            .bind(&product.name)
            .bind(&product.description)
            .bind(&product.category)
            .bind(&product.sku)
            .bind(product.price)
            .bind(product.cost)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("create product", e))?;

            sqlx::query(
                r"
                INSERT INTO inventory (product_id, quantity, min_stock_level, location)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(id)
            .bind(product.quantity)
            .bind(product.min_stock_level)
            .bind(&product.location)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("create inventory record", e))?;

            tx.commit()
                .await
                .map_err(|e| map_sqlx_error("commit transaction", e))?;

            tracing::info!(product_id = id, sku = %product.sku, "Product created");
            Ok(ProductId::new(id))
        })
    }

    fn update_product(&self, id: ProductId, patch: ProductPatch) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(|e| map_sqlx_error("start transaction", e))?;

            let exists: Option<i64> =
                sqlx::query_scalar("SELECT id FROM products WHERE id = $1 FOR UPDATE")
                    .bind(id.get())
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(|e| map_sqlx_error("lock product", e))?;
            if exists.is_none() {
                return Err(StoreError::not_found(PRODUCT, id.get()));
            }

            if patch.touches_product() {
                sqlx::query(
                    r"
                    UPDATE products
                    SET name = COALESCE($2, name),
                        description = COALESCE($3, description),
                        category = COALESCE($4, category),
                        sku = COALESCE($5, sku),
                        price = COALESCE($6, price),
                        cost = COALESCE($7, cost),
                        updated_at = NOW()
                    WHERE id = $1
                    ",
                )
                .bind(id.get())
                .bind(&patch.name)
                .bind(&patch.description)
                .bind(&patch.category)
                .bind(&patch.sku)
                .bind(patch.price)
                .bind(patch.cost)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("update product", e))?;
            }

            if patch.quantity.is_some()
                || patch.min_stock_level.is_some()
                || patch.location.is_some()
            {
                update_inventory(&mut tx, id, &patch).await?;
            }

            tx.commit()
                .await
                .map_err(|e| map_sqlx_error("commit transaction", e))?;

            tracing::info!(product_id = %id, "Product updated");
            Ok(())
        })
    }

    fn delete_product(&self, id: ProductId) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM products WHERE id = $1")
                .bind(id.get())
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("delete product", e))?;

            if result.rows_affected() == 0 {
                return Err(StoreError::not_found(PRODUCT, id.get()));
            }

            tracing::info!(product_id = %id, "Product deleted");
            Ok(())
        })
    }
}

/// Set inventory fields and record the quantity delta as a manual adjustment.
async fn update_inventory(
    tx: &mut Transaction<'_, Postgres>,
    id: ProductId,
    patch: &ProductPatch,
) -> Result<()> {
    let previous: Option<i32> =
        sqlx::query_scalar("SELECT quantity FROM inventory WHERE product_id = $1 FOR UPDATE")
            .bind(id.get())
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("lock inventory", e))?;

    sqlx::query(
        r"
        INSERT INTO inventory (product_id, quantity, min_stock_level, location)
        VALUES ($1, COALESCE($2, 0), COALESCE($3, 10), $4)
        ON CONFLICT (product_id) DO UPDATE
        SET quantity = COALESCE($2, inventory.quantity),
            min_stock_level = COALESCE($3, inventory.min_stock_level),
            location = COALESCE($4, inventory.location),
            updated_at = NOW()
        ",
    )
    .bind(id.get())
    .bind(patch.quantity)
    .bind(patch.min_stock_level)
    .bind(&patch.location)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("update inventory", e))?;

    if let Some(movement) = patch
        .quantity
        .and_then(|current| NewStockMovement::adjustment(id, previous.unwrap_or(0), current))
    {
        crate::ledger::record_movement(tx, &movement).await?;
    }

    Ok(())
}
