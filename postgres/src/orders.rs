//! Order reads and the order placement transaction.

use crate::error::map_sqlx_error;
use crate::ledger::record_movement;
use crate::rows::{ORDER_COLUMNS, OrderItemRow, OrderRow};
use crate::PostgresStore;
use sqlx::{PgPool, Postgres, Transaction};
use stockroom_core::inventory::NewStockMovement;
use stockroom_core::order::{
    Order, OrderDetail, OrderId, OrderItem, OrderLine, OrderPlan, OrderStatus, PlacedOrder,
};
use stockroom_core::store::{OrderStore, StoreFuture};
use stockroom_core::{Result, StoreError};

const ORDER: &str = "Order";

impl OrderStore for PostgresStore {
    fn list_orders(&self) -> StoreFuture<'_, Vec<Order>> {
        Box::pin(async move {
            let rows: Vec<OrderRow> = sqlx::query_as(&format!(
                "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id DESC"
            ))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list orders", e))?;

            rows.into_iter().map(Order::try_from).collect()
        })
    }

    fn get_order(&self, id: OrderId) -> StoreFuture<'_, OrderDetail> {
        Box::pin(async move {
            let row: OrderRow =
                sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
                    .bind(id.get())
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| map_sqlx_error("get order", e))?
                    .ok_or_else(|| StoreError::not_found(ORDER, id.get()))?;

            let items: Vec<OrderItemRow> = sqlx::query_as(
                r"
                SELECT oi.id, oi.order_id, oi.product_id, oi.quantity, oi.price, oi.subtotal,
                       p.name, p.sku
                FROM order_items oi
                LEFT JOIN products p ON p.id = oi.product_id
                WHERE oi.order_id = $1
                ORDER BY oi.id
                ",
            )
            .bind(id.get())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get order items", e))?;

            Ok(OrderDetail {
                order: row.try_into()?,
                items: items.into_iter().map(OrderItem::from).collect(),
            })
        })
    }

    fn place_order(&self, plan: OrderPlan) -> StoreFuture<'_, PlacedOrder> {
        Box::pin(async move {
            // Dropping the write future on timeout drops `tx`, which rolls back.
            let writes = write_order(&self.pool, &plan);
            let (tx, order_id) = tokio::time::timeout(plan.write_timeout, writes)
                .await
                .map_err(|_| {
                    tracing::warn!(
                        order_number = %plan.order_number,
                        timeout_ms = plan.write_timeout.as_millis(),
                        "Order writes timed out, rolled back"
                    );
                    StoreError::Timeout(plan.write_timeout)
                })??;

            tx.commit()
                .await
                .map_err(|e| map_sqlx_error("commit order", e))?;

            tracing::info!(
                order_id = %order_id,
                order_number = %plan.order_number,
                item_count = plan.lines.len(),
                total_amount = %plan.total_amount,
                "Order committed"
            );

            Ok(PlacedOrder {
                id: order_id,
                order_number: plan.order_number,
                total_amount: plan.total_amount,
            })
        })
    }

    fn set_order_status(&self, id: OrderId, status: OrderStatus) -> StoreFuture<'_, Order> {
        Box::pin(async move {
            let row: OrderRow = sqlx::query_as(&format!(
                "UPDATE orders SET status = $2, updated_at = NOW()
                 WHERE id = $1
                 RETURNING {ORDER_COLUMNS}"
            ))
            .bind(id.get())
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update order status", e))?
            .ok_or_else(|| StoreError::not_found(ORDER, id.get()))?;

            row.try_into()
        })
    }
}

/// Open a transaction and write the order with all its lines, leaving the
/// commit to the caller.
async fn write_order(
    pool: &PgPool,
    plan: &OrderPlan,
) -> Result<(Transaction<'static, Postgres>, OrderId)> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| map_sqlx_error("start transaction", e))?;

    // Any early return drops `tx`, which rolls the transaction back.
    let (id,): (i64,) = sqlx::query_as(
        r"
        INSERT INTO orders
            (order_number, customer_name, customer_email, customer_phone,
             total_amount, status)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        ",
    )
    .bind(&plan.order_number)
    .bind(&plan.customer.name)
    .bind(&plan.customer.email)
    .bind(&plan.customer.phone)
    .bind(plan.total_amount)
    .bind(OrderStatus::Pending.as_str())
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| map_sqlx_error("insert order", e))?;
    let order_id = OrderId::new(id);

    for line in &plan.lines {
        write_line(&mut tx, order_id, line).await?;
    }

    Ok((tx, order_id))
}

/// Insert one item, decrement its stock conditionally and record the movement.
async fn write_line(
    tx: &mut Transaction<'_, Postgres>,
    order_id: OrderId,
    line: &OrderLine,
) -> Result<()> {
    sqlx::query(
        r"
        INSERT INTO order_items (order_id, product_id, quantity, price, subtotal)
        VALUES ($1, $2, $3, $4, $5)
        ",
    )
    .bind(order_id.get())
    .bind(line.product_id.get())
    .bind(line.quantity)
    .bind(line.price)
    .bind(line.subtotal()?)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("insert order item", e))?;

    let decremented = sqlx::query(
        r"
        UPDATE inventory
        SET quantity = quantity - $1, updated_at = NOW()
        WHERE product_id = $2 AND quantity >= $1
        ",
    )
    .bind(line.quantity)
    .bind(line.product_id.get())
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("decrement inventory", e))?;

    if decremented.rows_affected() == 0 {
        let available: Option<i32> =
            sqlx::query_scalar("SELECT quantity FROM inventory WHERE product_id = $1")
                .bind(line.product_id.get())
                .fetch_optional(&mut **tx)
                .await
                .map_err(|e| map_sqlx_error("read inventory", e))?;

        tracing::warn!(
            order_id = %order_id,
            product_id = %line.product_id,
            requested = line.quantity,
            ?available,
            "Conditional decrement failed, rolling back order"
        );

        return Err(match available {
            None => StoreError::not_found("Product", line.product_id.get()),
            Some(_) => StoreError::Conflict(format!(
                "Stock for product {} changed while the order was being placed",
                line.product_id
            )),
        });
    }

    tracing::debug!(
        product_id = %line.product_id,
        quantity = line.quantity,
        "Stock decremented"
    );

    record_movement(
        tx,
        &NewStockMovement::order_sale(line.product_id, line.quantity, order_id),
    )
    .await
}
