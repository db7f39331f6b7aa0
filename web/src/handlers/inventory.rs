//! Inventory ledger reads.

use crate::WebResult;
use crate::extractors::ApiPath;
use crate::state::AppState;
use axum::{Json, extract::State};
use serde::Serialize;
use stockroom_core::store::InventoryLedger;
use stockroom_core::{InventoryRecord, ProductId, StockMovement};

/// Inventory record with its low-stock flag.
#[derive(Debug, Serialize)]
pub struct InventoryResponse {
    /// Inventory columns
    #[serde(flatten)]
    pub record: InventoryRecord,
    /// `quantity <= min_stock_level`
    pub low_stock: bool,
}

/// `GET /api/inventory/:product_id`
pub async fn get_inventory(
    State(state): State<AppState>,
    ApiPath(product_id): ApiPath<i64>,
) -> WebResult<Json<InventoryResponse>> {
    let record = state
        .store()
        .get_inventory(ProductId::new(product_id))
        .await?;

    Ok(Json(InventoryResponse {
        low_stock: record.is_low_stock(),
        record,
    }))
}

/// `GET /api/products/:id/movements`: newest first.
pub async fn list_movements(
    State(state): State<AppState>,
    ApiPath(product_id): ApiPath<i64>,
) -> WebResult<Json<Vec<StockMovement>>> {
    let movements = state
        .store()
        .list_stock_movements(ProductId::new(product_id))
        .await?;
    Ok(Json(movements))
}
