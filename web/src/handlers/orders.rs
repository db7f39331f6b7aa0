//! Order endpoints.

use super::MessageResponse;
use crate::WebResult;
use crate::error::AppError;
use crate::extractors::{ApiJson, ApiPath, CorrelationId};
use crate::state::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stockroom_core::store::OrderStore;
use stockroom_core::{NewOrder, Order, OrderDetail, OrderId, OrderStatus, StoreError};
use tracing::Instrument;

/// Body returned after placing an order.
#[derive(Debug, Serialize)]
pub struct OrderCreated {
    /// New order id
    pub id: OrderId,
    /// Generated order number
    pub order_number: String,
    /// Exact order total
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    /// Confirmation
    pub message: &'static str,
}

/// Status transition request.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    /// Requested status
    #[serde(default)]
    pub status: String,
}

/// `GET /api/orders`: newest first.
pub async fn list_orders(State(state): State<AppState>) -> WebResult<Json<Vec<Order>>> {
    Ok(Json(state.store().list_orders().await?))
}

/// `GET /api/orders/:id`: the order and its items.
pub async fn get_order(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> WebResult<Json<OrderDetail>> {
    Ok(Json(state.store().get_order(OrderId::new(id)).await?))
}

/// `POST /api/orders`
///
/// Placement runs on its own task: if the client disconnects, the unit of
/// work still commits or rolls back as a whole.
pub async fn create_order(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    ApiJson(request): ApiJson<NewOrder>,
) -> WebResult<(StatusCode, Json<OrderCreated>)> {
    let service = state.orders().clone();
    let span = tracing::info_span!("place_order", correlation_id = %correlation_id.0);

    let placed = tokio::spawn(async move { service.place_order(request).await }.instrument(span))
        .await
        .map_err(|e| AppError::internal("An internal error occurred").with_source(e.into()))??;

    Ok((
        StatusCode::CREATED,
        Json(OrderCreated {
            id: placed.id,
            order_number: placed.order_number,
            total_amount: placed.total_amount,
            message: "Order created successfully",
        }),
    ))
}

/// `PUT /api/orders/:id/status`: any known status may follow any other.
pub async fn update_order_status(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(update): ApiJson<StatusUpdate>,
) -> WebResult<Json<MessageResponse>> {
    state
        .orders()
        .set_order_status(OrderId::new(id), &update.status)
        .await
        .map_err(|err| match err {
            StoreError::Validation(message) => AppError::validation(message).with_details(
                serde_json::json!({ "validStatuses": OrderStatus::valid_values() }),
            ),
            other => other.into(),
        })?;

    Ok(Json(MessageResponse {
        message: "Order status updated successfully",
    }))
}
