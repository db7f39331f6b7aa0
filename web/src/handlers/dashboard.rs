//! Dashboard aggregates.

use crate::WebResult;
use crate::state::AppState;
use axum::{Json, extract::State};
use chrono::NaiveTime;
use stockroom_core::store::{DashboardStats, InventoryStore};

/// `GET /api/dashboard`: product, low-stock and order counts. "Today" is the
/// current UTC date.
pub async fn dashboard(State(state): State<AppState>) -> WebResult<Json<DashboardStats>> {
    let day_start = state
        .clock()
        .now()
        .date_naive()
        .and_time(NaiveTime::MIN)
        .and_utc();

    let stats = state.store().dashboard(day_start).await?;
    Ok(Json(stats))
}
