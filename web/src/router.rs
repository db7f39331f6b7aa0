//! Route table and middleware stack.

use crate::handlers::{dashboard, health, inventory, orders, products};
use crate::error::AppError;
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, put},
};
use std::path::Path;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Build the application router.
///
/// Everything under `/api` is JSON. When `static_dir` is given, other paths
/// are served from it, with `index.html` for unknown paths.
pub fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let api = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/products/:id",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/products/:id/movements", get(inventory::list_movements))
        .route("/inventory/:product_id", get(inventory::get_inventory))
        .route(
            "/orders",
            get(orders::list_orders).post(orders::create_order),
        )
        .route("/orders/:id", get(orders::get_order))
        .route("/orders/:id/status", put(orders::update_order_status))
        .route("/dashboard", get(dashboard::dashboard))
        .fallback(api_not_found);

    let mut app = Router::new().nest("/api", api).with_state(state);

    if let Some(dir) = static_dir {
        app = app.fallback_service(
            ServeDir::new(dir).not_found_service(ServeFile::new(dir.join("index.html"))),
        );
    }

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(correlation_id_layer())
}

#[allow(clippy::unused_async)]
async fn api_not_found() -> AppError {
    AppError::not_found("Route not found")
}
