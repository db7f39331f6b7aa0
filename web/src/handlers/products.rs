//! Catalog endpoints.

use super::MessageResponse;
use crate::WebResult;
use crate::error::AppError;
use crate::extractors::{ApiJson, ApiPath};
use crate::state::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::Serialize;
use stockroom_core::catalog::{MISSING_FIELDS_MESSAGE, REQUIRED_FIELDS};
use stockroom_core::store::CatalogStore;
use stockroom_core::{ProductDraft, ProductId, ProductPatch, ProductView, StoreError};

/// Body returned after creating a product.
#[derive(Debug, Serialize)]
pub struct ProductCreated {
    /// New product id
    pub id: ProductId,
    /// Confirmation
    pub message: &'static str,
}

/// `GET /api/products`
pub async fn list_products(State(state): State<AppState>) -> WebResult<Json<Vec<ProductView>>> {
    Ok(Json(state.store().list_products().await?))
}

/// `GET /api/products/:id`
pub async fn get_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> WebResult<Json<ProductView>> {
    Ok(Json(state.store().get_product(ProductId::new(id)).await?))
}

/// `POST /api/products`
pub async fn create_product(
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<ProductDraft>,
) -> WebResult<(StatusCode, Json<ProductCreated>)> {
    let product = draft.validate().map_err(|err| match err {
        StoreError::Validation(message) if message == MISSING_FIELDS_MESSAGE => {
            AppError::validation(message)
                .with_details(serde_json::json!({ "required": REQUIRED_FIELDS }))
        }
        other => other.into(),
    })?;

    let id = state.store().create_product(product).await?;

    Ok((
        StatusCode::CREATED,
        Json(ProductCreated {
            id,
            message: "Product created successfully",
        }),
    ))
}

/// `PUT /api/products/:id`: only the provided fields change.
pub async fn update_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<ProductPatch>,
) -> WebResult<Json<MessageResponse>> {
    let patch = patch.validate()?;
    state
        .store()
        .update_product(ProductId::new(id), patch)
        .await?;

    Ok(Json(MessageResponse {
        message: "Product updated successfully",
    }))
}

/// `DELETE /api/products/:id`: order history is kept.
pub async fn delete_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> WebResult<Json<MessageResponse>> {
    state.store().delete_product(ProductId::new(id)).await?;

    Ok(Json(MessageResponse {
        message: "Product deleted successfully",
    }))
}
