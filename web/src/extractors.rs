//! Custom Axum extractors.
//!
//! - [`ApiJson`]: JSON body extractor whose rejections are 400 responses in
//!   the API's error shape
//! - [`ApiPath`]: path parameter extractor with the same rejection shape
//! - [`CorrelationId`]: the request's correlation id

use crate::error::AppError;
use axum::{
    Json, async_trait,
    extract::{
        FromRequest, FromRequestParts, Path, Request,
        rejection::{JsonRejection, PathRejection},
    },
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// JSON request body.
///
/// Malformed JSON, a missing `Content-Type` and type mismatches (for example
/// a fractional `quantity`) are all answered with 400 `INVALID_JSON`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(json_rejection(&rejection)),
        }
    }
}

fn json_rejection(rejection: &JsonRejection) -> AppError {
    AppError::new(
        axum::http::StatusCode::BAD_REQUEST,
        rejection.body_text(),
        "INVALID_JSON",
    )
}

/// Typed path parameters.
///
/// A segment that does not parse into `T` (for example `/api/orders/abc`)
/// is answered with 400 `INVALID_PATH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(rejection) => Err(path_rejection(&rejection)),
        }
    }
}

fn path_rejection(rejection: &PathRejection) -> AppError {
    AppError::new(
        axum::http::StatusCode::BAD_REQUEST,
        rejection.body_text(),
        "INVALID_PATH",
    )
}

/// Correlation ID for request tracing.
///
/// Reads the id stored by [`crate::middleware::correlation_id_layer`], falling
/// back to the `X-Correlation-ID` header, or a fresh UUID v4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Self>() {
            return Ok(*id);
        }

        let correlation_id = parts
            .headers
            .get(crate::middleware::CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}
