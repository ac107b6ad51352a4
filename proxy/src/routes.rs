//! Inbound routes: `/products` for listing, `/product` for single-product
//! operations keyed by the `product_id` query parameter.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use catalog_core::{ApiError, ListParams};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Operation, OperationExt, ProxyError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IdParams {
    pub product_id: Option<String>,
}

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route(
            "/product",
            get(get_product)
                .post(create_product)
                .put(update_product)
                .delete(delete_product),
        )
}

async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, ProxyError> {
    let op = Operation::ListProducts;
    let request = state.upstream().build_list_products(&params).during(op)?;
    Ok(Json(state.forward(op, request).await?))
}

async fn get_product(
    State(state): State<AppState>,
    Query(params): Query<IdParams>,
) -> Result<Json<Value>, ProxyError> {
    let op = Operation::GetProduct;
    let request = state
        .upstream()
        .build_get_product(params.product_id.as_deref())
        .during(op)?;
    Ok(Json(state.forward(op, request).await?))
}

async fn create_product(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ProxyError> {
    let op = Operation::CreateProduct;
    let body = json_body(&body).during(op)?;
    let request = state.upstream().build_create_product(&body).during(op)?;
    let created = state.forward(op, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_product(
    State(state): State<AppState>,
    Query(params): Query<IdParams>,
    body: Bytes,
) -> Result<Json<Value>, ProxyError> {
    let op = Operation::UpdateProduct;
    let request = state
        .upstream()
        .build_update_product(params.product_id.as_deref(), &json_body(&body).during(op)?)
        .during(op)?;
    Ok(Json(state.forward(op, request).await?))
}

async fn delete_product(
    State(state): State<AppState>,
    Query(params): Query<IdParams>,
) -> Result<Json<Value>, ProxyError> {
    let op = Operation::DeleteProduct;
    let request = state
        .upstream()
        .build_delete_product(params.product_id.as_deref())
        .during(op)?;
    Ok(Json(state.forward(op, request).await?))
}

fn json_body(raw: &[u8]) -> Result<Value, ApiError> {
    serde_json::from_slice(raw)
        .map_err(|e| ApiError::validation(format!("request body must be JSON: {e}")))
}
