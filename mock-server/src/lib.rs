//! In-memory stand-in for the external product service.
//!
//! Serves `/api/web/v1/products` (limit/offset/search listing) and
//! `/api/web/v1/product` (single-product CRUD keyed by a `product_id` query
//! parameter). Products keep insertion order so pages are stable.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub product_id: String,
    pub product_title: String,
    pub product_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_category: Option<String>,
    pub created_timestamp: String,
    pub updated_timestamp: String,
}

#[derive(Deserialize)]
pub struct CreateProduct {
    pub product_title: String,
    #[serde(default)]
    pub product_price: f64,
    pub product_description: Option<String>,
    pub product_image: Option<String>,
    pub product_category: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateProduct {
    pub product_title: Option<String>,
    pub product_price: Option<f64>,
    pub product_description: Option<String>,
    pub product_image: Option<String>,
    pub product_category: Option<String>,
}

/// Page shape returned by the list endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProductPage {
    pub data: Vec<Product>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}

#[derive(Deserialize)]
struct ListParams {
    limit: Option<usize>,
    offset: Option<usize>,
    search: Option<String>,
}

#[derive(Deserialize)]
struct IdParams {
    product_id: Option<String>,
}

pub type Db = Arc<RwLock<Vec<Product>>>;

type Failure = (StatusCode, Json<Value>);

const DEFAULT_LIMIT: usize = 10;

pub fn app() -> Router {
    app_with(Arc::new(RwLock::new(Vec::new())))
}

/// Router over an existing store.
pub fn app_with(db: Db) -> Router {
    Router::new()
        .route("/api/web/v1/products", get(list_products))
        .route(
            "/api/web/v1/product",
            get(get_product)
                .post(create_product)
                .put(update_product)
                .delete(delete_product),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn failure(status: StatusCode, message: &str) -> Failure {
    (status, Json(json!({ "message": message })))
}

fn require_id(params: IdParams) -> Result<String, Failure> {
    params
        .product_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| failure(StatusCode::BAD_REQUEST, "product_id is required"))
}

fn matches_search(product: &Product, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    [
        Some(&product.product_title),
        product.product_description.as_ref(),
        product.product_category.as_ref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(needle))
}

async fn list_products(
    State(db): State<Db>,
    Query(params): Query<ListParams>,
) -> Json<ProductPage> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).max(1);
    let offset = params.offset.unwrap_or(0);
    let needle = params.search.unwrap_or_default().trim().to_lowercase();

    let products = db.read().await;
    let filtered: Vec<&Product> = products
        .iter()
        .filter(|p| matches_search(p, &needle))
        .collect();
    let data = filtered
        .iter()
        .skip(offset)
        .take(limit)
        .map(|p| (*p).clone())
        .collect();

    Json(ProductPage {
        data,
        total: filtered.len(),
        page: offset / limit + 1,
        limit,
    })
}

async fn get_product(
    State(db): State<Db>,
    Query(params): Query<IdParams>,
) -> Result<Json<Product>, Failure> {
    let id = require_id(params)?;
    let products = db.read().await;
    products
        .iter()
        .find(|p| p.product_id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "not found"))
}

async fn create_product(
    State(db): State<Db>,
    Json(input): Json<CreateProduct>,
) -> Result<(StatusCode, Json<Product>), Failure> {
    if input.product_title.trim().is_empty() {
        return Err(failure(
            StatusCode::UNPROCESSABLE_ENTITY,
            "product_title is required",
        ));
    }
    let timestamp = now();
    let product = Product {
        product_id: Uuid::new_v4().to_string(),
        product_title: input.product_title,
        product_price: input.product_price,
        product_description: input.product_description,
        product_image: input.product_image,
        product_category: input.product_category,
        created_timestamp: timestamp.clone(),
        updated_timestamp: timestamp,
    };
    db.write().await.push(product.clone());
    tracing::info!(product_id = %product.product_id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(db): State<Db>,
    Query(params): Query<IdParams>,
    Json(input): Json<UpdateProduct>,
) -> Result<Json<Product>, Failure> {
    let id = require_id(params)?;
    let mut products = db.write().await;
    let product = products
        .iter_mut()
        .find(|p| p.product_id == id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "not found"))?;
    if let Some(title) = input.product_title {
        product.product_title = title;
    }
    if let Some(price) = input.product_price {
        product.product_price = price;
    }
    if input.product_description.is_some() {
        product.product_description = input.product_description;
    }
    if input.product_image.is_some() {
        product.product_image = input.product_image;
    }
    if input.product_category.is_some() {
        product.product_category = input.product_category;
    }
    product.updated_timestamp = now();
    Ok(Json(product.clone()))
}

async fn delete_product(
    State(db): State<Db>,
    Query(params): Query<IdParams>,
) -> Result<Json<Value>, Failure> {
    let id = require_id(params)?;
    let mut products = db.write().await;
    let index = products
        .iter()
        .position(|p| p.product_id == id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "not found"))?;
    products.remove(index);
    tracing::info!(product_id = %id, "product deleted");
    Ok(Json(json!({ "message": "deleted", "product_id": id })))
}
