//! Stateless request builder and response parser for the catalog list/edit
//! surface, as consumed by a UI host.
//!
//! # Design
//! `CatalogClient` holds only a `base_url`. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`. Identifier checks happen in `build_*`,
//! so an empty id never produces a request at all.

use serde::de::DeserializeOwned;

use crate::error::{ApiError, ErrorEnvelope};
use crate::http::{json_headers, HttpMethod, HttpRequest, HttpResponse};
use crate::types::{ListQuery, ListResult, Product, ProductFields};

pub(crate) const PRODUCT_ID_REQUIRED: &str = "product_id query is required";

/// Synchronous, stateless client for the catalog list/detail/mutation routes.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_list_products(&self, query: &ListQuery) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/products", self.base_url),
            query: vec![
                ("page".to_string(), query.page.to_string()),
                ("limit".to_string(), query.limit.to_string()),
                ("search".to_string(), query.search.clone()),
            ],
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_get_product(&self, id: &str) -> Result<HttpRequest, ApiError> {
        Ok(self.product_request(HttpMethod::Get, require_id(id)?, None))
    }

    pub fn build_create_product(&self, fields: &ProductFields) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(fields).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/product", self.base_url),
            query: Vec::new(),
            headers: json_headers(),
            body: Some(body),
        })
    }

    pub fn build_update_product(
        &self,
        id: &str,
        fields: &ProductFields,
    ) -> Result<HttpRequest, ApiError> {
        let id = require_id(id)?;
        let body = serde_json::to_string(fields).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.product_request(HttpMethod::Put, id, Some(body)))
    }

    pub fn build_delete_product(&self, id: &str) -> Result<HttpRequest, ApiError> {
        Ok(self.product_request(HttpMethod::Delete, require_id(id)?, None))
    }

    pub fn parse_list_products(&self, response: HttpResponse) -> Result<ListResult, ApiError> {
        parse_json(&response)
    }

    pub fn parse_get_product(&self, response: HttpResponse) -> Result<Product, ApiError> {
        parse_json(&response)
    }

    pub fn parse_create_product(&self, response: HttpResponse) -> Result<Product, ApiError> {
        parse_json(&response)
    }

    pub fn parse_update_product(&self, response: HttpResponse) -> Result<Product, ApiError> {
        parse_json(&response)
    }

    /// The acknowledgment body is implementation-defined, so only the status
    /// is interpreted.
    pub fn parse_delete_product(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    fn product_request(&self, method: HttpMethod, id: &str, body: Option<String>) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}/product", self.base_url),
            query: vec![("product_id".to_string(), id.to_string())],
            headers: if body.is_some() { json_headers() } else { Vec::new() },
            body,
        }
    }
}

/// Reject empty or whitespace-only identifiers.
pub(crate) fn require_id(id: &str) -> Result<&str, ApiError> {
    if id.trim().is_empty() {
        return Err(ApiError::validation(PRODUCT_ID_REQUIRED));
    }
    Ok(id)
}

/// Map non-success statuses to `ApiError::Upstream`, unwrapping the error
/// envelope when the body is one.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    match serde_json::from_str::<ErrorEnvelope>(&response.body) {
        Ok(envelope) => Err(ApiError::Upstream {
            status: response.status,
            details: envelope.details,
        }),
        Err(_) => Err(ApiError::from_response(response)),
    }
}

fn parse_json<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    check_status(response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Transport(e.to_string()))
}
