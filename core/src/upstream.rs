//! Request builder and response normalizer for the external product service.
//!
//! # Design
//! The external service paginates with `limit`/`offset` and identifies
//! products through a `product_id` query parameter. `UpstreamClient` turns
//! the UI-facing `page`/`limit`/`search` contract into that shape and folds
//! every failure into `ApiError`. Bodies are passed through as
//! `serde_json::Value`; nothing is re-shaped on the way back.

use serde_json::Value;

use crate::client::require_id;
use crate::error::ApiError;
use crate::http::{json_headers, HttpMethod, HttpRequest, HttpResponse};
use crate::types::{ListParams, ListQuery};

/// Path prefix of the external product service.
pub const API_PREFIX: &str = "/api/web/v1";

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    base_url: String,
}

impl UpstreamClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Normalize inbound list parameters and build the outbound request.
    pub fn build_list_products(&self, params: &ListParams) -> Result<HttpRequest, ApiError> {
        Ok(self.build_list_query(&params.resolve()?))
    }

    pub fn build_list_query(&self, query: &ListQuery) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}{API_PREFIX}/products", self.base_url),
            query: vec![
                ("limit".to_string(), query.limit.to_string()),
                ("offset".to_string(), query.offset().to_string()),
                ("search".to_string(), query.search.clone()),
            ],
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_get_product(&self, id: Option<&str>) -> Result<HttpRequest, ApiError> {
        let id = require_id(id.unwrap_or_default())?;
        Ok(self.product_request(HttpMethod::Get, Some(id), None))
    }

    /// The body is forwarded verbatim.
    pub fn build_create_product(&self, body: &Value) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.product_request(HttpMethod::Post, None, Some(body)))
    }

    pub fn build_update_product(
        &self,
        id: Option<&str>,
        body: &Value,
    ) -> Result<HttpRequest, ApiError> {
        let id = require_id(id.unwrap_or_default())?;
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.product_request(HttpMethod::Put, Some(id), Some(body)))
    }

    pub fn build_delete_product(&self, id: Option<&str>) -> Result<HttpRequest, ApiError> {
        let id = require_id(id.unwrap_or_default())?;
        Ok(self.product_request(HttpMethod::Delete, Some(id), None))
    }

    /// Interpret an upstream response without reshaping it.
    ///
    /// Any 2xx yields the JSON body (an empty body yields `null`). Non-2xx
    /// statuses become `ApiError::Upstream`, including 404 on delete.
    pub fn parse_passthrough(&self, response: HttpResponse) -> Result<Value, ApiError> {
        if !response.is_success() {
            return Err(ApiError::from_response(&response));
        }
        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&response.body).map_err(|e| ApiError::Transport(e.to_string()))
    }

    fn product_request(
        &self,
        method: HttpMethod,
        id: Option<&str>,
        body: Option<String>,
    ) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}{API_PREFIX}/product", self.base_url),
            query: id
                .map(|id| vec![("product_id".to_string(), id.to_string())])
                .unwrap_or_default(),
            headers: if body.is_some() { json_headers() } else { Vec::new() },
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn upstream() -> UpstreamClient {
        UpstreamClient::new("http://localhost:8001/")
    }

    fn params(page: Option<&str>, limit: Option<&str>, search: Option<&str>) -> ListParams {
        ListParams {
            page: page.map(str::to_string),
            limit: limit.map(str::to_string),
            search: search.map(str::to_string),
        }
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn list_converts_page_to_offset() {
        let req = upstream()
            .build_list_products(&params(Some("3"), Some("20"), Some("mug")))
            .unwrap();
        assert_eq!(
            req.url(),
            "http://localhost:8001/api/web/v1/products?limit=20&offset=40&search=mug"
        );
        assert!(req.query_param("page").is_none());
    }

    #[test]
    fn list_offset_matches_formula() {
        for page in 1..=5u32 {
            for limit in [1u32, 7, 10, 100] {
                let req = upstream()
                    .build_list_products(&params(
                        Some(&page.to_string()),
                        Some(&limit.to_string()),
                        None,
                    ))
                    .unwrap();
                let expected = ((page - 1) * limit).to_string();
                assert_eq!(req.query_param("offset"), Some(expected.as_str()));
            }
        }
    }

    #[test]
    fn missing_search_is_forwarded_as_empty() {
        let req = upstream().build_list_products(&params(None, None, None)).unwrap();
        assert_eq!(req.query_param("search"), Some(""));
        assert_eq!(req.query_param("limit"), Some("10"));
        assert_eq!(req.query_param("offset"), Some("0"));
    }

    #[test]
    fn zero_page_is_rejected_locally() {
        let err = upstream()
            .build_list_products(&params(Some("0"), Some("10"), None))
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn id_operations_require_an_id() {
        let u = upstream();
        let body = json!({"product_title": "Mug"});
        assert!(matches!(u.build_get_product(None), Err(ApiError::Validation(_))));
        assert!(matches!(u.build_update_product(Some(""), &body), Err(ApiError::Validation(_))));
        assert!(matches!(u.build_delete_product(None), Err(ApiError::Validation(_))));
    }

    #[test]
    fn update_forwards_id_and_body_verbatim() {
        let body = json!({"product_title": "Mug", "extra": [1, 2]});
        let req = upstream().build_update_product(Some("p1"), &body).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(
            req.url(),
            "http://localhost:8001/api/web/v1/product?product_id=p1"
        );
        let sent: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, body);
    }

    #[test]
    fn create_has_no_identifier() {
        let req = upstream().build_create_product(&json!({})).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert!(req.query.is_empty());
    }

    #[test]
    fn passthrough_returns_body_unmodified() {
        let body = r#"{"data":[],"total":0,"page":1,"limit":10,"extra":"kept"}"#;
        let value = upstream().parse_passthrough(response(200, body)).unwrap();
        assert_eq!(value["extra"], "kept");
    }

    #[test]
    fn passthrough_empty_success_is_null() {
        let value = upstream().parse_passthrough(response(204, "")).unwrap();
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn not_found_is_surfaced() {
        let err = upstream()
            .parse_passthrough(response(404, r#"{"message":"not found"}"#))
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Upstream {
                status: 404,
                details: json!({"message": "not found"}),
            }
        );
    }

    #[test]
    fn unparseable_success_is_transport_error() {
        let err = upstream().parse_passthrough(response(200, "<html>")).unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(err.status(), 500);
    }
}
