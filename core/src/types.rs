//! Catalog DTOs shared by the UI-facing client, the proxy and the controller.
//!
//! # Design
//! `product_id` and the timestamps are opaque strings: they are assigned by
//! the external service and never generated or interpreted here. Optional
//! product fields are skipped when absent so update bodies stay minimal.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A catalog entry as returned by the product service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
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

/// Creatable and updatable product fields, as edited in the product form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductFields {
    pub product_title: String,
    #[serde(default)]
    pub product_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_category: Option<String>,
}

impl ProductFields {
    pub fn new(title: impl Into<String>, price: f64) -> Self {
        Self {
            product_title: title.into(),
            product_price: price,
            product_description: None,
            product_image: None,
            product_category: None,
        }
    }

    /// Form-level checks run before a create or update is submitted.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.product_title.trim().is_empty() {
            return Err(ApiError::validation("product_title is required"));
        }
        if !self.product_price.is_finite() || self.product_price < 0.0 {
            return Err(ApiError::validation(
                "product_price must be a non-negative number",
            ));
        }
        Ok(())
    }
}

impl Default for ProductFields {
    fn default() -> Self {
        Self::new("", 0.0)
    }
}

impl From<&Product> for ProductFields {
    fn from(product: &Product) -> Self {
        Self {
            product_title: product.product_title.clone(),
            product_price: product.product_price,
            product_description: product.product_description.clone(),
            product_image: product.product_image.clone(),
            product_category: product.product_category.clone(),
        }
    }
}

/// The list request as the UI sees it. `page` and `limit` are the source of
/// truth; `offset` is always derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub search: String,
}

impl ListQuery {
    pub fn new(page: u32, limit: u32, search: impl Into<String>) -> Result<Self, ApiError> {
        if page == 0 {
            return Err(ApiError::validation("page must be at least 1"));
        }
        if limit == 0 {
            return Err(ApiError::validation("limit must be at least 1"));
        }
        Ok(Self {
            page,
            limit,
            search: search.into(),
        })
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Same search, different pagination. Zero values are clamped to 1.
    pub fn with_page(&self, page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
            search: self.search.clone(),
        }
    }

    /// A new search term always starts from the first page.
    pub fn with_search(&self, search: impl Into<String>) -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: self.limit,
            search: search.into(),
        }
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_SIZE,
            search: String::new(),
        }
    }
}

/// List parameters exactly as received on the inbound query string.
///
/// Values stay textual until `resolve`, so malformed numbers surface as a
/// validation error rather than an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
}

impl ListParams {
    /// Apply defaults and constraints, producing a `ListQuery`.
    pub fn resolve(&self) -> Result<ListQuery, ApiError> {
        let page = parse_positive("page", self.page.as_deref(), DEFAULT_PAGE)?;
        let limit = parse_positive("limit", self.limit.as_deref(), DEFAULT_PAGE_SIZE)?;
        ListQuery::new(page, limit, self.search.clone().unwrap_or_default())
    }
}

fn parse_positive(name: &str, raw: Option<&str>, default: u32) -> Result<u32, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value
            .parse::<u32>()
            .map_err(|_| ApiError::validation(format!("{name} must be a positive integer"))),
    }
}

/// One page of products. `total` counts the search-filtered catalog.
/// Bodies carrying only `items` and `total` leave `page` and `limit` at 0
/// until the caller fills them from the request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListResult {
    #[serde(alias = "data")]
    pub items: Vec<Product>,
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
}

impl ListResult {
    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_derived_from_page_and_limit() {
        for (page, limit) in [(1, 1), (1, 10), (2, 10), (7, 25), (u32::MAX, u32::MAX)] {
            let query = ListQuery::new(page, limit, "").unwrap();
            assert_eq!(
                query.offset(),
                u64::from(page - 1) * u64::from(limit),
                "page {page} limit {limit}"
            );
        }
    }

    #[test]
    fn zero_page_or_limit_is_rejected() {
        assert!(matches!(ListQuery::new(0, 10, ""), Err(ApiError::Validation(_))));
        assert!(matches!(ListQuery::new(1, 0, ""), Err(ApiError::Validation(_))));
    }

    #[test]
    fn with_search_resets_page() {
        let query = ListQuery::new(4, 20, "mug").unwrap();
        let next = query.with_search("shoe");
        assert_eq!(next, ListQuery::new(1, 20, "shoe").unwrap());
    }

    #[test]
    fn with_page_keeps_search() {
        let query = ListQuery::new(1, 10, "shoe").unwrap();
        let next = query.with_page(3, 50);
        assert_eq!(next.search, "shoe");
        assert_eq!((next.page, next.limit), (3, 50));
        assert_eq!(query.with_page(0, 0).page, 1);
    }

    #[test]
    fn params_apply_defaults() {
        let query = ListParams::default().resolve().unwrap();
        assert_eq!(query, ListQuery::default());
        assert_eq!(query.search, "");
    }

    #[test]
    fn params_reject_non_numeric_page() {
        let params = ListParams {
            page: Some("two".to_string()),
            ..Default::default()
        };
        assert!(matches!(params.resolve(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn params_reject_zero_limit() {
        let params = ListParams {
            limit: Some("0".to_string()),
            ..Default::default()
        };
        assert!(matches!(params.resolve(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn list_result_accepts_data_key() {
        let raw = r#"{"data":[],"total":0,"page":1,"limit":10}"#;
        let result: ListResult = serde_json::from_str(raw).unwrap();
        assert!(result.items.is_empty());
        assert_eq!(result.total_pages(), 0);
    }

    #[test]
    fn total_pages_rounds_up() {
        let result = ListResult {
            items: Vec::new(),
            total: 21,
            page: 1,
            limit: 10,
        };
        assert_eq!(result.total_pages(), 3);
    }

    #[test]
    fn fields_validation() {
        assert!(ProductFields::new("Mug", 10.0).validate().is_ok());
        assert!(ProductFields::new("   ", 10.0).validate().is_err());
        assert!(ProductFields::new("Mug", -1.0).validate().is_err());
        assert!(ProductFields::new("Mug", f64::NAN).validate().is_err());
    }

    #[test]
    fn absent_optional_fields_are_not_serialized() {
        let body = serde_json::to_value(ProductFields::new("Mug", 10.0)).unwrap();
        assert_eq!(body, serde_json::json!({"product_title": "Mug", "product_price": 10.0}));
    }
}
