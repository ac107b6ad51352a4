//! Error envelope rendering for proxy handlers.
//!
//! Every handler returns `Result<_, ProxyError>`. The error knows which
//! operation failed, which fixes the envelope's `error` category, and the
//! underlying `ApiError` fixes the status and `details`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use catalog_core::ApiError;
use thiserror::Error;

/// The inbound operations the proxy exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListProducts,
    GetProduct,
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
}

impl Operation {
    /// Human-readable category placed in the envelope's `error` field.
    pub fn category(self) -> &'static str {
        match self {
            Operation::ListProducts => "Failed to fetch products",
            Operation::GetProduct => "Failed to fetch product",
            Operation::CreateProduct => "Failed to create product",
            Operation::UpdateProduct => "Failed to update product",
            Operation::DeleteProduct => "Failed to delete product",
        }
    }

    fn log_tag(self) -> &'static str {
        match self {
            Operation::ListProducts => "API_PRODUCTS_GET_ERROR",
            Operation::GetProduct => "API_PRODUCT_GET_ERROR",
            Operation::CreateProduct => "API_PRODUCT_POST_ERROR",
            Operation::UpdateProduct => "API_PRODUCT_PUT_ERROR",
            Operation::DeleteProduct => "API_PRODUCT_DELETE_ERROR",
        }
    }
}

#[derive(Debug, Error)]
#[error("{}: {source}", .operation.category())]
pub struct ProxyError {
    pub operation: Operation,
    pub source: ApiError,
}

impl ProxyError {
    pub fn new(operation: Operation, source: ApiError) -> Self {
        Self { operation, source }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let envelope = self.source.to_envelope(self.operation.category());
        match &self.source {
            ApiError::Validation(_) => tracing::warn!(
                tag = self.operation.log_tag(),
                details = %envelope.details,
                "rejected request"
            ),
            _ => tracing::error!(
                tag = self.operation.log_tag(),
                error = %self.source,
                details = %envelope.details,
                "upstream call failed"
            ),
        }

        let status = StatusCode::from_u16(self.source.status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(envelope)).into_response()
    }
}

/// Shorthand for tagging core errors with the failing operation.
pub trait OperationExt<T> {
    fn during(self, operation: Operation) -> Result<T, ProxyError>;
}

impl<T> OperationExt<T> for Result<T, ApiError> {
    fn during(self, operation: Operation) -> Result<T, ProxyError> {
        self.map_err(|source| ProxyError::new(operation, source))
    }
}
