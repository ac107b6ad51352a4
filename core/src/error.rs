//! Error taxonomy shared by the UI-facing client and the upstream client.
//!
//! # Design
//! `Validation` is raised locally before any request exists. `Upstream`
//! carries the remote status and body untouched so the proxy can mirror
//! them. `Transport` covers unreachable hosts and bodies that do not parse;
//! its details are never exposed beyond an opaque marker.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::http::HttpResponse;

/// Details marker used whenever the upstream body is unavailable.
pub const UNKNOWN_ERROR: &str = "unknown error";

/// Errors produced while building requests or interpreting responses.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// A required identifier or field was missing or malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The remote service answered with a non-success status.
    #[error("upstream returned HTTP {status}")]
    Upstream { status: u16, details: Value },

    /// The remote service was unreachable or its response could not be read.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    /// Status code used when this error is rendered as an envelope.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Validation(_) => 400,
            ApiError::Upstream { status, .. } => *status,
            ApiError::Transport(_) | ApiError::Serialization(_) => 500,
        }
    }

    /// Envelope `details` for this error.
    pub fn details(&self) -> Value {
        match self {
            ApiError::Validation(message) => Value::String(message.clone()),
            ApiError::Upstream { details, .. } => details.clone(),
            ApiError::Transport(_) | ApiError::Serialization(_) => {
                Value::String(UNKNOWN_ERROR.to_string())
            }
        }
    }

    /// Wrap the error in the envelope shape under the given category.
    pub fn to_envelope(&self, category: &str) -> ErrorEnvelope {
        ErrorEnvelope {
            error: category.to_string(),
            details: self.details(),
        }
    }

    /// Build an `Upstream` error from a non-success response.
    ///
    /// JSON bodies are kept as structured values, anything else as text, and
    /// an empty body becomes the `unknown error` marker.
    pub fn from_response(response: &HttpResponse) -> Self {
        let details = if response.body.trim().is_empty() {
            Value::String(UNKNOWN_ERROR.to_string())
        } else {
            serde_json::from_str(&response.body)
                .unwrap_or_else(|_| Value::String(response.body.clone()))
        };
        ApiError::Upstream {
            status: response.status,
            details,
        }
    }
}

/// The uniform `{ error, details }` body returned for any failed operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorEnvelope {
    pub error: String,
    pub details: Value,
}
