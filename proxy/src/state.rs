//! Shared handler state: the outbound HTTP client plus the upstream request
//! builder.

use catalog_core::{ApiError, HttpMethod, HttpRequest, HttpResponse, UpstreamClient};
use serde_json::Value;

use crate::config::ProxyConfig;
use crate::error::{OperationExt, Operation, ProxyError};

/// Cheap to clone; `reqwest::Client` is reference-counted internally.
#[derive(Clone)]
pub struct AppState {
    http: reqwest::Client,
    upstream: UpstreamClient,
}

impl AppState {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &ProxyConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.upstream_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            upstream: UpstreamClient::new(&config.external_api_url),
        })
    }

    pub fn upstream(&self) -> &UpstreamClient {
        &self.upstream
    }

    /// One attempt against the external service; the body comes back as-is.
    pub async fn forward(&self, operation: Operation, request: HttpRequest) -> Result<Value, ProxyError> {
        tracing::debug!(
            method = request.method.as_str(),
            url = %request.url(),
            "forwarding to product service"
        );
        let response = self.execute(request).await.during(operation)?;
        self.upstream.parse_passthrough(response).during(operation)
    }

    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.http.request(method, request.url());
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
