//! Query normalizer and proxy in front of the external product service.
//!
//! # Overview
//! Accepts the UI-facing list/detail/mutation contract, reshapes each
//! request with `catalog_core::UpstreamClient`, performs a single outbound
//! attempt with `reqwest`, and returns the upstream body untouched. Every
//! failure leaves as a `{ error, details }` envelope.
//!
//! Routes are served both at the root and under `/api`.

use axum::{routing::get, Router};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::ProxyConfig;
pub use error::{Operation, ProxyError};
pub use state::AppState;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(routes::product_routes())
        .nest("/api", routes::product_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the proxy on an already-bound listener.
///
/// # Errors
///
/// Returns `ServeError` if the HTTP client cannot be built or the server
/// fails.
pub async fn run(listener: TcpListener, config: &ProxyConfig) -> Result<(), ServeError> {
    let state = AppState::new(config)?;
    tracing::info!(
        upstream = state.upstream().base_url(),
        addr = ?listener.local_addr().ok(),
        "catalog proxy listening"
    );
    axum::serve(listener, app(state)).await?;
    Ok(())
}
