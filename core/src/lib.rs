//! Catalog list/edit core: request shaping, error normalization and list
//! synchronization for the product management surface.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). Two clients share the same
//! plain-data transport types:
//! - `CatalogClient` speaks the UI-facing `page`/`limit`/`search` contract.
//! - `UpstreamClient` speaks the external product service's
//!   `limit`/`offset` contract and is what the proxy runs on.
//!
//! `ListController` owns the visible list state. It consumes `Event`s and
//! emits `Command`s, so debouncing and stale-response suppression can be
//! tested with a virtual clock and no network.

pub mod client;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod http;
pub mod types;
pub mod upstream;

pub use client::CatalogClient;
pub use controller::{
    Command, ControllerConfig, Editor, EditorMode, Event, FetchTicket, ListController,
    MutationTicket, Notice, NoticeLevel, Status,
};
pub use debounce::{Debouncer, SEARCH_DEBOUNCE};
pub use error::{ApiError, ErrorEnvelope, UNKNOWN_ERROR};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{ListParams, ListQuery, ListResult, Product, ProductFields};
pub use upstream::UpstreamClient;
