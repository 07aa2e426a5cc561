//! API client core for the geo samples service.
//!
//! # Overview
//! Builds `HttpRequest` values, validates `HttpResponse` values and exposes
//! the three samples operations (`get_samples`, `ingest_samples`,
//! `filter_samples`). The round-trip itself goes through a `Transport`, so
//! hosts can either hand the client a transport or run the I/O themselves
//! between `build_*` and `parse_json`.
//!
//! # Design
//! - `SampleClient` holds only the resolved `ApiBase` and its transport.
//! - URL resolution strategy (absolute origin vs. page-relative prefix) is
//!   decided once, when the base is constructed.
//! - Successful responses surface only the parsed JSON body; failures
//!   surface a single `ApiError` whose `Display` is the message.

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod http;
#[cfg(feature = "ureq")]
pub mod transport;
pub mod types;

pub use client::SampleClient;
pub use config::ClientConfig;
pub use endpoint::{ApiBase, QueryValue};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{IngestSummary, NewSample, PolygonGeometry, Sample, SampleFilter, SampleQuery};
