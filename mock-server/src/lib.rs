//! Stub of the geo samples service.
//!
//! `app()` serves the real wire contract (`/health`, `/samples`,
//! `/samples/filter`) from an in-memory store; `stub::canned` answers every
//! request with one fixed reply for exercising client failure paths.

pub mod geo;
pub mod samples;
pub mod stub;

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::Instrument;
use uuid::Uuid;

pub use samples::{NewSample, Sample, Store};

pub const REQUEST_ID: &str = "x-request-id";

pub fn app() -> Router {
    app_with_store(Store::default())
}

/// The samples service over an existing store.
pub fn app_with_store(store: Store) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/samples", get(samples::list_samples).post(samples::ingest_samples))
        .route("/samples/filter", post(samples::filter_samples))
        .with_state(store)
        .layer(middleware::from_fn(request_id))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, app()).await
}

/// Serves any router (including a `stub::canned` one) on `listener`.
pub async fn serve(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Echoes `X-Request-ID` (or a fresh UUID v4) on the response and records
/// it on the span every handler log line runs in.
async fn request_id(request: Request, next: Next) -> Response {
    let id = request
        .headers()
        .get(REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let span = tracing::info_span!(
        "request",
        request_id = %id,
        method = %request.method(),
        path = %request.uri().path(),
    );
    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID, value);
    }
    response
}
