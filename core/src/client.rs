//! Request builder, response validator and samples operations.
//!
//! # Design
//! `SampleClient` holds only its `ApiBase` and a `Transport` and carries no
//! mutable state between calls. Each operation is split into a `build_*`
//! method that produces an `HttpRequest` and the shared `parse_json`, which
//! validates an `HttpResponse` for that request. `http_json` runs the two
//! around one transport round-trip; hosts doing their own I/O call them
//! directly.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::endpoint::{ApiBase, QueryValue};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::types::{SampleFilter, SampleQuery};

const SAMPLES_PATH: &str = "samples";
const FILTER_PATH: &str = "samples/filter";

/// Status-failure bodies are cut to this many characters, then marked.
const STATUS_BODY_LIMIT: usize = 400;
/// Content-type mismatch bodies are cut to this many characters, unmarked.
const MISMATCH_BODY_LIMIT: usize = 200;
const ELLIPSIS: char = '…';

/// Client for the samples API.
///
/// Every call builds its own URL and request; concurrent calls through a
/// shared client are independent of each other.
#[derive(Debug, Clone)]
pub struct SampleClient<T> {
    base: ApiBase,
    transport: T,
}

impl<T> SampleClient<T> {
    pub fn new(config: &ClientConfig, transport: T) -> Result<Self, ApiError> {
        let base = ApiBase::new(&config.base_url, config.location.as_deref())?;
        Ok(Self { base, transport })
    }

    pub fn base(&self) -> &ApiBase {
        &self.base
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Absolute URL for `path` under the configured base.
    pub fn api_url(&self, path: &str, params: &[(&str, QueryValue)]) -> Result<String, ApiError> {
        self.base.api_url(path, params)
    }

    pub fn build_get_samples(&self, query: &SampleQuery) -> Result<HttpRequest, ApiError> {
        let url = self.api_url(
            SAMPLES_PATH,
            &[
                ("limit", query.limit.into()),
                ("offset", query.offset.into()),
                ("from_time", query.from_time.as_ref().into()),
                ("to_time", query.to_time.as_ref().into()),
            ],
        )?;
        Ok(HttpRequest::get(url))
    }

    /// `payload` is sent verbatim: a single sample, a list, or any other
    /// serializable value.
    pub fn build_ingest_samples<P>(&self, payload: &P) -> Result<HttpRequest, ApiError>
    where
        P: Serialize + ?Sized,
    {
        let body = serde_json::to_string(payload).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest::post_json(self.api_url(SAMPLES_PATH, &[])?, body))
    }

    pub fn build_filter_samples(&self, filter: &SampleFilter) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(filter).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest::post_json(self.api_url(FILTER_PATH, &[])?, body))
    }

    /// Validates `response` as the answer to `request` and parses its body.
    ///
    /// Non-2xx statuses and non-JSON content types become `ApiError::Status`
    /// and `ApiError::NotJson`; a JSON body that fails to parse surfaces the
    /// parser's error unchanged.
    pub fn parse_json<R: DeserializeOwned>(
        &self,
        request: &HttpRequest,
        response: &HttpResponse,
    ) -> Result<R, ApiError> {
        if !response.is_success() {
            return Err(ApiError::Status {
                method: request.effective_method().to_string(),
                url: request.url.clone(),
                status: response.status,
                body: truncate_marked(response.text_or_empty(), STATUS_BODY_LIMIT),
            });
        }

        let content_type = response.header("content-type").unwrap_or_default();
        if !content_type.contains("application/json") {
            return Err(ApiError::NotJson {
                url: request.url.clone(),
                content_type,
                body: truncate(response.text_or_empty(), MISMATCH_BODY_LIMIT).to_string(),
            });
        }

        let body = response
            .body
            .as_deref()
            .ok_or_else(|| ApiError::Transport(format!("could not read response body from {}", request.url)))?;
        Ok(serde_json::from_str(body)?)
    }
}

impl<T: Transport> SampleClient<T> {
    /// Sends `request` and returns its validated JSON body.
    pub fn http_json<R: DeserializeOwned>(&self, request: &HttpRequest) -> Result<R, ApiError> {
        let response = self.transport.execute(request)?;
        self.parse_json(request, &response)
    }

    /// `GET samples?limit&offset&from_time&to_time`.
    pub fn get_samples(&self, query: &SampleQuery) -> Result<Value, ApiError> {
        self.http_json(&self.build_get_samples(query)?)
    }

    /// `POST samples` with `payload` as the JSON body.
    pub fn ingest_samples<P>(&self, payload: &P) -> Result<Value, ApiError>
    where
        P: Serialize + ?Sized,
    {
        self.http_json(&self.build_ingest_samples(payload)?)
    }

    /// `POST samples/filter`.
    pub fn filter_samples(&self, filter: &SampleFilter) -> Result<Value, ApiError> {
        self.http_json(&self.build_filter_samples(filter)?)
    }
}

#[cfg(feature = "ureq")]
impl SampleClient<crate::transport::UreqTransport> {
    /// A client that performs its requests with ureq.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::new(config, crate::transport::UreqTransport::new())
    }
}

/// The first `limit` characters of `text`.
fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Like `truncate`, with an ellipsis appended when anything was cut.
fn truncate_marked(text: &str, limit: usize) -> String {
    let head = truncate(text, limit);
    if head.len() < text.len() {
        format!("{head}{ELLIPSIS}")
    } else {
        head.to_string()
    }
}
