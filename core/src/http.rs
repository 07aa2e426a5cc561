//! HTTP transport types.
//!
//! # Design
//! Requests and responses are plain data. `SampleClient` builds
//! `HttpRequest` values and validates `HttpResponse` values; executing the
//! round-trip is the job of a `Transport`, which a host may implement over
//! any HTTP stack (the crate ships a ureq-backed one).
//!
//! All fields use owned types so values can be handed across threads or
//! stored by a host between build and parse.

use std::fmt;

use crate::error::ApiError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `method` is optional; an unset method is sent, and reported in error
/// messages, as `GET`. Headers and body are passed through verbatim, so
/// callers sending JSON serialize it and set `Content-Type` themselves.
#[derive(Debug, Clone, Default)]
pub struct HttpRequest {
    pub method: Option<HttpMethod>,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// A bodiless request with no explicit method.
    pub fn get(url: String) -> Self {
        Self {
            url,
            ..Self::default()
        }
    }

    /// A `POST` carrying an already serialized JSON body.
    pub fn post_json(url: String, body: String) -> Self {
        Self {
            method: Some(HttpMethod::Post),
            url,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(body),
        }
    }

    /// The method that goes on the wire.
    pub fn effective_method(&self) -> HttpMethod {
        self.method.unwrap_or_default()
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    /// `None` when the transport could not read the body.
    pub body: Option<String>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Every value of header `name` (case-insensitive), joined with `", "`.
    pub fn header(&self, name: &str) -> Option<String> {
        let values: Vec<&str> = self
            .headers
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
            .collect();
        (!values.is_empty()).then(|| values.join(", "))
    }

    /// The body text, or an empty string when it could not be read.
    pub fn text_or_empty(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }
}

/// Executes one `HttpRequest` against the network.
///
/// Implementations must return non-2xx responses as `Ok` data; only a
/// failure to obtain any response at all is an `Err`.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}
