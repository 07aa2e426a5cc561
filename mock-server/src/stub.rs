//! A server that gives every request the same answer.
//!
//! Used to drive the client through failure paths the real routes never
//! take (5xx pages, HTML from a misrouted proxy) and to inspect exactly what
//! went over the wire.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
pub struct CannedReply {
    pub status: u16,
    /// Sent as `Content-Type`; `None` omits the header entirely.
    pub content_type: Option<String>,
    pub body: String,
}

impl CannedReply {
    pub fn new(status: u16, content_type: Option<&str>, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: content_type.map(str::to_string),
            body: body.into(),
        }
    }

    pub fn json(body: impl Into<String>) -> Self {
        Self::new(200, Some("application/json"), body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    /// Path and query as received.
    pub uri: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

pub type RequestLog = Arc<RwLock<Vec<RecordedRequest>>>;

#[derive(Clone)]
struct Stub {
    reply: Arc<CannedReply>,
    log: RequestLog,
}

/// A router answering any method and path with `reply`, plus the log it
/// appends every received request to.
pub fn canned(reply: CannedReply) -> (Router, RequestLog) {
    let log = RequestLog::default();
    let stub = Stub {
        reply: Arc::new(reply),
        log: log.clone(),
    };
    (Router::new().fallback(answer).with_state(stub), log)
}

async fn answer(
    State(stub): State<Stub>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let recorded = RecordedRequest {
        method: method.to_string(),
        uri: uri.to_string(),
        headers: headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect(),
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    tracing::info!(method = %recorded.method, uri = %recorded.uri, "stub request");
    stub.log.write().await.push(recorded);

    let reply = &stub.reply;
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = (status, Body::from(reply.body.clone())).into_response();
    response.headers_mut().remove(header::CONTENT_TYPE);
    if let Some(content_type) = &reply.content_type {
        if let Ok(value) = HeaderValue::from_str(content_type) {
            response.headers_mut().insert(header::CONTENT_TYPE, value);
        }
    }
    response
}
