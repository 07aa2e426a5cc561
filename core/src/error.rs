//! Error types for the samples API client.
//!
//! # Design
//! Each variant's `Display` is the complete human-readable message handed to
//! callers. The two validation failures (`Status`, `NotJson`) carry their
//! parts as fields so callers can still match on them, but nothing beyond
//! what the message embeds is modeled.

use std::fmt;

/// Errors returned by `SampleClient`.
#[derive(Debug)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    ///
    /// `body` is already truncated to 400 characters (plus `…`).
    Status {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    /// The server answered 2xx but the payload is not declared as JSON.
    ///
    /// `content_type` is empty when the header was absent; `body` holds at
    /// most 200 characters.
    NotJson {
        url: String,
        content_type: String,
        body: String,
    },

    /// A correctly typed response body failed to parse. Displayed as the
    /// parser's own message.
    Json(serde_json::Error),

    /// The request payload could not be serialized to JSON.
    Serialization(String),

    /// The base address, current location or joined path is not a valid URL.
    InvalidUrl(String),

    /// The network layer failed before a response could be validated.
    Transport(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Status {
                method,
                url,
                status,
                body,
            } => write!(f, "{method} {url} failed: {status} {body}"),
            ApiError::NotJson {
                url,
                content_type,
                body,
            } => {
                let content_type = if content_type.is_empty() {
                    "unknown"
                } else {
                    content_type
                };
                write!(f, "Expected JSON from {url} but got: {content_type} {body}")
            }
            ApiError::Json(err) => write!(f, "{err}"),
            ApiError::Serialization(msg) => write!(f, "serialization failed: {msg}"),
            ApiError::InvalidUrl(msg) => write!(f, "invalid URL: {msg}"),
            ApiError::Transport(msg) => write!(f, "transport failed: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Json(err)
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        ApiError::InvalidUrl(err.to_string())
    }
}
