//! Request URL assembly: base joining, resolution and query parameters.
//!
//! # Design
//! `ApiBase` fixes the resolution strategy once, when it is built: a base
//! starting with `http` is parsed as an absolute URL, anything else is a
//! same-origin prefix resolved against an injected current-location URL.
//! Query values mirror the loose `string | number | absent` inputs callers
//! pass; absent and empty values never reach the query string.

use std::fmt;

use url::Url;

use crate::error::ApiError;

/// A single query-parameter value before string coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Text(String),
    Int(i64),
    Float(f64),
    Absent,
}

impl QueryValue {
    /// Absent values and empty strings are dropped rather than serialized.
    pub fn is_omitted(&self) -> bool {
        match self {
            QueryValue::Absent => true,
            QueryValue::Text(text) => text.is_empty(),
            QueryValue::Int(_) | QueryValue::Float(_) => false,
        }
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Text(text) => f.write_str(text),
            QueryValue::Int(n) => write!(f, "{n}"),
            QueryValue::Float(n) if n.is_nan() => f.write_str("NaN"),
            QueryValue::Float(n) if n.is_infinite() => {
                f.write_str(if *n > 0.0 { "Infinity" } else { "-Infinity" })
            }
            // -0 renders as "0"
            QueryValue::Float(n) if *n == 0.0 => f.write_str("0"),
            QueryValue::Float(n) => write!(f, "{n}"),
            QueryValue::Absent => Ok(()),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Text(value)
    }
}

impl From<&String> for QueryValue {
    fn from(value: &String) -> Self {
        QueryValue::Text(value.clone())
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        QueryValue::Int(value.into())
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        QueryValue::Int(value.into())
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Int(value)
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        QueryValue::Float(value)
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(QueryValue::Absent, Into::into)
    }
}

#[derive(Debug, Clone)]
enum Resolution {
    Absolute,
    RelativeTo(Url),
}

/// The configured root every request path is joined against.
#[derive(Debug, Clone)]
pub struct ApiBase {
    prefix: String,
    resolution: Resolution,
}

impl ApiBase {
    /// Builds a base from the configured address.
    ///
    /// `location` is only consulted when `base` does not start with `http`;
    /// such a base cannot be resolved without it.
    pub fn new(base: &str, location: Option<&str>) -> Result<Self, ApiError> {
        let resolution = if base.starts_with("http") {
            Resolution::Absolute
        } else {
            let location = location.ok_or_else(|| {
                ApiError::InvalidUrl(format!(
                    "relative base address {base:?} requires a current location"
                ))
            })?;
            Resolution::RelativeTo(Url::parse(location)?)
        };
        Ok(Self {
            prefix: base.to_string(),
            resolution,
        })
    }

    /// The base address as configured.
    pub fn as_str(&self) -> &str {
        &self.prefix
    }

    pub fn is_absolute(&self) -> bool {
        matches!(self.resolution, Resolution::Absolute)
    }

    /// Builds the absolute request URL for `path` with `params` set on its
    /// query string, in order. A key set twice keeps the later value.
    pub fn api_url(&self, path: &str, params: &[(&str, QueryValue)]) -> Result<String, ApiError> {
        let joined = join(&self.prefix, path);
        let mut url = match &self.resolution {
            Resolution::Absolute => Url::parse(&joined)?,
            Resolution::RelativeTo(location) => location.join(&joined)?,
        };
        set_query_params(&mut url, params);
        Ok(url.into())
    }
}

/// Joins `base` and `path` with exactly one `/`.
pub fn join(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if base.is_empty() {
        format!("/{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// Sets each non-omitted parameter, replacing the first existing pair with
/// the same name and dropping any later duplicates.
fn set_query_params(url: &mut Url, params: &[(&str, QueryValue)]) {
    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let mut touched = false;

    for (name, value) in params {
        if value.is_omitted() {
            continue;
        }
        touched = true;
        let rendered = value.to_string();
        match pairs.iter().position(|(key, _)| key == *name) {
            Some(first) => {
                pairs[first].1 = rendered;
                let mut seen = false;
                pairs.retain(|(key, _)| {
                    if key != *name {
                        return true;
                    }
                    let keep = !seen;
                    seen = true;
                    keep
                });
            }
            None => pairs.push((name.to_string(), rendered)),
        }
    }

    if touched {
        url.query_pairs_mut().clear().extend_pairs(pairs.iter());
    }
}
