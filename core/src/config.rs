//! Client configuration supplied by the hosting environment.

use std::env;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const BASE_URL_VAR: &str = "SAMPLES_API_BASE";
pub const LOCATION_VAR: &str = "SAMPLES_PAGE_LOCATION";

/// Where requests go. Read once, when a `SampleClient` is built.
///
/// `location` stands in for the current page URL and is only needed when
/// `base_url` is a same-origin prefix such as `/api`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub location: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            location: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Reads `SAMPLES_API_BASE` and `SAMPLES_PAGE_LOCATION`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            base_url: lookup(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            location: lookup(LOCATION_VAR).filter(|value| !value.is_empty()),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
