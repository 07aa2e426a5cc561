use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::geo::Polygon;

pub const MAX_LIMIT: i64 = 5000;
const DEFAULT_LIST_LIMIT: i64 = 200;
const DEFAULT_FILTER_LIMIT: i64 = 1000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub signal_strength: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewSample {
    pub latitude: f64,
    pub longitude: f64,
    pub signal_strength: f64,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// `POST /samples` accepts one sample or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum IngestPayload {
    One(NewSample),
    Many(Vec<NewSample>),
}

impl IngestPayload {
    fn into_vec(self) -> Vec<NewSample> {
        match self {
            IngestPayload::One(sample) => vec![sample],
            IngestPayload::Many(samples) => samples,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    pub polygon: Option<Value>,
    pub from_time: Option<String>,
    pub to_time: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub type Store = Arc<RwLock<Vec<Sample>>>;

/// A rejected request, rendered as `{"detail": ...}`.
#[derive(Debug)]
pub struct Problem {
    pub status: StatusCode,
    pub detail: String,
}

impl Problem {
    fn invalid(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: detail.into(),
        }
    }
}

/// Unparseable bodies are validation failures too, with the same shape.
impl From<JsonRejection> for Problem {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid(rejection.body_text())
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        tracing::warn!(status = self.status.as_u16(), detail = %self.detail, "request rejected");
        (self.status, Json(json!({"detail": self.detail}))).into_response()
    }
}

/// Paging and time window shared by list and filter.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Window {
    limit: usize,
    offset: usize,
    from_time: Option<DateTime<Utc>>,
    to_time: Option<DateTime<Utc>>,
}

impl Window {
    fn new(
        limit: i64,
        offset: i64,
        from_time: Option<&str>,
        to_time: Option<&str>,
    ) -> Result<Self, Problem> {
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(Problem::invalid(format!("limit must be between 1 and {MAX_LIMIT}")));
        }
        if offset < 0 {
            return Err(Problem::invalid("offset must be >= 0"));
        }
        Ok(Self {
            limit: limit as usize,
            offset: offset as usize,
            from_time: from_time.map(parse_bound).transpose()?,
            to_time: to_time.map(parse_bound).transpose()?,
        })
    }

    fn admits(&self, sample: &Sample) -> bool {
        self.from_time.map_or(true, |from| sample.timestamp >= from)
            && self.to_time.map_or(true, |to| sample.timestamp <= to)
    }

    /// Newest first, then paged.
    fn select<'a>(&self, samples: impl Iterator<Item = &'a Sample>) -> Vec<Sample> {
        let mut matched: Vec<Sample> = samples.filter(|s| self.admits(s)).cloned().collect();
        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matched.into_iter().skip(self.offset).take(self.limit).collect()
    }
}

pub async fn list_samples(
    State(store): State<Store>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Sample>>, Problem> {
    let limit = int_param(&params, "limit", DEFAULT_LIST_LIMIT)?;
    let offset = int_param(&params, "offset", 0)?;
    let window = Window::new(
        limit,
        offset,
        params.get("from_time").map(String::as_str),
        params.get("to_time").map(String::as_str),
    )?;
    tracing::info!(limit, offset, from_time = ?window.from_time, to_time = ?window.to_time, "list samples");

    let samples = store.read().await;
    let rows = window.select(samples.iter());
    tracing::info!(result = rows.len(), "list samples done");
    Ok(Json(rows))
}

pub async fn ingest_samples(
    State(store): State<Store>,
    payload: Result<Json<IngestPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), Problem> {
    let Json(payload) = payload?;
    let items = payload.into_vec();
    tracing::info!(count = items.len(), "ingest samples");
    for item in &items {
        if !(-90.0..=90.0).contains(&item.latitude) {
            return Err(Problem::invalid("latitude must be between -90 and 90"));
        }
        if !(-180.0..=180.0).contains(&item.longitude) {
            return Err(Problem::invalid("longitude must be between -180 and 180"));
        }
    }

    let inserted = items.len();
    let mut samples = store.write().await;
    samples.extend(items.into_iter().map(|item| Sample {
        id: Uuid::new_v4(),
        latitude: item.latitude,
        longitude: item.longitude,
        signal_strength: item.signal_strength,
        timestamp: item.timestamp,
    }));
    tracing::info!(inserted, "ingest samples done");
    Ok((StatusCode::CREATED, Json(json!({"inserted": inserted}))))
}

pub async fn filter_samples(
    State(store): State<Store>,
    input: Result<Json<FilterRequest>, JsonRejection>,
) -> Result<Json<Vec<Sample>>, Problem> {
    let Json(input) = input?;
    let window = Window::new(
        input.limit.unwrap_or(DEFAULT_FILTER_LIMIT),
        input.offset.unwrap_or(0),
        input.from_time.as_deref(),
        input.to_time.as_deref(),
    )?;
    if let (Some(from), Some(to)) = (window.from_time, window.to_time) {
        if to < from {
            return Err(Problem::invalid("to_time must be >= from_time"));
        }
    }
    let polygon = match input.polygon {
        None | Some(Value::Null) => None,
        Some(raw) => {
            let polygon: Polygon =
                serde_json::from_value(raw).map_err(|e| Problem::invalid(format!("invalid polygon: {e}")))?;
            polygon.validate().map_err(Problem::invalid)?;
            Some(polygon)
        }
    };
    tracing::info!(
        limit = window.limit,
        offset = window.offset,
        polygon = polygon.is_some(),
        "filter samples"
    );

    let samples = store.read().await;
    let rows = window.select(samples.iter().filter(|s| {
        polygon
            .as_ref()
            .map_or(true, |p| p.contains(s.longitude, s.latitude))
    }));
    tracing::info!(result = rows.len(), "filter samples done");
    Ok(Json(rows))
}

fn int_param(params: &HashMap<String, String>, name: &str, default: i64) -> Result<i64, Problem> {
    match params.get(name) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| Problem::invalid(format!("{name} must be an integer, got {raw:?}"))),
    }
}

fn parse_bound(raw: &str) -> Result<DateTime<Utc>, Problem> {
    parse_timestamp(raw).ok_or_else(|| Problem::invalid(format!("invalid datetime {raw:?}")))
}

/// RFC 3339, or a naive ISO 8601 date-time taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid datetime {raw:?}")))
}
