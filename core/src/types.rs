//! Domain DTOs for the samples API.
//!
//! # Design
//! These types mirror the stub server's schema but are defined
//! independently; integration tests catch drift between the two crates.
//! Timestamps stay as strings: the client forwards whatever the caller
//! supplies and leaves their interpretation to the server.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored measurement as returned by list and filter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sample {
    pub id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub signal_strength: f64,
    pub timestamp: String,
}

/// A measurement to ingest. `ingest_samples` accepts one of these or a
/// slice of them (or any other serializable payload).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewSample {
    pub latitude: f64,
    pub longitude: f64,
    pub signal_strength: f64,
    pub timestamp: String,
}

/// Response body of a successful ingest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestSummary {
    pub inserted: u64,
}

/// GeoJSON `Polygon` geometry; positions are `[lon, lat]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolygonGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

impl PolygonGeometry {
    /// A single-ring polygon. The ring is closed if its last position does
    /// not already repeat the first.
    pub fn from_ring(mut ring: Vec<[f64; 2]>) -> Self {
        if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) {
            if first != last {
                ring.push(first);
            }
        }
        Self {
            kind: "Polygon".to_string(),
            coordinates: vec![ring],
        }
    }
}

/// Query for `get_samples`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleQuery {
    pub limit: u32,
    pub offset: u32,
    pub from_time: Option<String>,
    pub to_time: Option<String>,
}

impl Default for SampleQuery {
    fn default() -> Self {
        Self {
            limit: 200,
            offset: 0,
            from_time: None,
            to_time: None,
        }
    }
}

/// Body of `filter_samples`. Field order is the wire order; unset time
/// bounds are sent as `null`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SampleFilter {
    pub polygon: serde_json::Value,
    pub from_time: Option<String>,
    pub to_time: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

impl SampleFilter {
    /// A filter on `polygon` (sent verbatim) with default paging and no
    /// time bounds.
    pub fn new(polygon: serde_json::Value) -> Self {
        Self {
            polygon,
            from_time: None,
            to_time: None,
            limit: 5000,
            offset: 0,
        }
    }

    /// A filter on a typed GeoJSON polygon.
    pub fn within(polygon: &PolygonGeometry) -> Self {
        Self::new(serde_json::json!(polygon))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_query_defaults() {
        let query = SampleQuery::default();
        assert_eq!(query.limit, 200);
        assert_eq!(query.offset, 0);
        assert!(query.from_time.is_none());
        assert!(query.to_time.is_none());
    }

    #[test]
    fn filter_body_has_wire_order_and_nulls() {
        let filter = SampleFilter::new(serde_json::json!([[0, 0], [1, 1]]));
        assert_eq!(
            serde_json::to_string(&filter).unwrap(),
            r#"{"polygon":[[0,0],[1,1]],"from_time":null,"to_time":null,"limit":5000,"offset":0}"#
        );
    }

    #[test]
    fn polygon_ring_is_closed() {
        let polygon = PolygonGeometry::from_ring(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]);
        assert_eq!(polygon.coordinates[0].len(), 4);
        assert_eq!(polygon.coordinates[0][3], [0.0, 0.0]);

        let closed = PolygonGeometry::from_ring(polygon.coordinates[0].clone());
        assert_eq!(closed.coordinates[0].len(), 4);
    }

    #[test]
    fn polygon_serializes_as_geojson() {
        let filter = SampleFilter::within(&PolygonGeometry::from_ring(vec![
            [35.21, 31.77],
            [35.23, 31.77],
            [35.23, 31.79],
        ]));
        assert_eq!(filter.polygon["type"], "Polygon");
        assert_eq!(filter.polygon["coordinates"][0][0][0], 35.21);
    }

    #[test]
    fn sample_parses_server_shape() {
        let sample: Sample = serde_json::from_str(
            r#"{"id":"00000000-0000-0000-0000-000000000001","latitude":31.78,"longitude":35.22,"signal_strength":-70.5,"timestamp":"2026-02-04T12:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(sample.signal_strength, -70.5);
        assert_eq!(sample.timestamp, "2026-02-04T12:00:00Z");
    }
}
