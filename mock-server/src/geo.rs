//! GeoJSON polygon validation and containment.

use serde::Deserialize;

/// A GeoJSON `Polygon`. Only the outer ring takes part in containment.
#[derive(Debug, Clone, Deserialize)]
pub struct Polygon {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<Vec<Vec<f64>>>,
}

impl Polygon {
    /// Checks the outer ring: at least four `[lon, lat]` positions, in
    /// range, first equal to last.
    pub fn validate(&self) -> Result<(), String> {
        if self.kind != "Polygon" {
            return Err(format!("polygon type must be \"Polygon\", got {:?}", self.kind));
        }
        let Some(ring) = self.coordinates.first() else {
            return Err("coordinates must be a non-empty list".to_string());
        };
        if ring.len() < 4 {
            return Err("polygon ring must have at least 4 points (including closing point)".to_string());
        }
        for point in ring {
            let [lon, lat] = point.as_slice() else {
                return Err("each polygon point must be [lon, lat]".to_string());
            };
            if !(-180.0..=180.0).contains(lon) {
                return Err("polygon lon out of range (-180..180)".to_string());
            }
            if !(-90.0..=90.0).contains(lat) {
                return Err("polygon lat out of range (-90..90)".to_string());
            }
        }
        if ring.first() != ring.last() {
            return Err("polygon ring must be closed (first point must equal last point)".to_string());
        }
        Ok(())
    }

    /// Even-odd ray cast against the outer ring. Call `validate` first.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        let Some(ring) = self.coordinates.first() else {
            return false;
        };
        let mut inside = false;
        for edge in ring.windows(2) {
            let (x1, y1) = (edge[0][0], edge[0][1]);
            let (x2, y2) = (edge[1][0], edge[1][1]);
            if (y1 > lat) != (y2 > lat) {
                let crossing = x1 + (lat - y1) * (x2 - x1) / (y2 - y1);
                if lon < crossing {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polygon(ring: &[[f64; 2]]) -> Polygon {
        Polygon {
            kind: "Polygon".to_string(),
            coordinates: vec![ring.iter().map(|p| p.to_vec()).collect()],
        }
    }

    fn square() -> Polygon {
        polygon(&[
            [35.21, 31.77],
            [35.23, 31.77],
            [35.23, 31.79],
            [35.21, 31.79],
            [35.21, 31.77],
        ])
    }

    #[test]
    fn square_is_valid_and_contains_its_centre() {
        let square = square();
        assert!(square.validate().is_ok());
        assert!(square.contains(35.22, 31.78));
        assert!(!square.contains(35.0, 31.78));
        assert!(!square.contains(35.22, 32.0));
    }

    #[test]
    fn open_ring_is_rejected() {
        let err = polygon(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]])
            .validate()
            .unwrap_err();
        assert!(err.contains("closed"));
    }

    #[test]
    fn short_ring_is_rejected() {
        let err = polygon(&[[0.0, 0.0], [1.0, 1.0], [0.0, 0.0]]).validate().unwrap_err();
        assert!(err.contains("at least 4 points"));
    }

    #[test]
    fn out_of_range_positions_are_rejected() {
        let err = polygon(&[[200.0, 0.0], [1.0, 0.0], [1.0, 1.0], [200.0, 0.0]])
            .validate()
            .unwrap_err();
        assert!(err.contains("lon out of range"));

        let err = polygon(&[[0.0, 95.0], [1.0, 0.0], [1.0, 1.0], [0.0, 95.0]])
            .validate()
            .unwrap_err();
        assert!(err.contains("lat out of range"));
    }

    #[test]
    fn wrong_type_and_arity_are_rejected() {
        let mut p = square();
        p.kind = "Point".to_string();
        assert!(p.validate().is_err());

        let mut p = square();
        p.coordinates[0][1] = vec![1.0, 2.0, 3.0];
        assert!(p.validate().unwrap_err().contains("[lon, lat]"));

        let p = Polygon {
            kind: "Polygon".to_string(),
            coordinates: Vec::new(),
        };
        assert!(p.validate().unwrap_err().contains("non-empty"));
    }
}
