//! Geographic extent of a point set.

use serde::Serialize;

use crate::model::GroundControlPoint;

/// Axis-aligned lat/lon box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBounds {
    /// Min/max over the points with both coordinates valid.
    ///
    /// `None` if no point qualifies.
    pub fn from_points(points: &[GroundControlPoint]) -> Option<Self> {
        let mut coords = points.iter().filter_map(GroundControlPoint::geo);
        let (lon, lat) = coords.next()?;
        let first = Self {
            south: lat,
            west: lon,
            north: lat,
            east: lon,
        };
        Some(coords.fold(first, |b, (lon, lat)| Self {
            south: b.south.min(lat),
            west: b.west.min(lon),
            north: b.north.max(lat),
            east: b.east.max(lon),
        }))
    }

    /// `[[south, west], [north, east]]`, the corner pair web maps expect.
    pub fn corners(&self) -> [[f64; 2]; 2] {
        [[self.south, self.west], [self.north, self.east]]
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    /// True when all points share a latitude or a longitude.
    pub fn is_degenerate(&self) -> bool {
        self.south == self.north || self.west == self.east
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GeoValue;

    fn point(lon: f64, lat: f64) -> GroundControlPoint {
        let mut p = GroundControlPoint::new(0.0, 0.0);
        p.lon = GeoValue::Valid(lon);
        p.lat = GeoValue::Valid(lat);
        p
    }

    #[test]
    fn test_min_max() {
        let bounds =
            GeoBounds::from_points(&[point(10.0, 50.0), point(12.5, 48.0), point(11.0, 51.5)])
                .unwrap();
        assert_eq!(
            bounds,
            GeoBounds {
                south: 48.0,
                west: 10.0,
                north: 51.5,
                east: 12.5
            }
        );
        assert_eq!(bounds.corners(), [[48.0, 10.0], [51.5, 12.5]]);
        assert_eq!(bounds.center(), (49.75, 11.25));
        assert!(!bounds.is_degenerate());
    }

    #[test]
    fn test_skips_incomplete_points() {
        let mut partial = GroundControlPoint::new(0.0, 0.0);
        partial.lon = GeoValue::Valid(100.0);
        let bounds = GeoBounds::from_points(&[partial, point(1.0, 2.0)]).unwrap();
        assert_eq!(bounds.east, 1.0);
        assert!(bounds.is_degenerate());
    }

    #[test]
    fn test_empty() {
        assert!(GeoBounds::from_points(&[]).is_none());
        assert!(GeoBounds::from_points(&[GroundControlPoint::new(1.0, 1.0)]).is_none());
    }
}
