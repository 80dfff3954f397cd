//! Readiness check for triggering georeferencing.

use std::fmt;

use super::point::{CoordField, GeoValue, GroundControlPoint};

/// Minimum number of correspondences for an affine fit.
pub const MIN_GCP_COUNT: usize = 3;

/// Whether the points are enough to attempt georeferencing.
///
/// At least [`MIN_GCP_COUNT`] points, each with finite lon and lat.
/// Collinear configurations pass here; the service rejects those itself.
pub fn can_georeference(points: &[GroundControlPoint]) -> bool {
    points.len() >= MIN_GCP_COUNT && points.iter().all(GroundControlPoint::is_complete)
}

/// A geographic field that blocks the gate.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldIssue {
    pub index: usize,
    pub field: CoordField,
    /// `None` when the field is unset, otherwise the rejected text
    pub rejected: Option<String>,
}

/// Why the gate is open or closed, for user feedback.
#[derive(Debug, Clone, PartialEq)]
pub struct GateReport {
    pub point_count: usize,
    pub issues: Vec<FieldIssue>,
}

impl GateReport {
    pub fn build(points: &[GroundControlPoint]) -> Self {
        let mut issues = Vec::new();
        for (index, point) in points.iter().enumerate() {
            for field in [CoordField::Lon, CoordField::Lat] {
                match point.field(field) {
                    GeoValue::Valid(_) => {}
                    GeoValue::Unset => issues.push(FieldIssue {
                        index,
                        field,
                        rejected: None,
                    }),
                    GeoValue::Invalid(raw) => issues.push(FieldIssue {
                        index,
                        field,
                        rejected: Some(raw.clone()),
                    }),
                }
            }
        }
        Self {
            point_count: points.len(),
            issues,
        }
    }

    /// Points still needed to reach the minimum.
    pub fn missing_points(&self) -> usize {
        MIN_GCP_COUNT.saturating_sub(self.point_count)
    }

    /// Same answer as [`can_georeference`] on the same points.
    pub fn is_ready(&self) -> bool {
        self.missing_points() == 0 && self.issues.is_empty()
    }
}

impl fmt::Display for GateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ready() {
            return write!(f, "{} points ready for georeferencing", self.point_count);
        }
        if self.missing_points() > 0 {
            writeln!(
                f,
                "{} points, at least {} more needed",
                self.point_count,
                self.missing_points()
            )?;
        }
        for issue in &self.issues {
            match &issue.rejected {
                None => writeln!(f, "point {}: {} not set", issue.index + 1, issue.field)?,
                Some(raw) => writeln!(
                    f,
                    "point {}: {} {:?} is not a number",
                    issue.index + 1,
                    issue.field,
                    raw
                )?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lon: GeoValue, lat: GeoValue) -> GroundControlPoint {
        let mut p = GroundControlPoint::new(0.0, 0.0);
        p.lon = lon;
        p.lat = lat;
        p
    }

    fn valid(lon: f64, lat: f64) -> GroundControlPoint {
        point(GeoValue::Valid(lon), GeoValue::Valid(lat))
    }

    #[test]
    fn test_needs_three_points() {
        assert!(!can_georeference(&[]));
        assert!(!can_georeference(&[valid(1.0, 1.0), valid(2.0, 2.0)]));
        assert!(can_georeference(&[
            valid(1.0, 1.0),
            valid(2.0, 2.0),
            valid(3.0, 3.0)
        ]));
    }

    #[test]
    fn test_zero_coordinates_count_as_set() {
        assert!(can_georeference(&[
            valid(0.0, 0.0),
            valid(0.0, 1.0),
            valid(1.0, 0.0)
        ]));
    }

    #[test]
    fn test_any_unset_or_invalid_closes_gate() {
        let unset = [
            valid(1.0, 1.0),
            valid(2.0, 2.0),
            point(GeoValue::Valid(3.0), GeoValue::Unset),
        ];
        assert!(!can_georeference(&unset));

        let invalid = [
            valid(1.0, 1.0),
            point(GeoValue::Invalid("x".into()), GeoValue::Valid(2.0)),
            valid(3.0, 3.0),
        ];
        assert!(!can_georeference(&invalid));
    }

    #[test]
    fn test_report_agrees_with_gate() {
        let cases: Vec<Vec<GroundControlPoint>> = vec![
            vec![],
            vec![valid(1.0, 1.0)],
            vec![valid(1.0, 1.0), valid(2.0, 2.0), valid(3.0, 3.0)],
            vec![
                valid(1.0, 1.0),
                valid(2.0, 2.0),
                point(GeoValue::Unset, GeoValue::Invalid("?".into())),
            ],
        ];
        for points in cases {
            assert_eq!(GateReport::build(&points).is_ready(), can_georeference(&points));
        }
    }

    #[test]
    fn test_report_lists_issues() {
        let points = [
            valid(1.0, 1.0),
            point(GeoValue::Unset, GeoValue::Invalid("abc".into())),
        ];
        let report = GateReport::build(&points);
        assert_eq!(report.missing_points(), 1);
        assert_eq!(
            report.issues,
            vec![
                FieldIssue {
                    index: 1,
                    field: CoordField::Lon,
                    rejected: None
                },
                FieldIssue {
                    index: 1,
                    field: CoordField::Lat,
                    rejected: Some("abc".to_string())
                },
            ]
        );

        let text = report.to_string();
        assert!(text.contains("at least 1 more needed"));
        assert!(text.contains("point 2: lon not set"));
        assert!(text.contains("point 2: lat \"abc\" is not a number"));
    }
}
