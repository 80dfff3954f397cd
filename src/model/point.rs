//! Ground control point types.

use std::fmt;

use georef_remote::GcpSubmission;

/// Which geographic field of a point is being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordField {
    Lon,
    Lat,
}

impl CoordField {
    /// Get the display name for this field.
    pub fn name(&self) -> &'static str {
        match self {
            CoordField::Lon => "lon",
            CoordField::Lat => "lat",
        }
    }
}

impl fmt::Display for CoordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A geographic coordinate as entered by the user.
///
/// `Unset` and `Valid(0.0)` are different states: the latter is a real
/// location on the equator / prime meridian.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GeoValue {
    /// Nothing entered yet.
    #[default]
    Unset,
    /// Parsed to a finite number.
    Valid(f64),
    /// Text that does not parse to a finite number. Kept for display.
    Invalid(String),
}

impl GeoValue {
    /// Interpret a text field.
    ///
    /// Blank input clears the value. Anything that parses to a finite `f64`
    /// is valid; `NaN`, infinities and garbage are kept as `Invalid`.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return GeoValue::Unset;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => GeoValue::Valid(value),
            _ => GeoValue::Invalid(trimmed.to_string()),
        }
    }

    /// The number, if this value is valid.
    pub fn value(&self) -> Option<f64> {
        match self {
            GeoValue::Valid(value) => Some(*value),
            GeoValue::Unset | GeoValue::Invalid(_) => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, GeoValue::Valid(_))
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, GeoValue::Unset)
    }

    /// Text to put back into an edit field.
    pub fn display_text(&self) -> String {
        match self {
            GeoValue::Unset => String::new(),
            GeoValue::Valid(value) => value.to_string(),
            GeoValue::Invalid(raw) => raw.clone(),
        }
    }
}

/// Position of a point in the store, returned when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointHandle {
    pub index: usize,
}

/// A pixel location paired with a (possibly incomplete) geographic coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundControlPoint {
    pixel_x: f64,
    pixel_y: f64,
    /// Longitude in degrees
    pub lon: GeoValue,
    /// Latitude in degrees
    pub lat: GeoValue,
}

impl GroundControlPoint {
    /// Create a point at a pixel location with no geographic coordinate yet.
    pub fn new(pixel_x: f64, pixel_y: f64) -> Self {
        Self {
            pixel_x,
            pixel_y,
            lon: GeoValue::Unset,
            lat: GeoValue::Unset,
        }
    }

    pub fn pixel_x(&self) -> f64 {
        self.pixel_x
    }

    pub fn pixel_y(&self) -> f64 {
        self.pixel_y
    }

    pub fn field(&self, field: CoordField) -> &GeoValue {
        match field {
            CoordField::Lon => &self.lon,
            CoordField::Lat => &self.lat,
        }
    }

    pub(crate) fn field_mut(&mut self, field: CoordField) -> &mut GeoValue {
        match field {
            CoordField::Lon => &mut self.lon,
            CoordField::Lat => &mut self.lat,
        }
    }

    /// Both geographic fields hold finite numbers.
    pub fn is_complete(&self) -> bool {
        self.lon.is_valid() && self.lat.is_valid()
    }

    /// `(lon, lat)` if both are valid.
    pub fn geo(&self) -> Option<(f64, f64)> {
        Some((self.lon.value()?, self.lat.value()?))
    }

    /// Wire form of this point, if it is complete.
    pub fn to_submission(&self) -> Option<GcpSubmission> {
        let (lon, lat) = self.geo()?;
        Some(GcpSubmission {
            x: self.pixel_x,
            y: self.pixel_y,
            lon,
            lat,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_numbers() {
        assert_eq!(GeoValue::parse("12.5"), GeoValue::Valid(12.5));
        assert_eq!(GeoValue::parse(" -0.25 "), GeoValue::Valid(-0.25));
        assert_eq!(GeoValue::parse("1e2"), GeoValue::Valid(100.0));
    }

    #[test]
    fn test_zero_is_not_unset() {
        let zero = GeoValue::parse("0");
        assert_eq!(zero, GeoValue::Valid(0.0));
        assert!(!zero.is_unset());
        assert!(zero.is_valid());
    }

    #[test]
    fn test_blank_clears() {
        assert_eq!(GeoValue::parse(""), GeoValue::Unset);
        assert_eq!(GeoValue::parse("   "), GeoValue::Unset);
    }

    #[test]
    fn test_non_finite_is_invalid() {
        assert_eq!(GeoValue::parse("NaN"), GeoValue::Invalid("NaN".to_string()));
        assert_eq!(GeoValue::parse("inf"), GeoValue::Invalid("inf".to_string()));
        assert_eq!(
            GeoValue::parse("12,5"),
            GeoValue::Invalid("12,5".to_string())
        );
        assert!(GeoValue::parse("abc").value().is_none());
    }

    #[test]
    fn test_new_point_is_unset() {
        let point = GroundControlPoint::new(10.0, 20.0);
        assert_eq!(point.pixel_x(), 10.0);
        assert_eq!(point.pixel_y(), 20.0);
        assert!(point.lon.is_unset());
        assert!(point.lat.is_unset());
        assert!(!point.is_complete());
        assert!(point.to_submission().is_none());
    }

    #[test]
    fn test_submission_carries_all_fields() {
        let mut point = GroundControlPoint::new(1.5, 2.5);
        point.lon = GeoValue::Valid(5.0);
        point.lat = GeoValue::Valid(60.0);
        assert_eq!(
            point.to_submission(),
            Some(GcpSubmission {
                x: 1.5,
                y: 2.5,
                lon: 5.0,
                lat: 60.0
            })
        );
    }
}
