//! Point table view model, rebuilt from store change notifications.

use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::Rc;

use crate::model::{CoordField, GeoValue, GroundControlPoint, ObserverId, PointChange};
use crate::state::Session;

/// One table row.
#[derive(Debug, Clone, PartialEq)]
pub struct PointRow {
    /// 1-based row number
    pub number: usize,
    /// Pixel column, two decimals
    pub x: String,
    /// Pixel row, two decimals
    pub y: String,
    /// Editable longitude text
    pub lon: String,
    /// Editable latitude text
    pub lat: String,
    pub lon_invalid: bool,
    pub lat_invalid: bool,
}

impl PointRow {
    fn from_point(index: usize, point: &GroundControlPoint) -> Self {
        let invalid = |field| matches!(point.field(field), GeoValue::Invalid(_));
        Self {
            number: index + 1,
            x: format!("{:.2}", point.pixel_x()),
            y: format!("{:.2}", point.pixel_y()),
            lon: point.lon.display_text(),
            lat: point.lat.display_text(),
            lon_invalid: invalid(CoordField::Lon),
            lat_invalid: invalid(CoordField::Lat),
        }
    }

    /// Row position in the store.
    pub fn index(&self) -> usize {
        self.number - 1
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointTable {
    rows: Vec<PointRow>,
    rebuilds: usize,
}

impl PointTable {
    pub fn from_points(points: &[GroundControlPoint]) -> Self {
        let mut table = Self::default();
        table.rebuild(points);
        table
    }

    /// Subscribe a table to `session`; it stays current until unsubscribed.
    pub fn attach(session: &mut Session) -> (Rc<RefCell<PointTable>>, ObserverId) {
        let table = Rc::new(RefCell::new(Self::from_points(session.points())));
        let observer = Rc::clone(&table);
        let id = session.subscribe(move |change: &PointChange, points: &[GroundControlPoint]| {
            log::trace!("Point table refresh after {:?}", change);
            observer.borrow_mut().rebuild(points);
        });
        (table, id)
    }

    pub fn rebuild(&mut self, points: &[GroundControlPoint]) {
        self.rows = points
            .iter()
            .enumerate()
            .map(|(i, p)| PointRow::from_point(i, p))
            .collect();
        self.rebuilds += 1;
    }

    pub fn rows(&self) -> &[PointRow] {
        &self.rows
    }

    /// How many times the table was rebuilt, including the initial build.
    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }

    /// Plain-text rendering with a header row. Invalid values are starred.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{:>3}  {:>10}  {:>10}  {:>14}  {:>14}", "#", "x", "y", "lon", "lat");
        for row in &self.rows {
            let lon = mark_invalid(&row.lon, row.lon_invalid);
            let lat = mark_invalid(&row.lat, row.lat_invalid);
            let _ = writeln!(
                out,
                "{:>3}  {:>10}  {:>10}  {:>14}  {:>14}",
                row.number, row.x, row.y, lon, lat
            );
        }
        out
    }
}

fn mark_invalid(text: &str, invalid: bool) -> String {
    if invalid {
        format!("*{}", text)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{LoadedImage, PointSink, tiny_png};

    fn session() -> Session {
        let mut session = Session::new();
        session.begin_image_load().unwrap();
        session.finish_image_load(LoadedImage::from_bytes("a.png", tiny_png(64, 64)).unwrap());
        session
    }

    #[test]
    fn test_rows_follow_store() {
        let mut session = session();
        let (table, _id) = PointTable::attach(&mut session);
        assert!(table.borrow().rows().is_empty());

        session.add_point(10.0, 20.5).unwrap();
        session.add_point(30.126, 40.0).unwrap();
        session.update_coordinate(1, CoordField::Lon, "12.5").unwrap();
        session.update_coordinate(1, CoordField::Lat, "north").unwrap();

        {
            let table = table.borrow();
            let rows = table.rows();
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].number, 1);
            assert_eq!(rows[0].x, "10.00");
            assert_eq!(rows[0].y, "20.50");
            assert_eq!(rows[0].lon, "");
            assert_eq!(rows[1].x, "30.13");
            assert_eq!(rows[1].lon, "12.5");
            assert_eq!(rows[1].lat, "north");
            assert!(rows[1].lat_invalid);
            assert!(!rows[1].lon_invalid);
        }

        session.delete_point(0).unwrap();
        let table = table.borrow();
        assert_eq!(table.rows().len(), 1);
        assert_eq!(table.rows()[0].number, 1);
        assert_eq!(table.rows()[0].index(), 0);
        assert_eq!(table.rows()[0].lon, "12.5");
        // initial build plus five mutations
        assert_eq!(table.rebuilds(), 6);
    }

    #[test]
    fn test_unsubscribe_stops_updates() {
        let mut session = session();
        let (table, id) = PointTable::attach(&mut session);
        session.add_point(1.0, 1.0).unwrap();
        assert!(session.unsubscribe(id));
        session.add_point(2.0, 2.0).unwrap();
        assert_eq!(table.borrow().rows().len(), 1);
    }

    #[test]
    fn test_render_text_marks_invalid() {
        let mut session = session();
        session.add_point(1.0, 2.0).unwrap();
        session.update_coordinate(0, CoordField::Lon, "abc").unwrap();
        session.update_coordinate(0, CoordField::Lat, "45").unwrap();

        let text = PointTable::from_points(session.points()).render_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("*abc"));
        assert!(lines[1].contains("45"));
        assert!(lines[1].contains("1.00"));
    }
}
