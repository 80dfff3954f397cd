//! Ordered point collection with change notification.

use std::fmt;

use thiserror::Error;

use super::point::{CoordField, GeoValue, GroundControlPoint, PointHandle};

/// Errors from point store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Index does not name an existing point
    #[error("Point index {index} out of range (store has {len} points)")]
    OutOfRange { index: usize, len: usize },
}

/// What a mutation did, delivered to observers after it is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum PointChange {
    Added { index: usize },
    Updated { index: usize, field: CoordField },
    Removed { index: usize },
    Cleared,
}

/// Identifies a registered observer so it can be removed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Observer = Box<dyn FnMut(&PointChange, &[GroundControlPoint])>;

/// Ordered sequence of ground control points.
///
/// Indices are positional: deleting point `i` moves every later point down by
/// one. Observers run synchronously after each successful mutation and see the
/// post-mutation snapshot.
#[derive(Default)]
pub struct PointStore {
    points: Vec<GroundControlPoint>,
    observers: Vec<(ObserverId, Observer)>,
    next_observer_id: u64,
}

impl fmt::Debug for PointStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointStore")
            .field("points", &self.points)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl PointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for every subsequent mutation.
    pub fn subscribe<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&PointChange, &[GroundControlPoint]) + 'static,
    {
        let id = ObserverId(self.next_observer_id);
        self.next_observer_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    /// Append a point with unset geographic fields.
    pub fn add_point(&mut self, pixel_x: f64, pixel_y: f64) -> PointHandle {
        let index = self.points.len();
        self.points.push(GroundControlPoint::new(pixel_x, pixel_y));
        log::debug!("➕ GCP #{} at pixel ({:.2}, {:.2})", index + 1, pixel_x, pixel_y);
        self.notify(PointChange::Added { index });
        PointHandle { index }
    }

    /// Set one geographic field from user text. See [`GeoValue::parse`].
    pub fn update_coordinate(
        &mut self,
        index: usize,
        field: CoordField,
        value: &str,
    ) -> Result<&GeoValue, StoreError> {
        let len = self.points.len();
        let point = self
            .points
            .get_mut(index)
            .ok_or(StoreError::OutOfRange { index, len })?;

        let parsed = GeoValue::parse(value);
        if let GeoValue::Invalid(raw) = &parsed {
            log::debug!("GCP #{} {} is not a finite number: {:?}", index + 1, field, raw);
        }
        *point.field_mut(field) = parsed;

        self.notify(PointChange::Updated { index, field });
        Ok(self.points[index].field(field))
    }

    /// Remove the point at `index`; later points shift down by one.
    pub fn delete_point(&mut self, index: usize) -> Result<GroundControlPoint, StoreError> {
        if index >= self.points.len() {
            return Err(StoreError::OutOfRange {
                index,
                len: self.points.len(),
            });
        }
        let removed = self.points.remove(index);
        log::debug!("🗑️ GCP #{} removed, {} left", index + 1, self.points.len());
        self.notify(PointChange::Removed { index });
        Ok(removed)
    }

    /// Drop every point.
    pub fn clear(&mut self) {
        if self.points.is_empty() {
            return;
        }
        self.points.clear();
        self.notify(PointChange::Cleared);
    }

    pub fn count(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&GroundControlPoint> {
        self.points.get(index)
    }

    /// Read-only view in insertion order.
    pub fn snapshot(&self) -> &[GroundControlPoint] {
        &self.points
    }

    fn notify(&mut self, change: PointChange) {
        for (_, observer) in &mut self.observers {
            observer(&change, &self.points);
        }
    }
}
