//! Data models for ground control point collection.

mod gate;
mod point;
mod store;

pub use gate::{FieldIssue, GateReport, MIN_GCP_COUNT, can_georeference};
pub use point::{CoordField, GeoValue, GroundControlPoint, PointHandle};
pub use store::{ObserverId, PointChange, PointStore, StoreError};
