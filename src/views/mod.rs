//! View models for the workflow UI.

mod point_table;

pub use point_table::{PointRow, PointTable};
