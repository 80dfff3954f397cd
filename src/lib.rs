//! georef - ground control point georeferencing
//!
//! Collects pixel-to-geographic correspondences on a raster image and drives
//! a remote service that fits the transform and warps the image for display
//! on a map.

pub mod cli;
pub mod config;
pub mod error;
pub mod map;
pub mod model;
pub mod points_file;
pub mod state;
pub mod viewer;
pub mod views;
pub mod workflow;

pub use config::GeorefConfig;
pub use error::WorkflowError;
pub use workflow::{GeorefOutcome, Workflow};
