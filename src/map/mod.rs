//! Map display of the georeferenced result.

mod adapter;
mod bounds;
mod manifest;

pub use adapter::{DisplayError, ImageOverlay, MapAdapter, MapSettings, MapView, OverlayStatus};
pub use bounds::GeoBounds;
pub use manifest::{ManifestOverlay, OverlayManifest, OverlayManifestView};
