//! Image viewer integration: coordinate mapping, gesture classification and
//! point placement.

mod adapter;
mod gesture;
mod transform;

pub use adapter::{Marker, ViewerAdapter, ViewerSettings, ZOOM_FACTOR};
pub use gesture::{ClickThresholds, Gesture, GestureTracker, PointerEvent};
pub use transform::{ViewTransform, Viewport};
