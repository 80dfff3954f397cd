//! Bridges pointer input on the image viewer to point creation.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::error::WorkflowError;
use crate::model::PointHandle;
use crate::state::PointSink;

use super::gesture::{ClickThresholds, Gesture, GestureTracker, PointerEvent};
use super::transform::{ViewTransform, Viewport};

/// Zoom step per wheel notch.
pub const ZOOM_FACTOR: f64 = 1.1;

/// Viewer behaviour settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerSettings {
    /// Zoom relative to fit-to-view applied when an image is attached
    #[serde(default = "default_zoom_level")]
    pub default_zoom_level: f64,
    /// Lower zoom bound, relative to fit-to-view
    #[serde(default = "default_min_zoom_level")]
    pub min_zoom_level: f64,
    /// Upper zoom bound, relative to fit-to-view
    #[serde(default = "default_max_zoom_level")]
    pub max_zoom_level: f64,
    /// Maximum pointer travel for a click, in screen pixels
    #[serde(default = "default_click_distance")]
    pub click_distance: f64,
    /// Maximum press duration for a click
    #[serde(default = "default_click_time_ms")]
    pub click_time_ms: u64,
}

fn default_zoom_level() -> f64 {
    1.0
}

fn default_min_zoom_level() -> f64 {
    0.1
}

fn default_max_zoom_level() -> f64 {
    150.0
}

fn default_click_distance() -> f64 {
    5.0
}

fn default_click_time_ms() -> u64 {
    300
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            default_zoom_level: default_zoom_level(),
            min_zoom_level: default_min_zoom_level(),
            max_zoom_level: default_max_zoom_level(),
            click_distance: default_click_distance(),
            click_time_ms: default_click_time_ms(),
        }
    }
}

impl ViewerSettings {
    pub fn click_thresholds(&self) -> ClickThresholds {
        ClickThresholds {
            distance: self.click_distance,
            time: Duration::from_millis(self.click_time_ms),
        }
    }
}

/// Visual marker for a placed point, in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub x: f64,
    pub y: f64,
}

/// Viewer-side state for the loaded image: transform, gesture tracking and
/// one marker per point in store order.
#[derive(Debug, Clone)]
pub struct ViewerAdapter {
    settings: ViewerSettings,
    viewport: Viewport,
    image_size: Option<(u32, u32)>,
    transform: ViewTransform,
    fit_zoom: f64,
    tracker: GestureTracker,
    markers: Vec<Marker>,
}

impl ViewerAdapter {
    pub fn new(settings: ViewerSettings, viewport: Viewport) -> Self {
        let tracker = GestureTracker::new(settings.click_thresholds());
        Self {
            settings,
            viewport,
            image_size: None,
            transform: ViewTransform::identity(),
            fit_zoom: 1.0,
            tracker,
            markers: Vec::new(),
        }
    }

    /// Show a new image. Markers from the previous one are dropped.
    pub fn attach(&mut self, image_size: (u32, u32)) {
        self.teardown();
        self.image_size = Some(image_size);
        let fit = ViewTransform::fit(&self.viewport, image_size);
        self.fit_zoom = fit.zoom;
        self.transform = ViewTransform::new(
            self.clamp_zoom(fit.zoom * self.settings.default_zoom_level),
            0.0,
            0.0,
        );
    }

    /// Drop the image, its markers and any press in progress.
    pub fn teardown(&mut self) {
        self.image_size = None;
        self.markers.clear();
        self.tracker.reset();
        self.transform = ViewTransform::identity();
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn transform(&self) -> &ViewTransform {
        &self.transform
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Feed pointer input. A quick click on the image adds a point to `sink`.
    pub fn handle_pointer(
        &mut self,
        event: PointerEvent,
        sink: &mut impl PointSink,
    ) -> Result<Option<PointHandle>, WorkflowError> {
        self.handle_pointer_at(event, Instant::now(), sink)
    }

    pub fn handle_pointer_at(
        &mut self,
        event: PointerEvent,
        now: Instant,
        sink: &mut impl PointSink,
    ) -> Result<Option<PointHandle>, WorkflowError> {
        let Some(image_size) = self.image_size else {
            return Ok(None);
        };
        if let PointerEvent::Pressed { x, y } = event {
            if !self.viewport.contains(x, y) {
                return Ok(None);
            }
        }

        match self.tracker.handle_at(event, now) {
            Some(Gesture::Click { x, y }) => {
                let (img_x, img_y) =
                    self.transform
                        .screen_to_image(x, y, &self.viewport, image_size);
                if !inside_image(img_x, img_y, image_size) {
                    log::trace!("Click outside image at ({:.1}, {:.1})", img_x, img_y);
                    return Ok(None);
                }
                self.place_point(img_x, img_y, sink).map(Some)
            }
            Some(Gesture::Drag { dx, dy }) => {
                self.transform = self.transform.pan_by(dx, dy);
                Ok(None)
            }
            Some(Gesture::Zoom { delta, x, y }) => {
                self.zoom_at(delta, x, y);
                Ok(None)
            }
            Some(Gesture::Release) | None => Ok(None),
        }
    }

    /// Add a point at image coordinates and mark it.
    pub fn place_point(
        &mut self,
        img_x: f64,
        img_y: f64,
        sink: &mut impl PointSink,
    ) -> Result<PointHandle, WorkflowError> {
        let handle = sink.add_point(img_x, img_y)?;
        self.markers.push(Marker { x: img_x, y: img_y });
        Ok(handle)
    }

    /// Keep markers aligned with the store after a deletion.
    pub fn remove_marker(&mut self, index: usize) {
        if index < self.markers.len() {
            self.markers.remove(index);
        }
    }

    /// Marker positions on screen under the current transform.
    pub fn marker_screen_positions(&self) -> Vec<(f64, f64)> {
        let Some(image_size) = self.image_size else {
            return Vec::new();
        };
        self.markers
            .iter()
            .map(|m| {
                self.transform
                    .image_to_screen(m.x, m.y, &self.viewport, image_size)
            })
            .collect()
    }

    fn zoom_at(&mut self, delta: f64, x: f64, y: f64) {
        if !self.viewport.contains(x, y) {
            return;
        }
        let factor = if delta > 0.0 {
            ZOOM_FACTOR
        } else {
            1.0 / ZOOM_FACTOR
        };
        let new_zoom = self.clamp_zoom(self.transform.zoom * factor);
        self.transform = self.transform.zoom_to_cursor(new_zoom, x, y, &self.viewport);
        log::trace!("Zoom: {:.3}x at ({:.1}, {:.1})", new_zoom, x, y);
    }

    fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(
            self.fit_zoom * self.settings.min_zoom_level,
            self.fit_zoom * self.settings.max_zoom_level,
        )
    }
}

fn inside_image(x: f64, y: f64, (width, height): (u32, u32)) -> bool {
    x >= 0.0 && y >= 0.0 && x <= f64::from(width) && y <= f64::from(height)
}
