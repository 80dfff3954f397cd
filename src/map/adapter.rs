//! Shows the georeferenced result over a base map.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::GroundControlPoint;
use crate::state::ResultRef;

use super::bounds::GeoBounds;

/// Errors while displaying the result. None of them affect the workflow state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DisplayError {
    /// No point has a complete coordinate to derive bounds from
    #[error("Cannot place overlay: no point has valid coordinates")]
    NoBounds,

    /// The overlay resource failed to load
    #[error("Failed to load georeferenced overlay from {url}: {message}")]
    OverlayLoad { url: String, message: String },

    /// Load event reported with nothing displayed
    #[error("No overlay is being displayed")]
    NoOverlay,
}

/// Map display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSettings {
    /// Base layer tile URL template
    #[serde(default = "default_tile_url")]
    pub tile_url: String,
    #[serde(default = "default_attribution")]
    pub attribution: String,
    /// `[lat, lon]` shown before any overlay
    #[serde(default)]
    pub initial_center: [f64; 2],
    #[serde(default = "default_initial_zoom")]
    pub initial_zoom: u8,
    /// 0.0 (transparent) to 1.0 (opaque)
    #[serde(default = "default_overlay_opacity")]
    pub overlay_opacity: f64,
}

fn default_tile_url() -> String {
    "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string()
}

fn default_attribution() -> String {
    "© OpenStreetMap contributors".to_string()
}

fn default_initial_zoom() -> u8 {
    2
}

fn default_overlay_opacity() -> f64 {
    1.0
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            tile_url: default_tile_url(),
            attribution: default_attribution(),
            initial_center: [0.0, 0.0],
            initial_zoom: default_initial_zoom(),
            overlay_opacity: default_overlay_opacity(),
        }
    }
}

/// An image placed on the map at geographic bounds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageOverlay {
    pub url: String,
    pub bounds: GeoBounds,
    pub opacity: f64,
}

/// The map component.
///
/// Overlay loading is asynchronous on the component side; it reports back
/// through [`MapAdapter::overlay_loaded`] or [`MapAdapter::overlay_failed`].
pub trait MapView {
    /// Create the base layer if not already present.
    fn ensure_base_layer(&mut self, settings: &MapSettings);
    fn add_overlay(&mut self, overlay: &ImageOverlay);
    fn remove_overlay(&mut self);
    fn fit_bounds(&mut self, bounds: &GeoBounds);
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayStatus {
    None,
    Loading,
    Loaded,
    Failed(String),
}

pub struct MapAdapter<V: MapView> {
    view: V,
    settings: MapSettings,
    overlay: Option<ImageOverlay>,
    status: OverlayStatus,
}

impl<V: MapView> MapAdapter<V> {
    pub fn new(view: V, settings: MapSettings) -> Self {
        Self {
            view,
            settings,
            overlay: None,
            status: OverlayStatus::None,
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn status(&self) -> &OverlayStatus {
        &self.status
    }

    pub fn overlay(&self) -> Option<&ImageOverlay> {
        self.overlay.as_ref()
    }

    /// Replace any previous overlay with `result`, bounded by the points.
    pub fn display(
        &mut self,
        points: &[GroundControlPoint],
        result: &ResultRef,
    ) -> Result<&ImageOverlay, DisplayError> {
        let bounds = GeoBounds::from_points(points).ok_or(DisplayError::NoBounds)?;
        log::debug!("Overlay bounds: {:?}", bounds.corners());
        if bounds.is_degenerate() {
            log::warn!(
                "GCPs span no area ({:?}), the overlay will be a line or a point",
                bounds.corners()
            );
        }

        self.view.ensure_base_layer(&self.settings);
        self.remove_overlay();

        let overlay = ImageOverlay {
            url: result.url.clone(),
            bounds,
            opacity: self.settings.overlay_opacity,
        };
        self.view.add_overlay(&overlay);
        self.status = OverlayStatus::Loading;
        Ok(self.overlay.insert(overlay))
    }

    /// The map finished loading the overlay: fit the view to it.
    pub fn overlay_loaded(&mut self) -> Result<(), DisplayError> {
        let overlay = self.overlay.as_ref().ok_or(DisplayError::NoOverlay)?;
        log::info!("Georeferenced overlay loaded");
        self.view.fit_bounds(&overlay.bounds);
        self.status = OverlayStatus::Loaded;
        Ok(())
    }

    /// The map could not load the overlay. The base map stays usable.
    pub fn overlay_failed(&mut self, message: impl Into<String>) -> DisplayError {
        let message = message.into();
        let url = self
            .overlay
            .as_ref()
            .map(|o| o.url.clone())
            .unwrap_or_default();
        log::warn!("Error loading georeferenced overlay from {}: {}", url, message);
        self.status = OverlayStatus::Failed(message.clone());
        DisplayError::OverlayLoad { url, message }
    }

    /// Remove the overlay, keeping the base layer.
    pub fn remove_overlay(&mut self) {
        if self.overlay.take().is_some() {
            self.view.remove_overlay();
        }
        self.status = OverlayStatus::None;
    }
}
