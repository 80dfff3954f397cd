//! Headless map view that records what a web map would be told to show.

use std::path::Path;

use serde::Serialize;

use super::adapter::{ImageOverlay, MapSettings, MapView};
use super::bounds::GeoBounds;

/// Leaflet-style description of the base layer and result overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayManifest {
    pub tile_url: Option<String>,
    pub attribution: Option<String>,
    pub center: [f64; 2],
    pub zoom: u8,
    pub overlay: Option<ManifestOverlay>,
    /// Set once the overlay has loaded and the view was fitted
    pub fitted_bounds: Option<[[f64; 2]; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManifestOverlay {
    pub url: String,
    /// `[[south, west], [north, east]]`
    pub bounds: [[f64; 2]; 2],
    pub opacity: f64,
}

impl Default for OverlayManifest {
    fn default() -> Self {
        Self {
            tile_url: None,
            attribution: None,
            center: [0.0, 0.0],
            zoom: 0,
            overlay: None,
            fitted_bounds: None,
        }
    }
}

impl OverlayManifest {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, json)?;
        log::info!("Wrote overlay manifest to {:?}", path);
        Ok(())
    }
}

/// [`MapView`] that keeps an [`OverlayManifest`] instead of drawing.
#[derive(Debug, Clone, Default)]
pub struct OverlayManifestView {
    manifest: OverlayManifest,
}

impl OverlayManifestView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn manifest(&self) -> &OverlayManifest {
        &self.manifest
    }
}

impl MapView for OverlayManifestView {
    fn ensure_base_layer(&mut self, settings: &MapSettings) {
        if self.manifest.tile_url.is_some() {
            return;
        }
        self.manifest.tile_url = Some(settings.tile_url.clone());
        self.manifest.attribution = Some(settings.attribution.clone());
        self.manifest.center = settings.initial_center;
        self.manifest.zoom = settings.initial_zoom;
    }

    fn add_overlay(&mut self, overlay: &ImageOverlay) {
        self.manifest.overlay = Some(ManifestOverlay {
            url: overlay.url.clone(),
            bounds: overlay.bounds.corners(),
            opacity: overlay.opacity,
        });
        self.manifest.fitted_bounds = None;
    }

    fn remove_overlay(&mut self) {
        self.manifest.overlay = None;
        self.manifest.fitted_bounds = None;
    }

    fn fit_bounds(&mut self, bounds: &GeoBounds) {
        let (lat, lon) = bounds.center();
        self.manifest.center = [lat, lon];
        self.manifest.fitted_bounds = Some(bounds.corners());
    }
}
