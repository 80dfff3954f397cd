//! The georeferencing workflow: one session wired to the viewer, the map and
//! the remote service.

mod protocol;

#[cfg(test)]
pub(crate) mod tests;

use std::path::Path;

use georef_remote::{GeorefService, UploadReceipt};

use crate::config::GeorefConfig;
use crate::error::WorkflowError;
use crate::map::{DisplayError, MapAdapter, MapView};
use crate::model::{CoordField, GeoValue, GroundControlPoint, PointHandle};
use crate::state::{ImageLoadError, LoadedImage, Phase, ResultRef, Session, UploadState};
use crate::viewer::{PointerEvent, ViewerAdapter, Viewport};

use protocol::{SubmissionGuard, submit_and_trigger};

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct GeorefOutcome {
    pub result: ResultRef,
    /// The map could not show the result. The run itself still succeeded.
    pub display_error: Option<DisplayError>,
}

pub struct Workflow<S: GeorefService, M: MapView> {
    session: Session,
    service: S,
    viewer: ViewerAdapter,
    map: MapAdapter<M>,
}

impl<S: GeorefService, M: MapView> Workflow<S, M> {
    pub fn new(service: S, map_view: M, config: &GeorefConfig, viewport: Viewport) -> Self {
        Self {
            session: Session::new(),
            service,
            viewer: ViewerAdapter::new(config.viewer.clone(), viewport),
            map: MapAdapter::new(map_view, config.map.clone()),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Mutable session access, e.g. to subscribe observers.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn viewer(&self) -> &ViewerAdapter {
        &self.viewer
    }

    pub fn viewer_mut(&mut self) -> &mut ViewerAdapter {
        &mut self.viewer
    }

    pub fn map(&self) -> &MapAdapter<M> {
        &self.map
    }

    // ------------------------------------------------------------------
    // Image
    // ------------------------------------------------------------------

    /// Replace the current image with `bytes`.
    ///
    /// Markers and the overlay go first, then the points and upload state.
    /// On a decode failure the session is left `Empty`.
    pub fn load_image(
        &mut self,
        name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<&LoadedImage, WorkflowError> {
        self.begin_load()?;
        let loaded = LoadedImage::from_bytes(name, bytes);
        self.finish_load(loaded)
    }

    pub fn load_image_path(&mut self, path: &Path) -> Result<&LoadedImage, WorkflowError> {
        self.begin_load()?;
        let loaded = LoadedImage::from_path(path);
        self.finish_load(loaded)
    }

    fn begin_load(&mut self) -> Result<(), WorkflowError> {
        if self.session.is_busy() {
            return Err(WorkflowError::Busy);
        }
        self.viewer.teardown();
        self.map.remove_overlay();
        self.session.begin_image_load()
    }

    fn finish_load(
        &mut self,
        loaded: Result<LoadedImage, ImageLoadError>,
    ) -> Result<&LoadedImage, WorkflowError> {
        match loaded {
            Ok(image) => {
                self.viewer.attach(image.size());
                Ok(self.session.finish_image_load(image))
            }
            Err(e) => {
                log::error!("Failed to load image: {}", e);
                self.session.fail_image_load();
                Err(e.into())
            }
        }
    }

    /// Send the loaded image to the service and record the outcome.
    pub async fn upload_image(&mut self) -> Result<UploadReceipt, WorkflowError> {
        if self.session.is_busy() {
            return Err(WorkflowError::Busy);
        }
        let image = self.session.mark_upload_started()?;
        log::info!("Uploading '{}' ({} bytes)", image.name, image.data.len());

        let uploaded = self.service.upload_image(image.payload()).await;
        match uploaded {
            Ok(receipt) => {
                self.session.mark_upload_completed(receipt.clone());
                Ok(receipt)
            }
            Err(e) => {
                log::error!("Image upload failed: {}", e);
                self.session.mark_upload_failed(e.to_string());
                Err(WorkflowError::Upload(e))
            }
        }
    }

    // ------------------------------------------------------------------
    // Points
    // ------------------------------------------------------------------

    pub fn handle_pointer(
        &mut self,
        event: PointerEvent,
    ) -> Result<Option<PointHandle>, WorkflowError> {
        let was_georeferenced = self.is_georeferenced();
        let handle = self.viewer.handle_pointer(event, &mut self.session)?;
        if handle.is_some() {
            self.after_edit(was_georeferenced);
        }
        Ok(handle)
    }

    /// Add a point at image coordinates, as a click there would.
    pub fn place_point(&mut self, img_x: f64, img_y: f64) -> Result<PointHandle, WorkflowError> {
        let was_georeferenced = self.is_georeferenced();
        let handle = self.viewer.place_point(img_x, img_y, &mut self.session)?;
        self.after_edit(was_georeferenced);
        Ok(handle)
    }

    pub fn update_coordinate(
        &mut self,
        index: usize,
        field: CoordField,
        value: &str,
    ) -> Result<GeoValue, WorkflowError> {
        let was_georeferenced = self.is_georeferenced();
        let stored = self.session.update_coordinate(index, field, value)?;
        self.after_edit(was_georeferenced);
        Ok(stored)
    }

    pub fn delete_point(&mut self, index: usize) -> Result<GroundControlPoint, WorkflowError> {
        let was_georeferenced = self.is_georeferenced();
        let removed = self.session.delete_point(index)?;
        self.viewer.remove_marker(index);
        self.after_edit(was_georeferenced);
        Ok(removed)
    }

    fn is_georeferenced(&self) -> bool {
        self.session.phase() == Phase::Georeferenced
    }

    /// The session drops a stale result on edit; the overlay showing it goes too.
    fn after_edit(&mut self, was_georeferenced: bool) {
        if was_georeferenced && !self.is_georeferenced() {
            self.map.remove_overlay();
        }
    }

    // ------------------------------------------------------------------
    // Georeferencing
    // ------------------------------------------------------------------

    /// Submit all points in order, trigger the transform and show the result.
    ///
    /// Every precondition is checked before the first request. A failure at
    /// any step leaves the points untouched and the session collecting again.
    pub async fn start_georeferencing(&mut self) -> Result<GeorefOutcome, WorkflowError> {
        let was_georeferenced = self.is_georeferenced();
        let gcps = match self.session.begin_submission() {
            Ok(gcps) => gcps,
            Err(e) => {
                log::warn!("Georeferencing not started: {}", e);
                return Err(e);
            }
        };
        log::info!("🚀 Georeferencing with {} GCPs", gcps.len());
        // The session dropped the previous result, so its overlay goes too.
        self.after_edit(was_georeferenced);

        let guard = SubmissionGuard::new(&mut self.session);
        if let Err(e) = submit_and_trigger(&self.service, &gcps).await {
            log::error!("{}", e);
            drop(guard);
            return Err(e);
        }
        let result = guard.complete(ResultRef {
            url: self.service.result_url(),
        });

        let display_error = match self.map.display(self.session.points(), &result) {
            Ok(_) => None,
            Err(e) => {
                log::warn!("Result not shown on map: {}", e);
                Some(e)
            }
        };

        Ok(GeorefOutcome {
            result,
            display_error,
        })
    }

    /// The map finished loading the overlay.
    pub fn overlay_loaded(&mut self) -> Result<(), DisplayError> {
        self.map.overlay_loaded()
    }

    /// The map failed to load the overlay. The run stays georeferenced.
    pub fn overlay_failed(&mut self, message: impl Into<String>) -> DisplayError {
        self.map.overlay_failed(message)
    }

    /// Fetch the warped image bytes.
    pub async fn download_result(&self) -> Result<Vec<u8>, WorkflowError> {
        if !self.session.can_download() {
            return Err(WorkflowError::NoResult);
        }
        let bytes = self
            .service
            .fetch_result()
            .await
            .map_err(WorkflowError::Download)?;
        log::info!("💾 Result downloaded ({} bytes)", bytes.len());
        Ok(bytes)
    }

    /// Download the result and report the overlay loaded, or failed if the
    /// download did. For front-ends where fetching the result is the load.
    pub async fn download_and_show_result(&mut self) -> Result<Vec<u8>, WorkflowError> {
        match self.download_result().await {
            Ok(bytes) => {
                if let Err(e) = self.map.overlay_loaded() {
                    log::warn!("Overlay not fitted: {}", e);
                }
                Ok(bytes)
            }
            Err(WorkflowError::NoResult) => Err(WorkflowError::NoResult),
            Err(e) => {
                self.map.overlay_failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Whether an upload has been confirmed for the current image.
    pub fn is_uploaded(&self) -> bool {
        matches!(self.session.upload_state(), UploadState::Completed(_))
    }
}
