//! Workflow session: the point store plus everything that gates what the user
//! may do next.
//!
//! The session owns one image load at a time. Loading another image discards
//! the points, the upload signal and any result.

use georef_remote::{GcpSubmission, UploadReceipt};

use crate::error::WorkflowError;
use crate::model::{
    CoordField, GateReport, GeoValue, GroundControlPoint, ObserverId, PointChange, PointHandle,
    PointStore, can_georeference,
};

use super::image::LoadedImage;

/// Stored phase of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Empty,
    ImageLoading,
    ImageReady,
    CollectingPoints,
    Submitting,
    Georeferenced,
}

/// Phase as presented to the UI.
///
/// `ReadyToSubmit` is `CollectingPoints` with the gate open; it is derived,
/// never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Empty,
    ImageLoading,
    ImageReady,
    CollectingPoints,
    ReadyToSubmit,
    Submitting,
    Georeferenced,
}

impl WorkflowState {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowState::Empty => "Empty",
            WorkflowState::ImageLoading => "Image loading",
            WorkflowState::ImageReady => "Image ready",
            WorkflowState::CollectingPoints => "Collecting points",
            WorkflowState::ReadyToSubmit => "Ready to submit",
            WorkflowState::Submitting => "Submitting",
            WorkflowState::Georeferenced => "Georeferenced",
        }
    }
}

/// Completion signal for the image upload.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum UploadState {
    #[default]
    NotStarted,
    InFlight,
    Completed(UploadReceipt),
    Failed(String),
}

/// Where the georeferenced output can be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRef {
    pub url: String,
}

/// Receives points created from viewer clicks.
pub trait PointSink {
    fn add_point(&mut self, pixel_x: f64, pixel_y: f64) -> Result<PointHandle, WorkflowError>;
}

#[derive(Debug, Default)]
pub struct Session {
    store: PointStore,
    image: Option<LoadedImage>,
    upload: UploadState,
    phase: Phase,
    gate_open: bool,
    result: Option<ResultRef>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Image lifecycle
    // ------------------------------------------------------------------

    /// Discard everything tied to the previous image and enter `ImageLoading`.
    pub fn begin_image_load(&mut self) -> Result<(), WorkflowError> {
        self.ensure_not_busy()?;
        self.store.clear();
        self.image = None;
        self.upload = UploadState::NotStarted;
        self.result = None;
        self.phase = Phase::ImageLoading;
        self.refresh_gate();
        Ok(())
    }

    /// Install the decoded image.
    pub fn finish_image_load(&mut self, image: LoadedImage) -> &LoadedImage {
        log::info!(
            "Image '{}' ready ({}x{})",
            image.name,
            image.width,
            image.height
        );
        self.phase = Phase::ImageReady;
        self.image.insert(image)
    }

    /// Give up on a load that could not be decoded.
    pub fn fail_image_load(&mut self) {
        self.phase = Phase::Empty;
    }

    pub fn image(&self) -> Option<&LoadedImage> {
        self.image.as_ref()
    }

    // ------------------------------------------------------------------
    // Upload signal
    // ------------------------------------------------------------------

    pub fn upload_state(&self) -> &UploadState {
        &self.upload
    }

    pub fn mark_upload_started(&mut self) -> Result<&LoadedImage, WorkflowError> {
        let image = self.image.as_ref().ok_or(WorkflowError::NoImage)?;
        self.upload = UploadState::InFlight;
        Ok(image)
    }

    pub fn mark_upload_completed(&mut self, receipt: UploadReceipt) {
        self.upload = UploadState::Completed(receipt);
    }

    pub fn mark_upload_failed(&mut self, message: impl Into<String>) {
        self.upload = UploadState::Failed(message.into());
    }

    // ------------------------------------------------------------------
    // Points
    // ------------------------------------------------------------------

    pub fn subscribe<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&PointChange, &[GroundControlPoint]) + 'static,
    {
        self.store.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.store.unsubscribe(id)
    }

    pub fn update_coordinate(
        &mut self,
        index: usize,
        field: CoordField,
        value: &str,
    ) -> Result<GeoValue, WorkflowError> {
        self.ensure_editable()?;
        let stored = self.store.update_coordinate(index, field, value)?.clone();
        self.after_points_changed();
        Ok(stored)
    }

    pub fn delete_point(&mut self, index: usize) -> Result<GroundControlPoint, WorkflowError> {
        self.ensure_editable()?;
        let removed = self.store.delete_point(index)?;
        self.after_points_changed();
        Ok(removed)
    }

    pub fn points(&self) -> &[GroundControlPoint] {
        self.store.snapshot()
    }

    pub fn point_count(&self) -> usize {
        self.store.count()
    }

    // ------------------------------------------------------------------
    // Gate and state
    // ------------------------------------------------------------------

    /// Cached gate value, recomputed after every point mutation.
    pub fn can_georeference(&self) -> bool {
        self.gate_open
    }

    pub fn gate_report(&self) -> GateReport {
        GateReport::build(self.store.snapshot())
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> WorkflowState {
        match self.phase {
            Phase::Empty => WorkflowState::Empty,
            Phase::ImageLoading => WorkflowState::ImageLoading,
            Phase::ImageReady => WorkflowState::ImageReady,
            Phase::CollectingPoints if self.gate_open => WorkflowState::ReadyToSubmit,
            Phase::CollectingPoints => WorkflowState::CollectingPoints,
            Phase::Submitting => WorkflowState::Submitting,
            Phase::Georeferenced => WorkflowState::Georeferenced,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.phase == Phase::Submitting
    }

    /// The "start georeferencing" action is enabled.
    pub fn can_start_georeferencing(&self) -> bool {
        self.gate_open
            && !self.is_busy()
            && matches!(self.upload, UploadState::Completed(_))
    }

    /// The "download result" action is enabled.
    pub fn can_download(&self) -> bool {
        self.phase == Phase::Georeferenced && self.result.is_some()
    }

    pub fn result(&self) -> Option<&ResultRef> {
        self.result.as_ref()
    }

    // ------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------

    /// Check every precondition and enter `Submitting`.
    ///
    /// Returns the wire form of the points, in store order.
    pub fn begin_submission(&mut self) -> Result<Vec<GcpSubmission>, WorkflowError> {
        if self.image.is_none() {
            return Err(WorkflowError::NoImage);
        }
        self.ensure_not_busy()?;
        if !self.gate_open {
            return Err(WorkflowError::GateClosed(self.gate_report()));
        }
        match &self.upload {
            UploadState::Completed(_) => {}
            UploadState::NotStarted | UploadState::InFlight => {
                return Err(WorkflowError::UploadPending);
            }
            UploadState::Failed(message) => {
                return Err(WorkflowError::UploadFailed(message.clone()));
            }
        }

        // The gate guarantees every point converts.
        let submissions: Vec<GcpSubmission> = self
            .store
            .snapshot()
            .iter()
            .filter_map(GroundControlPoint::to_submission)
            .collect();

        self.phase = Phase::Submitting;
        self.result = None;
        log::debug!("Submitting {} GCPs", submissions.len());
        Ok(submissions)
    }

    pub fn complete_submission(&mut self, result: ResultRef) -> &ResultRef {
        log::info!("Georeferenced result available at {}", result.url);
        self.phase = Phase::Georeferenced;
        self.result.insert(result)
    }

    /// Return to point collection after a failed run. Points stay as they were.
    pub fn abort_submission(&mut self) {
        if self.phase == Phase::Submitting {
            log::debug!("Submission aborted, back to collecting points");
            self.phase = Phase::CollectingPoints;
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn ensure_not_busy(&self) -> Result<(), WorkflowError> {
        if self.is_busy() {
            Err(WorkflowError::Busy)
        } else {
            Ok(())
        }
    }

    fn ensure_editable(&self) -> Result<(), WorkflowError> {
        self.ensure_not_busy()?;
        match self.phase {
            Phase::Empty | Phase::ImageLoading => Err(WorkflowError::NoImage),
            _ => Ok(()),
        }
    }

    fn after_points_changed(&mut self) {
        match self.phase {
            Phase::ImageReady => self.phase = Phase::CollectingPoints,
            Phase::Georeferenced => {
                log::info!("Points edited after georeferencing, result discarded");
                self.result = None;
                self.phase = Phase::CollectingPoints;
            }
            _ => {}
        }
        self.refresh_gate();
    }

    fn refresh_gate(&mut self) {
        let open = can_georeference(self.store.snapshot());
        if open != self.gate_open {
            log::debug!(
                "Georeference action {}",
                if open { "enabled" } else { "disabled" }
            );
        }
        self.gate_open = open;
    }
}

impl PointSink for Session {
    fn add_point(&mut self, pixel_x: f64, pixel_y: f64) -> Result<PointHandle, WorkflowError> {
        self.ensure_editable()?;
        let handle = self.store.add_point(pixel_x, pixel_y);
        self.after_points_changed();
        Ok(handle)
    }
}
