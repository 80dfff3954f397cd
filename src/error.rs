//! Error types for workflow operations.

use georef_remote::ServiceError;
use thiserror::Error;

use crate::model::{GateReport, StoreError};
use crate::state::ImageLoadError;

/// Errors surfaced by the georeferencing workflow.
///
/// None of these are fatal: each leaves the session in a state from which the
/// user can retry or keep editing.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Point or upload operation attempted before an image was loaded
    #[error("No image loaded")]
    NoImage,

    /// A georeferencing run is in flight
    #[error("Georeferencing is already in progress")]
    Busy,

    /// Not enough complete points
    #[error("Not ready to georeference: {0}")]
    GateClosed(GateReport),

    /// The image upload has not finished yet
    #[error("Image upload has not completed yet")]
    UploadPending,

    /// The image upload failed and must be retried first
    #[error("Image upload failed ({0}), upload the image again before georeferencing")]
    UploadFailed(String),

    /// Download requested without a successful run
    #[error("No georeferenced result available")]
    NoResult,

    /// Point store rejected the operation
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Image bytes could not be loaded
    #[error(transparent)]
    Image(#[from] ImageLoadError),

    /// Uploading the source image failed
    #[error("Failed to upload image: {0}")]
    Upload(#[source] ServiceError),

    /// Submitting a GCP failed; later points were not sent
    #[error("Failed to add ground control point {}: {source}", .index + 1)]
    SubmitGcp {
        /// Zero-based store index of the point that failed
        index: usize,
        #[source]
        source: ServiceError,
    },

    /// The transform trigger failed
    #[error("Failed to georeference image: {0}")]
    Trigger(#[source] ServiceError),

    /// Fetching the result failed
    #[error("Failed to download georeferenced image: {0}")]
    Download(#[source] ServiceError),
}

impl WorkflowError {
    /// Whether this came from the network rather than local state.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            WorkflowError::Upload(_)
                | WorkflowError::SubmitGcp { .. }
                | WorkflowError::Trigger(_)
                | WorkflowError::Download(_)
        )
    }
}
