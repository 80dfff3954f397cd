//! The service boundary as seen by the workflow.

use std::future::Future;

use serde::Serialize;

use crate::error::Result;

/// One ground control point in wire form.
///
/// Only fully valid points are ever turned into a submission, so all four
/// fields are plain finite floats here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GcpSubmission {
    /// Pixel column in the source image
    pub x: f64,
    /// Pixel row in the source image
    pub y: f64,
    /// Longitude in degrees
    pub lon: f64,
    /// Latitude in degrees
    pub lat: f64,
}

/// Raw image handed to the upload call.
#[derive(Debug, Clone, Copy)]
pub struct ImagePayload<'a> {
    pub file_name: &'a str,
    pub mime_type: &'a str,
    pub bytes: &'a [u8],
}

/// Response to a successful upload.
///
/// The service answers with a JSON document naming the stored resource. The
/// workflow only needs to know the upload happened, so the body is kept as is.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadReceipt {
    pub response: serde_json::Value,
}

/// Acknowledgement of an add-GCP or georeference call.
#[derive(Debug, Clone, PartialEq)]
pub struct Ack {
    pub response: serde_json::Value,
}

impl Ack {
    /// An acknowledgement with an empty JSON object body.
    pub fn empty() -> Self {
        Self {
            response: serde_json::Value::Object(Default::default()),
        }
    }
}

/// Remote georeferencing service.
///
/// Implementations are driven from a single task and each call is awaited to
/// completion before the next one is issued.
pub trait GeorefService {
    /// Upload the source raster.
    fn upload_image(&self, image: ImagePayload<'_>) -> impl Future<Output = Result<UploadReceipt>>;

    /// Add one GCP to the service's accumulator.
    fn add_gcp(&self, gcp: &GcpSubmission) -> impl Future<Output = Result<Ack>>;

    /// Fit the transform over every GCP accumulated so far and warp the image.
    fn georeference(&self) -> impl Future<Output = Result<Ack>>;

    /// Fetch the warped result image.
    fn fetch_result(&self) -> impl Future<Output = Result<Vec<u8>>>;

    /// Address of the result, for components that load it themselves.
    fn result_url(&self) -> String;
}
