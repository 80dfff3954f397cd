//! The ordered submit-then-trigger exchange with the service.

use georef_remote::{GcpSubmission, GeorefService};

use crate::error::WorkflowError;
use crate::state::{ResultRef, Session};

/// Send every GCP one at a time, then ask for the transform.
///
/// Each request is awaited before the next one is issued. The first failure
/// stops the sequence; nothing already sent is rolled back.
pub(crate) async fn submit_and_trigger<S: GeorefService>(
    service: &S,
    gcps: &[GcpSubmission],
) -> Result<(), WorkflowError> {
    for (index, gcp) in gcps.iter().enumerate() {
        log::debug!(
            "📍 Sending GCP {}/{}: ({:.2}, {:.2}) -> ({}, {})",
            index + 1,
            gcps.len(),
            gcp.x,
            gcp.y,
            gcp.lon,
            gcp.lat
        );
        service
            .add_gcp(gcp)
            .await
            .map_err(|source| WorkflowError::SubmitGcp { index, source })?;
    }
    log::info!("All {} GCPs accepted, computing transform", gcps.len());

    service.georeference().await.map_err(WorkflowError::Trigger)?;
    Ok(())
}

/// Holds a session in `Submitting`.
///
/// Dropping it without [`SubmissionGuard::complete`] puts the session back to
/// collecting points, which covers both failures and a future that is dropped
/// mid-run.
pub(crate) struct SubmissionGuard<'a> {
    session: &'a mut Session,
    armed: bool,
}

impl<'a> SubmissionGuard<'a> {
    pub(crate) fn new(session: &'a mut Session) -> Self {
        Self {
            session,
            armed: true,
        }
    }

    pub(crate) fn complete(mut self, result: ResultRef) -> ResultRef {
        self.armed = false;
        self.session.complete_submission(result).clone()
    }
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.session.abort_submission();
        }
    }
}
