//! Client side of the remote georeferencing service.
//!
//! The service accumulates ground control points as server-side state, fits a
//! transform once asked to, and serves the warped result. This crate exposes
//! that boundary as the [`GeorefService`] trait plus an HTTP implementation.

pub mod config;
pub mod error;
pub mod http;
pub mod service;

#[cfg(test)]
mod test_server;

pub use config::{Endpoint, EndpointPaths, ServiceConfig};
pub use error::{Result, ServiceError};
pub use http::HttpGeorefService;
pub use service::{Ack, GcpSubmission, GeorefService, ImagePayload, UploadReceipt};
