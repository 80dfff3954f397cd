//! Configuration structs for the remote service.
//!
//! Defaults match a service running locally on port 8000 with its stock routes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default base URL of the georeferencing service.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// The four calls the service exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// POST the raw image as multipart `file`.
    UploadImage,
    /// POST one GCP as multipart text fields `x`, `y`, `lon`, `lat`.
    AddGcp,
    /// POST with no body; fits the transform over accumulated GCPs.
    Georeference,
    /// GET the warped result image.
    DownloadResult,
}

impl Endpoint {
    /// Short name used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::UploadImage => "upload-image",
            Endpoint::AddGcp => "add-gcp",
            Endpoint::Georeference => "georeference",
            Endpoint::DownloadResult => "download-georeferenced-image",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Route paths, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointPaths {
    #[serde(default = "default_upload_image")]
    pub upload_image: String,
    #[serde(default = "default_add_gcp")]
    pub add_gcp: String,
    #[serde(default = "default_georeference")]
    pub georeference: String,
    #[serde(default = "default_download_result")]
    pub download_result: String,
}

fn default_upload_image() -> String {
    "/upload-image/".to_string()
}

fn default_add_gcp() -> String {
    "/add-gcp/".to_string()
}

fn default_georeference() -> String {
    "/georeference/".to_string()
}

fn default_download_result() -> String {
    "/download-georeferenced-image/".to_string()
}

impl Default for EndpointPaths {
    fn default() -> Self {
        Self {
            upload_image: default_upload_image(),
            add_gcp: default_add_gcp(),
            georeference: default_georeference(),
            download_result: default_download_result(),
        }
    }
}

impl EndpointPaths {
    /// Path configured for an endpoint.
    pub fn path(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::UploadImage => &self.upload_image,
            Endpoint::AddGcp => &self.add_gcp,
            Endpoint::Georeference => &self.georeference,
            Endpoint::DownloadResult => &self.download_result,
        }
    }
}

/// Connection settings for the georeferencing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Scheme, host and port, e.g. `http://127.0.0.1:8000`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Route paths
    #[serde(default)]
    pub endpoints: EndpointPaths,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            endpoints: EndpointPaths::default(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ServiceConfig {
    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Absolute URL for an endpoint.
    ///
    /// Joins base and path with exactly one slash regardless of how either
    /// side is written.
    pub fn url(&self, endpoint: Endpoint) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = self.endpoints.path(endpoint).trim_start_matches('/');
        format!("{}/{}", base, path)
    }
}
