use thiserror::Error;

use crate::config::Endpoint;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: Endpoint,
        status: u16,
        body: String,
    },

    /// The request could not be built, so nothing was sent.
    #[error("Invalid {endpoint} request: {source}")]
    InvalidRequest {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode {endpoint} response: {message}")]
    Decode { endpoint: Endpoint, message: String },

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl ServiceError {
    /// Endpoint the failing request was addressed to, if any.
    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            ServiceError::Transport { endpoint, .. }
            | ServiceError::Status { endpoint, .. }
            | ServiceError::InvalidRequest { endpoint, .. }
            | ServiceError::Decode { endpoint, .. } => Some(*endpoint),
            ServiceError::ClientBuild(_) => None,
        }
    }

    /// Create a non-success status error.
    pub fn status(endpoint: Endpoint, status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            endpoint,
            status,
            body: body.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
