//! Error types for external collaborators

/// Backend call errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Transport failure, timeout, or undecodable body
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// Body decoded but did not match the expected contract
    #[error("unexpected response from {endpoint}: {reason}")]
    Contract { endpoint: String, reason: String },

    /// Rejected before any request was made
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// Operation already running
    #[error("operation already in flight")]
    Busy,
}

impl ServiceError {
    pub(crate) fn blank(field: &'static str) -> Self {
        Self::InvalidInput {
            field,
            reason: "must not be empty".to_string(),
        }
    }
}
