use serde_json::Value;
use thiserror::Error;

use super::ProviderId;

/// Result alias for upstream gateway calls.
pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// Failure of a call to an upstream metadata provider.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The provider answered with a non-2xx status; `body` is its error payload.
    #[error("{provider} answered with status {status}")]
    Status {
        provider: ProviderId,
        status: u16,
        body: Value,
    },
    #[error("{provider} did not answer in time")]
    Timeout { provider: ProviderId },
    #[error("{provider} is unreachable")]
    Unreachable {
        provider: ProviderId,
        #[source]
        source: reqwest::Error,
    },
    /// A 2xx body that does not match the expected shape.
    #[error("failed to decode {provider} response: {message}")]
    Decode {
        provider: ProviderId,
        message: String,
    },
    #[error("{provider} has no {resource} `{id}`")]
    NotFound {
        provider: ProviderId,
        resource: &'static str,
        id: String,
    },
    #[error("invalid {provider} request: {message}")]
    InvalidRequest {
        provider: ProviderId,
        message: String,
    },
    #[error("failed to build {provider} HTTP client")]
    Client {
        provider: ProviderId,
        #[source]
        source: reqwest::Error,
    },
}

impl UpstreamError {
    /// Transient failures worth another attempt on idempotent calls.
    pub fn is_retryable(&self) -> bool {
        match self {
            UpstreamError::Timeout { .. } | UpstreamError::Unreachable { .. } => true,
            UpstreamError::Status { status, .. } => matches!(status, 429 | 502 | 503 | 504),
            _ => false,
        }
    }
}
