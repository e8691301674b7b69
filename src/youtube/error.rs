//! Error raised when a call to the YouTube Data API fails.

use thiserror::Error;

/// Any failed upstream call: network error, non-success status or a body
/// that does not have the expected shape.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("upstream call failed: {0}")]
pub struct UpstreamError(pub String);

impl UpstreamError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        Self(e.to_string())
    }
}

impl From<anyhow::Error> for UpstreamError {
    fn from(e: anyhow::Error) -> Self {
        Self(format!("{e:#}"))
    }
}
