//! Source failure taxonomy.

use thiserror::Error;

/// Errors a vendor fetch can produce. All of them are contained: the
/// affected source contributes zero records and the run continues.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network-level failure reaching the endpoint.
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// Endpoint answered with a non-2xx status.
    #[error("unexpected status {0}")]
    Status(u16),

    /// Body was not JSON or lacked the expected `data` field.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Request exceeded the per-adapter timeout.
    #[error("request timed out")]
    Timeout,
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else {
            SourceError::Unavailable(err.to_string())
        }
    }
}
