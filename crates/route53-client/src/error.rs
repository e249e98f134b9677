//! Route53 client errors

use thiserror::Error;

/// Errors that can occur when submitting Route53 changes
#[derive(Debug, Error)]
pub enum Route53Error {
    /// The change request could not be assembled (missing required field)
    #[error("Invalid change request: {0}")]
    InvalidRequest(String),

    /// The hosted zone does not exist or is not visible to the credentials
    #[error("Hosted zone not found: {0}")]
    NoSuchHostedZone(String),

    /// Route53 rejected the change or the request failed in transit
    #[error("Route53 API error: {0}")]
    Api(String),
}
