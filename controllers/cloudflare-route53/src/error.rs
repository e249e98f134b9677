//! Controller-specific error types.
//!
//! Errors returned from a reconcile are precondition failures: they abort the
//! reconcile for that key and requeue it. Per-host provider failures never
//! surface here; they are folded into the sync outcome instead.

use cloudflare_client::CloudflareError;
use kube::Error as KubeError;
use route53_client::Route53Error;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur in the Cloudflare/Route53 controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// Cloudflare API error
    #[error("Cloudflare error: {0}")]
    Cloudflare(#[from] CloudflareError),

    /// Route53 API error
    #[error("Route53 error: {0}")]
    Route53(#[from] Route53Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A provider call did not complete in time
    #[error("{operation} timed out after {after:?}")]
    Timeout { operation: String, after: Duration },

    /// Metrics registry error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Probe/metrics listener error
    #[error("HTTP server error: {0}")]
    Server(#[from] std::io::Error),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),
}
