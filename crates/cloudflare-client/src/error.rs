//! Cloudflare client errors

use thiserror::Error;

/// Errors that can occur when interacting with the Cloudflare API
#[derive(Debug, Error)]
pub enum CloudflareError {
    /// HTTP request/response error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Cloudflare API returned `success: false` or a non-2xx status
    #[error("Cloudflare API error: {0}")]
    Api(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Authentication failed (invalid key, token or email)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// No zone with the given name is visible to the credentials
    #[error("Zone not found: {0}")]
    ZoneNotFound(String),

    /// Invalid client configuration (e.g. header values that cannot be encoded)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
