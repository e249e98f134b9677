//! Route53 Record Set Client
//!
//! Thin wrapper over `aws-sdk-route53` exposing the one operation the
//! ingress controller performs: an UPSERT of a single CNAME record set.
//!
//! # Example
//!
//! ```no_run
//! use route53_client::{CnameRecord, Route53Client};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Route53Client::from_env(std::time::Duration::from_secs(30)).await;
//! let record = CnameRecord::new("api.example.com", "api.example.com.cdn.cloudflare.net", 60);
//! client.upsert_cname("Z0123456789", &record).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod route53_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::Route53Client;
pub use error::Route53Error;
pub use models::*;
pub use route53_trait::Route53ClientTrait;
#[cfg(any(test, feature = "test-util"))]
pub use mock::{MockRoute53Client, Route53Call};
