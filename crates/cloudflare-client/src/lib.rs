//! Cloudflare DNS API Client
//!
//! A Rust client for the parts of the Cloudflare v4 REST API the ingress
//! controller needs: zone lookup by name and CNAME record list/create/update.
//!
//! # Example
//!
//! ```no_run
//! use cloudflare_client::{CloudflareAuth, CloudflareClient, DnsRecordFilter, DnsRecordRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = CloudflareClient::new(
//!     cloudflare_client::CLOUDFLARE_API_BASE.to_string(),
//!     CloudflareAuth::ApiToken("your-api-token".to_string()),
//!     std::time::Duration::from_secs(30),
//! )?;
//!
//! let zone_id = client.zone_id_by_name("example.com").await?;
//! let existing = client
//!     .list_dns_records(&zone_id, &DnsRecordFilter::cname("api.example.com"))
//!     .await?;
//!
//! let request = DnsRecordRequest::proxied_cname("api.example.com", "origin.example.com");
//! match existing.first() {
//!     Some(record) => { client.update_dns_record(&zone_id, &record.id, &request).await?; }
//!     None => { client.create_dns_record(&zone_id, &request).await?; }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Zone lookup**: resolve a zone name to its identifier
//! - **Record filtering**: list records by name and type, fetching all pages
//! - **Authentication**: global API key + email, or scoped API token
//! - **Mocking**: `MockCloudflareClient` behind the `test-util` feature

pub mod client;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod cloudflare_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::{CloudflareAuth, CloudflareClient, CLOUDFLARE_API_BASE};
pub use error::CloudflareError;
pub use models::*;
pub use cloudflare_trait::CloudflareClientTrait;
#[cfg(any(test, feature = "test-util"))]
pub use mock::{CloudflareCall, MockCloudflareClient};
