//! The Cloudflare DNS operations the controller depends on.
//!
//! Zone lookup by name, filtered listing, create and update. Reconcilers hold
//! an `Arc<dyn CloudflareClientTrait>`; [`crate::CloudflareClient`] talks to the
//! v4 API and `MockCloudflareClient` keeps records in memory.

use crate::error::CloudflareError;
use crate::models::*;

/// Trait for Cloudflare DNS API operations
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait CloudflareClientTrait: Send + Sync {
    /// Resolve a zone name (e.g. `example.com`) to its zone identifier
    async fn zone_id_by_name(&self, zone_name: &str) -> Result<String, CloudflareError>;

    /// List every record in the zone matching the filter, across all pages
    async fn list_dns_records(&self, zone_id: &str, filter: &DnsRecordFilter) -> Result<Vec<DnsRecord>, CloudflareError>;

    async fn create_dns_record(&self, zone_id: &str, request: &DnsRecordRequest) -> Result<DnsRecord, CloudflareError>;

    async fn update_dns_record(&self, zone_id: &str, record_id: &str, request: &DnsRecordRequest) -> Result<DnsRecord, CloudflareError>;
}
