//! Route53Client trait for mocking
//!
//! The concrete Route53Client implements this trait; unit tests use
//! `MockRoute53Client` from the `test-util` feature instead.

use crate::error::Route53Error;
use crate::models::CnameRecord;

/// Trait for Route53 record-set operations
#[async_trait::async_trait]
pub trait Route53ClientTrait: Send + Sync {
    /// Create the record set, or replace it if one with the same name and type exists
    async fn upsert_cname(&self, hosted_zone_id: &str, record: &CnameRecord) -> Result<(), Route53Error>;
}
