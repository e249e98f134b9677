//! Route53 API client
//!
//! Submits single-change UPSERT batches through `aws-sdk-route53`.
//! Credentials and region come from the standard AWS provider chain.

use crate::error::Route53Error;
use crate::models::{CnameRecord, normalize_hosted_zone_id};
use crate::route53_trait::Route53ClientTrait;
use aws_config::BehaviorVersion;
use aws_config::timeout::TimeoutConfig;
use aws_sdk_route53::Client;
use aws_sdk_route53::error::DisplayErrorContext;
use aws_sdk_route53::types::{Change, ChangeAction, ChangeBatch, ResourceRecord, ResourceRecordSet, RrType};
use std::time::Duration;
use tracing::debug;

/// Route53 API client
#[derive(Debug, Clone)]
pub struct Route53Client {
    client: Client,
}

impl Route53Client {
    /// Create a client from the default AWS configuration chain
    /// (environment, profile, web identity, IMDS).
    ///
    /// # Arguments
    /// * `timeout` - Upper bound for a whole operation, retries included
    pub async fn from_env(timeout: Duration) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .timeout_config(TimeoutConfig::builder().operation_timeout(timeout).build())
            .load()
            .await;

        Self {
            client: Client::new(&config),
        }
    }

    /// Wrap an already configured SDK client
    pub fn from_sdk_client(client: Client) -> Self {
        Self { client }
    }

    fn upsert_batch(record: &CnameRecord) -> Result<ChangeBatch, Route53Error> {
        let invalid = |e: aws_sdk_route53::error::BuildError| Route53Error::InvalidRequest(e.to_string());

        let resource_record = ResourceRecord::builder()
            .value(&record.value)
            .build()
            .map_err(invalid)?;

        let record_set = ResourceRecordSet::builder()
            .name(&record.name)
            .r#type(RrType::Cname)
            .ttl(record.ttl)
            .resource_records(resource_record)
            .build()
            .map_err(invalid)?;

        let change = Change::builder()
            .action(ChangeAction::Upsert)
            .resource_record_set(record_set)
            .build()
            .map_err(invalid)?;

        ChangeBatch::builder()
            .changes(change)
            .build()
            .map_err(invalid)
    }

    /// Submit an UPSERT for one CNAME record set
    ///
    /// # Arguments
    /// * `hosted_zone_id` - Hosted zone ID, with or without the `/hostedzone/` prefix
    /// * `record` - Desired record set
    pub async fn upsert_cname(&self, hosted_zone_id: &str, record: &CnameRecord) -> Result<(), Route53Error> {
        let zone_id = normalize_hosted_zone_id(hosted_zone_id);
        let batch = Self::upsert_batch(record)?;

        debug!("Submitting Route53 UPSERT {} CNAME {} (ttl {}) in zone {}", record.name, record.value, record.ttl, zone_id);

        let output = self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(zone_id)
            .change_batch(batch)
            .send()
            .await
            .map_err(|e| {
                let no_such_zone = e
                    .as_service_error()
                    .is_some_and(|se| se.is_no_such_hosted_zone());
                if no_such_zone {
                    Route53Error::NoSuchHostedZone(zone_id.to_string())
                } else {
                    Route53Error::Api(DisplayErrorContext(&e).to_string())
                }
            })?;

        debug!("Route53 change accepted: {:?}", output.change_info());
        Ok(())
    }
}

#[async_trait::async_trait]
impl Route53ClientTrait for Route53Client {
    async fn upsert_cname(&self, hosted_zone_id: &str, record: &CnameRecord) -> Result<(), Route53Error> {
        self.upsert_cname(hosted_zone_id, record).await
    }
}
