//! Per-host upserts against Route53 and Cloudflare.

use super::hosts::HostSet;
use super::outcome::{failure_event, HostFailure, Provider, SyncOutcome};
use crate::error::ControllerError;
use crate::recorder::EventReporter;
use cloudflare_client::{CloudflareClientTrait, DnsRecordFilter, DnsRecordRequest, CNAME, TTL_AUTO};
use k8s_openapi::api::core::v1::ObjectReference;
use route53_client::{CnameRecord, Route53ClientTrait};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Suffix of the Cloudflare CDN name every Route53 record points at
pub const CLOUDFLARE_CDN_SUFFIX: &str = "cdn.cloudflare.net";

/// TTL of the Route53 records
pub const ROUTE53_TTL: i64 = 60;

/// Desired state of one record in one provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRecordDescriptor {
    pub name: String,
    pub record_type: &'static str,
    pub value: String,
    pub ttl: i64,
    pub proxied: bool,
}

impl ProviderRecordDescriptor {
    /// `host` -> `{host}.cdn.cloudflare.net`, TTL 60
    pub fn route53(host: &str) -> Self {
        Self {
            name: host.to_string(),
            record_type: CNAME,
            value: format!("{}.{}", host, CLOUDFLARE_CDN_SUFFIX),
            ttl: ROUTE53_TTL,
            proxied: false,
        }
    }

    /// `host` -> origin, proxied, automatic TTL
    pub fn cloudflare(host: &str, origin_host: &str) -> Self {
        Self {
            name: host.to_string(),
            record_type: CNAME,
            value: origin_host.to_string(),
            ttl: i64::from(TTL_AUTO),
            proxied: true,
        }
    }

    fn to_route53(&self) -> CnameRecord {
        CnameRecord::new(&self.name, &self.value, self.ttl)
    }

    fn to_cloudflare(&self) -> DnsRecordRequest {
        DnsRecordRequest {
            record_type: self.record_type.to_string(),
            name: self.name.clone(),
            content: self.value.clone(),
            ttl: u32::try_from(self.ttl).unwrap_or(TTL_AUTO),
            proxied: self.proxied,
        }
    }
}

/// Pushes a host set to both providers
pub struct DnsUpserter {
    route53: Arc<dyn Route53ClientTrait>,
    cloudflare: Arc<dyn CloudflareClientTrait>,
    hosted_zone_id: String,
    timeout: Duration,
}

impl DnsUpserter {
    pub fn new(
        route53: Arc<dyn Route53ClientTrait>,
        cloudflare: Arc<dyn CloudflareClientTrait>,
        hosted_zone_id: String,
        timeout: Duration,
    ) -> Self {
        Self {
            route53,
            cloudflare,
            hosted_zone_id,
            timeout,
        }
    }

    /// Run `call` under the provider timeout
    pub(crate) async fn bounded<T, E, F>(&self, operation: &str, call: F) -> Result<T, ControllerError>
    where
        F: Future<Output = Result<T, E>>,
        ControllerError: From<E>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(ControllerError::from),
            Err(_) => Err(ControllerError::Timeout {
                operation: operation.to_string(),
                after: self.timeout,
            }),
        }
    }

    /// Upsert every host, Route53 first and then Cloudflare, one host at a time.
    ///
    /// Failures never stop the loop. Each one is reported on `reference` as it
    /// happens and collected in the returned outcome.
    pub async fn upsert_all(
        &self,
        hosts: &HostSet,
        origin_host: &str,
        cloudflare_zone_id: &str,
        reference: &ObjectReference,
        reporter: &dyn EventReporter,
    ) -> SyncOutcome {
        let mut outcome = SyncOutcome::default();

        for host in hosts.iter() {
            if let Err(e) = self.upsert_route53(host).await {
                warn!("Route53 upsert for {} failed: {}", host, e);
                reporter.report(reference, failure_event(Provider::Route53, host)).await;
                outcome.failures.push(HostFailure {
                    host: host.to_string(),
                    provider: Provider::Route53,
                    error: e.to_string(),
                });
            }

            if let Err(e) = self.upsert_cloudflare(host, origin_host, cloudflare_zone_id).await {
                warn!("Cloudflare upsert for {} failed: {}", host, e);
                reporter.report(reference, failure_event(Provider::Cloudflare, host)).await;
                outcome.failures.push(HostFailure {
                    host: host.to_string(),
                    provider: Provider::Cloudflare,
                    error: e.to_string(),
                });
            }
        }

        outcome
    }

    async fn upsert_route53(&self, host: &str) -> Result<(), ControllerError> {
        let desired = ProviderRecordDescriptor::route53(host).to_route53();
        debug!("Upserting Route53 record {} -> {}", desired.name, desired.value);

        self.bounded(
            &format!("Route53 upsert of {}", host),
            self.route53.upsert_cname(&self.hosted_zone_id, &desired),
        )
        .await?;

        info!("Route53 record {} -> {} upserted", desired.name, desired.value);
        Ok(())
    }

    /// Update the first CNAME named `host`, or create one if there is none
    async fn upsert_cloudflare(&self, host: &str, origin_host: &str, zone_id: &str) -> Result<(), ControllerError> {
        let desired = ProviderRecordDescriptor::cloudflare(host, origin_host).to_cloudflare();

        let existing = self
            .bounded(
                &format!("Cloudflare lookup of {}", host),
                self.cloudflare.list_dns_records(zone_id, &DnsRecordFilter::cname(host)),
            )
            .await?;

        match existing.first() {
            Some(record) => {
                if existing.len() > 1 {
                    debug!("{} CNAME records named {}, updating {}", existing.len(), host, record.id);
                }
                self.bounded(
                    &format!("Cloudflare update of {}", host),
                    self.cloudflare.update_dns_record(zone_id, &record.id, &desired),
                )
                .await?;
                info!("Cloudflare record {} -> {} updated", host, origin_host);
            }
            None => {
                self.bounded(
                    &format!("Cloudflare creation of {}", host),
                    self.cloudflare.create_dns_record(zone_id, &desired),
                )
                .await?;
                info!("Cloudflare record {} -> {} created", host, origin_host);
            }
        }

        Ok(())
    }
}
