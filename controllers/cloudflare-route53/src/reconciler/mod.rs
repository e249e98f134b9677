//! Reconciliation of Ingress annotations into Route53 and Cloudflare records.
//!
//! - `policy`: annotation parsing into a [`SyncPolicy`]
//! - `hosts`: expansion of a policy into a [`HostSet`]
//! - `upsert`: per-host, per-provider upserts
//! - `outcome`: results and the events reporting them

pub mod hosts;
pub mod outcome;
pub mod policy;
pub mod upsert;


use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::key::ResourceKey;
use crate::recorder::EventReporter;
use crate::snapshot::SnapshotSource;
use cloudflare_client::CloudflareClientTrait;
use hosts::HostSet;
use outcome::{synced_event, SyncOutcome};
use policy::{extract_policy, SyncPolicy};
use route53_client::Route53ClientTrait;
use std::sync::Arc;
use tracing::{debug, info, warn};
use upsert::DnsUpserter;

pub use outcome::Provider;

/// How a reconcile ended for its key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Done; the key's backoff is forgotten
    Succeeded,
    /// At least one upsert failed; the key goes back with backoff
    Requeued(SyncOutcome),
}

/// Drives one reconcile per triggered key
pub struct Reconciler {
    annotation_prefix: String,
    cloudflare_zone_name: String,
    enable_additional_hosts: bool,
    source: Arc<dyn SnapshotSource>,
    reporter: Arc<dyn EventReporter>,
    cloudflare: Arc<dyn CloudflareClientTrait>,
    upserter: DnsUpserter,
}

impl Reconciler {
    pub fn new(
        config: &ControllerConfig,
        source: Arc<dyn SnapshotSource>,
        reporter: Arc<dyn EventReporter>,
        route53: Arc<dyn Route53ClientTrait>,
        cloudflare: Arc<dyn CloudflareClientTrait>,
    ) -> Self {
        Self {
            annotation_prefix: config.annotation_prefix.clone(),
            cloudflare_zone_name: config.cloudflare_zone_name.clone(),
            enable_additional_hosts: config.enable_additional_hosts,
            source,
            reporter,
            upserter: DnsUpserter::new(
                route53,
                Arc::clone(&cloudflare),
                config.hosted_zone_id.clone(),
                config.provider_timeout,
            ),
            cloudflare,
        }
    }

    /// Reconcile one Ingress.
    ///
    /// # Returns
    /// * `Ok(Disposition::Succeeded)` - Synced, not opted in, or gone
    /// * `Ok(Disposition::Requeued(_))` - Some (host, provider) upserts failed
    /// * `Err(_)` - The reconcile could not start (snapshot fetch, zone lookup)
    pub async fn reconcile(&self, key: &ResourceKey) -> Result<Disposition, ControllerError> {
        let Some(snapshot) = self.source.fetch(key).await? else {
            debug!("Ingress {} no longer exists, nothing to do", key);
            return Ok(Disposition::Succeeded);
        };

        let Some(policy) = extract_policy(&snapshot.annotations, &self.annotation_prefix) else {
            debug!("Ingress {} is not annotated for Cloudflare, skipping", key);
            return Ok(Disposition::Succeeded);
        };

        if policy.targets_origin() {
            info!(
                "Ingress {}: record target {} equals the origin host, skipping",
                key, policy.record_target
            );
            return Ok(Disposition::Succeeded);
        }

        let zone_id = self
            .upserter
            .bounded(
                &format!("Cloudflare zone lookup of {}", self.cloudflare_zone_name),
                self.cloudflare.zone_id_by_name(&self.cloudflare_zone_name),
            )
            .await?;

        let hosts = self.hosts_for(&policy, &snapshot.rule_hosts);
        info!("Syncing {} host(s) for ingress {} -> {}", hosts.len(), key, policy.origin_host);

        let outcome = self
            .upserter
            .upsert_all(&hosts, &policy.origin_host, &zone_id, &snapshot.reference, self.reporter.as_ref())
            .await;

        if outcome.failed() {
            warn!("Ingress {}: {} upsert(s) failed", key, outcome.failures.len());
            return Ok(Disposition::Requeued(outcome));
        }

        self.reporter.report(&snapshot.reference, synced_event(&snapshot.key)).await;
        info!("Cloudflare and Route53 records for ingress {} have been synced", key);
        Ok(Disposition::Succeeded)
    }

    fn hosts_for(&self, policy: &SyncPolicy, rule_hosts: &[String]) -> HostSet {
        HostSet::resolve(policy, rule_hosts, self.enable_additional_hosts)
    }
}
