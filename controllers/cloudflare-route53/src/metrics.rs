//! Prometheus metrics for the controller.
//!
//! All metrics carry the `cloudflare_route53_controller_` prefix and live in
//! the controller's own [`Registry`], exposed on `/metrics`.

use crate::key::ChangeEvent;
use crate::reconciler::Provider;
use prometheus::{
    CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

const METRICS_NAMESPACE: &str = "cloudflare_route53_controller";

/// Reconcile result labels
pub const RESULT_SUCCESS: &str = "success";
pub const RESULT_REQUEUE: &str = "requeue";
pub const RESULT_ERROR: &str = "error";

/// Controller metrics
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    /// Labels: `result` (`success`, `requeue`, `error`)
    reconciliations_total: CounterVec,
    /// Labels: `provider` (`route53`, `cloudflare`)
    provider_failures_total: CounterVec,
    /// Labels: `result`
    reconcile_duration_seconds: HistogramVec,
    /// Labels: `kind` (`added`, `updated`)
    ingress_events_total: CounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let reconciliations_total = CounterVec::new(
            Opts::new(
                format!("{METRICS_NAMESPACE}_reconciliations_total"),
                "Total number of Ingress reconciliations by result",
            ),
            &["result"],
        )?;
        let provider_failures_total = CounterVec::new(
            Opts::new(
                format!("{METRICS_NAMESPACE}_provider_failures_total"),
                "Total number of failed record upserts by DNS provider",
            ),
            &["provider"],
        )?;
        let reconcile_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                format!("{METRICS_NAMESPACE}_reconcile_duration_seconds"),
                "Duration of Ingress reconciliations in seconds",
            )
            .buckets(vec![0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]),
            &["result"],
        )?;
        let ingress_events_total = CounterVec::new(
            Opts::new(
                format!("{METRICS_NAMESPACE}_ingress_events_total"),
                "Total number of Ingress change events seen by the watcher",
            ),
            &["kind"],
        )?;

        registry.register(Box::new(reconciliations_total.clone()))?;
        registry.register(Box::new(provider_failures_total.clone()))?;
        registry.register(Box::new(reconcile_duration_seconds.clone()))?;
        registry.register(Box::new(ingress_events_total.clone()))?;

        Ok(Self {
            registry,
            reconciliations_total,
            provider_failures_total,
            reconcile_duration_seconds,
            ingress_events_total,
        })
    }

    pub fn record_reconciliation(&self, result: &str, duration: Duration) {
        self.reconciliations_total.with_label_values(&[result]).inc();
        self.reconcile_duration_seconds
            .with_label_values(&[result])
            .observe(duration.as_secs_f64());
    }

    pub fn record_provider_failure(&self, provider: Provider) {
        self.provider_failures_total
            .with_label_values(&[provider.as_str()])
            .inc();
    }

    pub fn record_change(&self, change: &ChangeEvent) {
        self.ingress_events_total
            .with_label_values(&[change.kind()])
            .inc();
    }

    /// Gather and encode all metrics in Prometheus text format
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
    }
}
