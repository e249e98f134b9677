//! Test utilities for unit testing the reconciler
//!
//! This module provides helpers for creating test data and in-memory
//! stand-ins for the Kubernetes side of the controller.

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::key::ResourceKey;
use crate::recorder::{EventReporter, ResourceEvent, Severity};
use crate::snapshot::{IngressSnapshot, SnapshotSource};
use k8s_openapi::api::core::v1::ObjectReference;
use k8s_openapi::api::networking::v1::{Ingress, IngressRule, IngressSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use route53_client::{CnameRecord, Route53ClientTrait, Route53Error};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub const TEST_HOSTED_ZONE: &str = "Z0TEST";
pub const TEST_ZONE_NAME: &str = "example.com";
pub const TEST_ZONE_ID: &str = "zone-123";

/// Helper to create a test Ingress
pub fn create_test_ingress(
    namespace: &str,
    name: &str,
    annotations: &[(&str, &str)],
    rule_hosts: &[Option<&str>],
) -> Ingress {
    let rules = rule_hosts
        .iter()
        .map(|host| IngressRule {
            host: host.map(str::to_string),
            ..Default::default()
        })
        .collect();

    Ingress {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            annotations: Some(
                annotations
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            ..Default::default()
        },
        spec: Some(IngressSpec {
            rules: Some(rules),
            ..Default::default()
        }),
        status: None,
    }
}

/// Configuration pointing at the test zones, additional hosts enabled
pub fn test_config() -> ControllerConfig {
    ControllerConfig {
        kubeconfig: None,
        master: None,
        annotation_prefix: "cloudflare.patoarvizu.dev".to_string(),
        hosted_zone_id: TEST_HOSTED_ZONE.to_string(),
        cloudflare_zone_name: TEST_ZONE_NAME.to_string(),
        enable_additional_hosts: true,
        workers: 1,
        resync_interval: Duration::from_secs(30),
        provider_timeout: Duration::from_secs(5),
        backoff_min: Duration::from_millis(10),
        backoff_max: Duration::from_millis(100),
        namespace: None,
        metrics_addr: "127.0.0.1:0".parse().unwrap(),
        cloudflare_api_url: "http://localhost".to_string(),
        cloudflare_token: "test".to_string(),
        cloudflare_email: None,
        instance: None,
    }
}

/// In-memory snapshot source
#[derive(Default)]
pub struct InMemorySource {
    ingresses: Mutex<HashMap<ResourceKey, Ingress>>,
    failing: Mutex<bool>,
}

impl InMemorySource {
    pub fn with(ingresses: Vec<Ingress>) -> Self {
        let source = Self::default();
        for ingress in ingresses {
            source.insert(ingress);
        }
        source
    }

    pub fn insert(&self, ingress: Ingress) {
        let key = ResourceKey::from_ingress(&ingress).unwrap();
        self.ingresses.lock().unwrap().insert(key, ingress);
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }
}

#[async_trait::async_trait]
impl SnapshotSource for InMemorySource {
    async fn fetch(&self, key: &ResourceKey) -> Result<Option<IngressSnapshot>, ControllerError> {
        if *self.failing.lock().unwrap() {
            return Err(ControllerError::Watch(format!("Ingress cache unavailable for {}", key)));
        }
        Ok(self
            .ingresses
            .lock()
            .unwrap()
            .get(key)
            .map(|ingress| IngressSnapshot::from_ingress(key.clone(), ingress)))
    }
}

/// Reporter that keeps every event it is given
#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<(ObjectReference, ResourceEvent)>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<ResourceEvent> {
        self.events.lock().unwrap().iter().map(|(_, e)| e.clone()).collect()
    }

    pub fn references(&self) -> Vec<ObjectReference> {
        self.events.lock().unwrap().iter().map(|(r, _)| r.clone()).collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.severity == Severity::Warning)
            .map(|e| e.note)
            .collect()
    }

    pub fn successes(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| e.severity == Severity::Normal && e.reason == "Synced")
            .count()
    }
}

#[async_trait::async_trait]
impl EventReporter for RecordingReporter {
    async fn report(&self, reference: &ObjectReference, event: ResourceEvent) {
        self.events.lock().unwrap().push((reference.clone(), event));
    }
}

/// Route53 client that never answers in time
pub struct StalledRoute53;

#[async_trait::async_trait]
impl Route53ClientTrait for StalledRoute53 {
    async fn upsert_cname(&self, _hosted_zone_id: &str, _record: &CnameRecord) -> Result<(), Route53Error> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }
}
