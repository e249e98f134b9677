//! Read-only views of Ingress resources taken at reconcile time.

use crate::error::ControllerError;
use crate::key::ResourceKey;
use k8s_openapi::api::core::v1::ObjectReference;
use k8s_openapi::api::networking::v1::Ingress;
use kube::Resource;
use kube_runtime::reflector::{ObjectRef, Store};
use std::collections::BTreeMap;

/// The parts of an Ingress the reconciler reads
#[derive(Debug, Clone, PartialEq)]
pub struct IngressSnapshot {
    pub key: ResourceKey,
    pub annotations: BTreeMap<String, String>,
    /// Hosts of the Ingress rules in declaration order; rules without a host are skipped
    pub rule_hosts: Vec<String>,
    /// Object the reconcile's events are attached to
    pub reference: ObjectReference,
}

impl IngressSnapshot {
    pub fn from_ingress(key: ResourceKey, ingress: &Ingress) -> Self {
        let rule_hosts = ingress
            .spec
            .as_ref()
            .and_then(|spec| spec.rules.as_ref())
            .map(|rules| {
                rules
                    .iter()
                    .filter_map(|rule| rule.host.as_deref())
                    .filter(|host| !host.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            annotations: ingress.metadata.annotations.clone().unwrap_or_default(),
            rule_hosts,
            reference: ingress.object_ref(&()),
            key,
        }
    }
}

/// Where the reconciler reads current resource state from
#[async_trait::async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Current state of the resource, or `None` if it no longer exists
    async fn fetch(&self, key: &ResourceKey) -> Result<Option<IngressSnapshot>, ControllerError>;
}

#[async_trait::async_trait]
impl SnapshotSource for Store<Ingress> {
    async fn fetch(&self, key: &ResourceKey) -> Result<Option<IngressSnapshot>, ControllerError> {
        let mut object_ref = ObjectRef::<Ingress>::new(&key.name);
        if let Some(namespace) = &key.namespace {
            object_ref = object_ref.within(namespace);
        }
        Ok(self
            .get(&object_ref)
            .map(|ingress| IngressSnapshot::from_ingress(key.clone(), &ingress)))
    }
}
