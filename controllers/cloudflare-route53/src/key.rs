//! Reconcile keys and change events.

use k8s_openapi::api::networking::v1::Ingress;
use kube::ResourceExt;
use std::fmt;

/// Identifies one Ingress as `namespace/name` (or just `name` when cluster-scoped)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    pub namespace: Option<String>,
    pub name: String,
}

impl ResourceKey {
    pub fn new(namespace: Option<&str>, name: &str) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            name: name.to_string(),
        }
    }

    /// Key of an Ingress object. Objects without a name have no key.
    pub fn from_ingress(ingress: &Ingress) -> Option<Self> {
        let name = ingress.metadata.name.as_deref()?;
        Some(Self::new(ingress.namespace().as_deref(), name))
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{}/{}", namespace, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Notification that an Ingress needs reconciling.
///
/// Deletions are not represented; nothing is cleaned up when an Ingress goes away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Added(ResourceKey),
    Updated(ResourceKey),
}

impl ChangeEvent {
    pub fn key(&self) -> &ResourceKey {
        match self {
            ChangeEvent::Added(key) | ChangeEvent::Updated(key) => key,
        }
    }

    /// Metric label for the variant
    pub fn kind(&self) -> &'static str {
        match self {
            ChangeEvent::Added(_) => "added",
            ChangeEvent::Updated(_) => "updated",
        }
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.key())
    }
}
