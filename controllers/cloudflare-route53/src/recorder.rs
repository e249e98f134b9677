//! Kubernetes event reporting.
//!
//! The reconciler only knows [`EventReporter`]; in the cluster events are
//! published through `kube_runtime`'s event [`Recorder`].

use k8s_openapi::api::core::v1::ObjectReference;
use kube::Client;
use kube_runtime::events::{Event, EventType, Recorder, Reporter};
use tracing::{debug, warn};

/// Reporting component name attached to every published event
pub const CONTROLLER_NAME: &str = "cloudflare-route53-controller";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Normal,
    Warning,
}

/// An event to attach to a resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEvent {
    pub severity: Severity,
    pub reason: String,
    pub note: String,
    pub action: String,
}

/// Sink for resource events.
///
/// Reporting is best effort: implementations log their own failures.
#[async_trait::async_trait]
pub trait EventReporter: Send + Sync {
    async fn report(&self, reference: &ObjectReference, event: ResourceEvent);
}

/// Publishes events to the Kubernetes API
pub struct KubeEventReporter {
    recorder: Recorder,
}

impl KubeEventReporter {
    /// # Arguments
    /// * `client` - Kubernetes client
    /// * `instance` - Reporting instance, normally the pod name
    pub fn new(client: Client, instance: Option<String>) -> Self {
        let reporter = Reporter {
            controller: CONTROLLER_NAME.to_string(),
            instance,
        };
        Self {
            recorder: Recorder::new(client, reporter),
        }
    }
}

#[async_trait::async_trait]
impl EventReporter for KubeEventReporter {
    async fn report(&self, reference: &ObjectReference, event: ResourceEvent) {
        debug!("Publishing {:?} event {} on {:?}", event.severity, event.reason, reference.name);

        let type_ = match event.severity {
            Severity::Normal => EventType::Normal,
            Severity::Warning => EventType::Warning,
        };
        let kube_event = Event {
            type_,
            reason: event.reason,
            note: Some(event.note),
            action: event.action,
            secondary: None,
        };

        if let Err(e) = self.recorder.publish(&kube_event, reference).await {
            warn!(
                "Failed to publish event {} for {}: {}",
                kube_event.reason,
                reference.name.as_deref().unwrap_or("<unknown>"),
                e
            );
        }
    }
}
