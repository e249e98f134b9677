//! Ingress watching.
//!
//! A `kube_runtime` watcher feeds the reflector store the reconciler reads
//! snapshots from, and the same stream becomes the controller's trigger.
//! Objects from a (re)list are held back until `InitDone`, because the
//! reflector only publishes them to the store at that point.

use crate::key::{ChangeEvent, ResourceKey};
use crate::metrics::Metrics;
use futures::{stream, Stream, TryStreamExt};
use k8s_openapi::api::networking::v1::Ingress;
use kube_runtime::reflector::store::Writer;
use kube_runtime::{watcher, WatchStreamExt};
use std::time::Duration;
use tracing::{debug, info};

/// Map a watch event to a change event.
///
/// Objects seen during the initial list are `Added`, later applies are
/// `Updated`. Deletions and list boundaries produce nothing.
pub fn to_change_event(event: &watcher::Event<Ingress>) -> Option<ChangeEvent> {
    match event {
        watcher::Event::InitApply(ingress) => ResourceKey::from_ingress(ingress).map(ChangeEvent::Added),
        watcher::Event::Apply(ingress) => ResourceKey::from_ingress(ingress).map(ChangeEvent::Updated),
        watcher::Event::Delete(_) | watcher::Event::Init | watcher::Event::InitDone => None,
    }
}

/// Holds objects from a relist until the reflector has swapped them into
/// its store.
#[derive(Debug, Default)]
pub struct RelistBuffer {
    pending: Vec<Ingress>,
}

impl RelistBuffer {
    /// Feed one watch event, returning the objects that are ready to be
    /// reconciled.
    pub fn accept(&mut self, event: watcher::Event<Ingress>) -> Vec<Ingress> {
        match event {
            watcher::Event::Init => {
                self.pending.clear();
                Vec::new()
            }
            watcher::Event::InitApply(ingress) => {
                self.pending.push(ingress);
                Vec::new()
            }
            watcher::Event::InitDone => std::mem::take(&mut self.pending),
            watcher::Event::Apply(ingress) => vec![ingress],
            watcher::Event::Delete(_) => Vec::new(),
        }
    }
}

/// Reflect `events` into `writer` and yield every Ingress that needs a
/// reconcile, once the store holds it.
pub fn trigger_stream<S>(
    events: S,
    writer: Writer<Ingress>,
    metrics: Metrics,
) -> impl Stream<Item = Result<Ingress, watcher::Error>> + Send + 'static
where
    S: Stream<Item = Result<watcher::Event<Ingress>, watcher::Error>> + Send + 'static,
{
    let mut relist = RelistBuffer::default();

    events
        .reflect(writer)
        .map_ok(move |event| {
            match &event {
                watcher::Event::Init => debug!("Ingress watcher (re)listing"),
                watcher::Event::InitDone => info!("Ingress watcher initialization complete"),
                watcher::Event::Delete(ingress) => {
                    debug!("Ingress deleted: {}", ingress.metadata.name.as_deref().unwrap_or("<unknown>"));
                }
                watcher::Event::InitApply(_) | watcher::Event::Apply(_) => {}
            }

            if let Some(change) = to_change_event(&event) {
                debug!("Ingress change: {}", change);
                metrics.record_change(&change);
            }

            stream::iter(relist.accept(event).into_iter().map(Ok::<_, watcher::Error>))
        })
        .try_flatten()
}

/// Ticks once per `interval` (the first tick after one full interval).
///
/// The sender side runs on its own task; abort the returned handle to stop it.
pub fn resync_ticks(interval: Duration) -> (impl Stream<Item = ()> + Send + Sync + 'static, tokio::task::JoinHandle<()>) {
    let (mut tx, rx) = futures::channel::mpsc::channel::<()>(0);

    let ticker = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // first tick fires immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            debug!("Resync tick");
            if tx.try_send(()).is_err() && tx.is_closed() {
                break;
            }
        }
    });

    (rx, ticker)
}
