//! Main controller implementation.
//!
//! This module contains the `Controller` struct that hands the Ingress
//! trigger stream to a `kube_runtime::Controller` and serves the probes.
//! The runtime controller collapses duplicate triggers, never runs one key
//! twice at the same time, and caps concurrency at the configured worker count.

use crate::backoff::RequeueBackoffs;
use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::key::ResourceKey;
use crate::metrics::{Metrics, RESULT_ERROR, RESULT_REQUEUE, RESULT_SUCCESS};
use crate::reconciler::{Disposition, Reconciler};
use crate::recorder::KubeEventReporter;
use crate::server;
use crate::watcher::{resync_ticks, trigger_stream};
use cloudflare_client::CloudflareClient;
use futures::StreamExt;
use k8s_openapi::api::networking::v1::Ingress;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client};
use kube_runtime::controller::{self, Action, Config as RuntimeConfig};
use kube_runtime::reflector::{self, store::Writer, Store};
use kube_runtime::{watcher as kube_watcher, Controller as RuntimeController, WatchStreamExt};
use route53_client::Route53Client;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Shared state handed to every reconcile
pub(crate) struct Context {
    reconciler: Reconciler,
    metrics: Metrics,
    backoffs: RequeueBackoffs,
}

impl Context {
    pub(crate) fn new(config: &ControllerConfig, reconciler: Reconciler, metrics: Metrics) -> Self {
        Self {
            reconciler,
            metrics,
            backoffs: RequeueBackoffs::new(config.backoff_min, config.backoff_max),
        }
    }
}

/// Main controller for Cloudflare/Route53 Ingress records.
pub struct Controller {
    config: ControllerConfig,
    ingress_api: Api<Ingress>,
    store: Store<Ingress>,
    writer: Writer<Ingress>,
    context: Arc<Context>,
}

impl Controller {
    /// Creates a new controller instance.
    pub async fn new(config: ControllerConfig) -> Result<Self, ControllerError> {
        info!("Initializing Cloudflare/Route53 controller");

        let kube_client = kube_client(&config).await?;

        let ingress_api: Api<Ingress> = match &config.namespace {
            Some(ns) => Api::namespaced(kube_client.clone(), ns),
            None => Api::all(kube_client.clone()),
        };

        // Provider clients are shared by every reconcile
        let cloudflare = Arc::new(CloudflareClient::new(
            config.cloudflare_api_url.clone(),
            config.cloudflare_auth(),
            config.provider_timeout,
        )?);
        let route53 = Arc::new(Route53Client::from_env(config.provider_timeout).await);

        let reporter = Arc::new(KubeEventReporter::new(kube_client, config.instance.clone()));
        let (store, writer) = reflector::store::<Ingress>();

        let reconciler = Reconciler::new(
            &config,
            Arc::new(store.clone()),
            reporter,
            route53,
            cloudflare,
        );
        let context = Arc::new(Context::new(&config, reconciler, Metrics::new()?));

        Ok(Self {
            config,
            ingress_api,
            store,
            writer,
            context,
        })
    }

    /// Runs the controller until SIGINT/SIGTERM.
    ///
    /// Reconciles start only after the Ingress cache has synced. The first
    /// signal stops new reconciles and lets in-flight ones finish; a second
    /// one aborts them.
    pub async fn run(self) -> Result<(), ControllerError> {
        let Self {
            config,
            ingress_api,
            store,
            writer,
            context,
        } = self;

        let ready = Arc::new(AtomicBool::new(false));
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let server = tokio::spawn(server::serve(
            config.metrics_addr,
            server::router(context.metrics.clone(), ready.clone()),
            async move {
                let _ = stop_rx.wait_for(|stopped| *stopped).await;
            },
        ));

        let readiness = {
            let store = store.clone();
            let ready = ready.clone();
            tokio::spawn(async move {
                info!("Waiting for Ingress cache to sync");
                let synced = store
                    .wait_until_ready()
                    .await
                    .map_err(|e| ControllerError::Watch(format!("Ingress cache never synced: {}", e)));
                match synced {
                    Ok(()) => {
                        ready.store(true, Ordering::Release);
                        info!("Ingress cache synced ({} objects)", store.state().len());
                    }
                    Err(e) => warn!("{}", e),
                }
            })
        };

        let triggers = trigger_stream(
            kube_watcher(ingress_api, kube_watcher::Config::default()).default_backoff(),
            writer,
            context.metrics.clone(),
        );
        let (resync, resync_ticker) = resync_ticks(config.resync_interval);

        info!("Starting controller with {} worker(s)", config.workers);
        RuntimeController::for_stream(triggers, store)
            .with_config(RuntimeConfig::default().concurrency(config.workers))
            .reconcile_all_on(resync)
            .shutdown_on_signal()
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok((obj, action)) => debug!("Reconciled {}: {:?}", obj, action),
                    // Deleted between trigger and reconcile
                    Err(controller::Error::ObjectNotFound(obj)) => debug!("Ingress {} is gone", obj),
                    // Already logged by the error policy
                    Err(controller::Error::ReconcilerFailed(_, _)) => {}
                    Err(e) => warn!("Controller error: {}", e),
                }
            })
            .await;

        info!("Shutting down");
        resync_ticker.abort();
        readiness.abort();
        ready.store(false, Ordering::Release);

        let _ = stop_tx.send(true);
        match server.await {
            Ok(Err(e)) => warn!("Probe server failed: {}", e),
            Err(e) => warn!("Probe server panicked: {}", e),
            Ok(Ok(())) => {}
        }

        info!("Controller stopped");
        Ok(())
    }
}

/// Kubernetes client from `--kubeconfig`/`--master`, or the usual in-cluster
/// and `KUBECONFIG` inference when neither is given.
async fn kube_client(config: &ControllerConfig) -> Result<Client, ControllerError> {
    let mut kube_config = match &config.kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                ControllerError::InvalidConfig(format!("failed to read kubeconfig {}: {}", path.display(), e))
            })?;
            kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(|e| ControllerError::InvalidConfig(format!("invalid kubeconfig {}: {}", path.display(), e)))?
        }
        None => kube::Config::infer()
            .await
            .map_err(|e| ControllerError::InvalidConfig(format!("failed to infer Kubernetes config: {}", e)))?,
    };

    if let Some(master) = &config.master {
        kube_config.cluster_url = master
            .parse()
            .map_err(|e| ControllerError::InvalidConfig(format!("invalid --master {:?}: {}", master, e)))?;
    }

    Ok(Client::try_from(kube_config)?)
}

/// Reconcile one triggered Ingress and decide when it runs again.
pub(crate) async fn reconcile(ingress: Arc<Ingress>, ctx: Arc<Context>) -> Result<Action, ControllerError> {
    let Some(key) = ResourceKey::from_ingress(&ingress) else {
        return Ok(Action::await_change());
    };

    let started = Instant::now();
    match ctx.reconciler.reconcile(&key).await {
        Ok(Disposition::Succeeded) => {
            ctx.backoffs.reset(&key);
            ctx.metrics.record_reconciliation(RESULT_SUCCESS, started.elapsed());
            Ok(Action::await_change())
        }
        Ok(Disposition::Requeued(outcome)) => {
            for failure in &outcome.failures {
                ctx.metrics.record_provider_failure(failure.provider);
                warn!("  {} {}: {}", failure.provider, failure.host, failure.error);
            }
            let (delay, attempts) = ctx.backoffs.next_delay(&key);
            error!(
                "Ingress {} had {} failed upsert(s) (attempt {}), retrying in {:?}",
                key,
                outcome.failures.len(),
                attempts,
                delay
            );
            ctx.metrics.record_reconciliation(RESULT_REQUEUE, started.elapsed());
            Ok(Action::requeue(delay))
        }
        Err(e) => {
            ctx.metrics.record_reconciliation(RESULT_ERROR, started.elapsed());
            Err(e)
        }
    }
}

/// Requeue a failed reconcile with the key's Fibonacci backoff
pub(crate) fn error_policy(ingress: Arc<Ingress>, error: &ControllerError, ctx: Arc<Context>) -> Action {
    let Some(key) = ResourceKey::from_ingress(&ingress) else {
        return Action::await_change();
    };

    let (delay, attempts) = ctx.backoffs.next_delay(&key);
    error!(
        "Failed to reconcile Ingress {} (attempt {}): {}, retrying in {:?}",
        key, attempts, error, delay
    );
    Action::requeue(delay)
}
