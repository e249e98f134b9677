//! Cloudflare/Route53 Controller
//!
//! Keeps DNS records in two providers converged with Ingress annotations:
//! - Route53: `{host}` CNAME `{host}.cdn.cloudflare.net`
//! - Cloudflare: `{host}` proxied CNAME to the Ingress's external DNS name
//!
//! Only Ingresses annotated with `{prefix}/cloudflare-record` are touched.

mod backoff;
mod config;
mod controller;
mod error;
mod key;
mod metrics;
mod reconciler;
mod recorder;
mod server;
mod snapshot;
mod watcher;

#[cfg(test)]
mod test_utils;

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use clap::Parser;
use controller::Controller;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    init_tracing();

    // kube, reqwest and the AWS SDK all pull in rustls; pin one provider process-wide
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        debug!("rustls crypto provider already installed");
    }

    let config = ControllerConfig::parse();
    config.validate()?;

    info!("Starting Cloudflare/Route53 Controller");

    info!("Configuration:");
    info!("  Annotation prefix: {}", config.annotation_prefix);
    info!("  Route53 hosted zone: {}", config.hosted_zone_id);
    info!("  Cloudflare zone: {}", config.cloudflare_zone_name);
    info!("  Additional hosts annotations: {}", config.enable_additional_hosts);
    info!("  Workers: {}", config.workers);
    info!("  Resync frequency: {:?}", config.resync_interval);
    info!("  Namespace: {}", config.namespace.as_deref().unwrap_or("all namespaces"));

    let controller = Controller::new(config).await?;
    controller.run().await?;

    Ok(())
}

/// Logging: `RUST_LOG` filter (default `info`), `LOG_FORMAT=json` for JSON lines
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
    }
}
