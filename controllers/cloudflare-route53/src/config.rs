//! Controller configuration.
//!
//! Everything the reconciler needs is parsed once at startup from command-line
//! flags (each backed by an environment variable) into an explicit
//! [`ControllerConfig`] and passed down at construction time.

use crate::error::ControllerError;
use clap::{ArgAction, Parser};
use cloudflare_client::{CloudflareAuth, CLOUDFLARE_API_BASE};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default annotation key prefix
pub const DEFAULT_ANNOTATION_PREFIX: &str = "cloudflare.patoarvizu.dev";

/// Runtime configuration for the controller
#[derive(Debug, Clone, Parser)]
#[command(name = "cloudflare-route53-controller")]
#[command(about = "Keeps Route53 and Cloudflare CNAME records converged with Ingress annotations", long_about = None)]
#[command(version)]
pub struct ControllerConfig {
    /// Path to a kubeconfig file
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// The address of the Kubernetes API server. Overrides any value in kubeconfig.
    #[arg(long)]
    pub master: Option<String>,

    /// The prefix to be used for discovery of managed ingresses
    #[arg(long, env = "ANNOTATION_PREFIX", default_value = DEFAULT_ANNOTATION_PREFIX, value_parser = non_blank)]
    pub annotation_prefix: String,

    /// The id of the Route53 hosted zone to be managed
    #[arg(long, env = "HOSTED_ZONE_ID", value_parser = non_blank)]
    pub hosted_zone_id: String,

    /// The name of the Cloudflare zone to be managed
    #[arg(long, env = "CLOUDFLARE_ZONE_NAME", value_parser = non_blank)]
    pub cloudflare_zone_name: String,

    /// Also create records for each rule host and alias annotation on the Ingress
    #[arg(
        long = "enable-additional-hosts-annotations",
        env = "ENABLE_ADDITIONAL_HOSTS_ANNOTATIONS",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = flag_bool
    )]
    pub enable_additional_hosts: bool,

    /// Number of Ingresses reconciled concurrently
    #[arg(long, env = "WORKERS", default_value = "1", value_parser = clap::value_parser!(u16).range(1..))]
    pub workers: u16,

    /// The frequency at which every cached Ingress is reconciled again, in seconds
    #[arg(long = "frequency", env = "RESYNC_INTERVAL_SECONDS", default_value = "30", value_parser = positive_seconds)]
    pub resync_interval: Duration,

    /// Upper bound for each provider call, in seconds
    #[arg(long = "provider-timeout", env = "PROVIDER_TIMEOUT_SECONDS", default_value = "30", value_parser = positive_seconds)]
    pub provider_timeout: Duration,

    /// First requeue delay after a failed reconcile, in seconds
    #[arg(long = "backoff-min", env = "BACKOFF_MIN_SECONDS", default_value = "5", value_parser = positive_seconds)]
    pub backoff_min: Duration,

    /// Longest requeue delay, in seconds
    #[arg(long = "backoff-max", env = "BACKOFF_MAX_SECONDS", default_value = "300", value_parser = positive_seconds)]
    pub backoff_max: Duration,

    /// Namespace to watch; all namespaces when unset
    #[arg(long, env = "WATCH_NAMESPACE", value_parser = non_blank)]
    pub namespace: Option<String>,

    /// Listen address for probes and metrics
    #[arg(long, env = "METRICS_ADDR", default_value = "0.0.0.0:8080")]
    pub metrics_addr: SocketAddr,

    #[arg(long, env = "CLOUDFLARE_API_URL", default_value = CLOUDFLARE_API_BASE)]
    pub cloudflare_api_url: String,

    /// Cloudflare API token, or the global API key when an email is given
    #[arg(long, env = "CLOUDFLARE_TOKEN", hide_env_values = true, value_parser = non_blank)]
    pub cloudflare_token: String,

    #[arg(long, env = "CLOUDFLARE_EMAIL")]
    pub cloudflare_email: Option<String>,

    /// Reporting instance on published events (the pod name)
    #[arg(long, env = "POD_NAME")]
    pub instance: Option<String>,
}

impl ControllerConfig {
    /// Checks that span more than one flag
    pub fn validate(&self) -> Result<(), ControllerError> {
        if self.backoff_max < self.backoff_min {
            return Err(ControllerError::InvalidConfig(format!(
                "--backoff-max ({:?}) must not be below --backoff-min ({:?})",
                self.backoff_max, self.backoff_min
            )));
        }
        Ok(())
    }

    pub fn cloudflare_auth(&self) -> CloudflareAuth {
        CloudflareAuth::from_parts(self.cloudflare_token.clone(), self.cloudflare_email.clone())
    }
}

fn non_blank(raw: &str) -> Result<String, String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err("must not be blank".to_string());
    }
    Ok(value.to_string())
}

fn flag_bool(raw: &str) -> Result<bool, String> {
    crate::reconciler::policy::parse_bool(raw).ok_or_else(|| format!("expected a boolean, got {:?}", raw))
}

fn positive_seconds(raw: &str) -> Result<Duration, String> {
    let secs: u64 = raw.trim().parse().map_err(|e| format!("{}", e))?;
    if secs == 0 {
        return Err("must be positive".to_string());
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    const REQUIRED: [&str; 7] = [
        "cloudflare-route53-controller",
        "--hosted-zone-id",
        "Z123",
        "--cloudflare-zone-name",
        "example.com",
        "--cloudflare-token",
        "secret",
    ];

    fn parse(extra: &[&str]) -> Result<ControllerConfig, clap::Error> {
        ControllerConfig::try_parse_from(REQUIRED.iter().chain(extra))
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]).unwrap();

        assert_eq!(config.kubeconfig, None);
        assert_eq!(config.master, None);
        assert_eq!(config.annotation_prefix, "cloudflare.patoarvizu.dev");
        assert_eq!(config.hosted_zone_id, "Z123");
        assert_eq!(config.cloudflare_zone_name, "example.com");
        assert!(!config.enable_additional_hosts);
        assert_eq!(config.workers, 1);
        assert_eq!(config.resync_interval, Duration::from_secs(30));
        assert_eq!(config.provider_timeout, Duration::from_secs(30));
        assert_eq!(config.backoff_min, Duration::from_secs(5));
        assert_eq!(config.backoff_max, Duration::from_secs(300));
        assert_eq!(config.namespace, None);
        assert_eq!(config.metrics_addr.port(), 8080);
        assert_eq!(config.cloudflare_api_url, CLOUDFLARE_API_BASE);
        assert_eq!(config.cloudflare_auth(), CloudflareAuth::ApiToken("secret".to_string()));
        assert_eq!(config.instance, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cluster_and_sync_flags() {
        let config = parse(&[
            "--kubeconfig",
            "/etc/kube/config",
            "--master",
            "https://10.0.0.1:6443",
            "--annotation-prefix",
            "dns.example.io",
            "--enable-additional-hosts-annotations",
            "--frequency",
            "120",
        ])
        .unwrap();

        assert_eq!(config.kubeconfig, Some(PathBuf::from("/etc/kube/config")));
        assert_eq!(config.master.as_deref(), Some("https://10.0.0.1:6443"));
        assert_eq!(config.annotation_prefix, "dns.example.io");
        assert!(config.enable_additional_hosts);
        assert_eq!(config.resync_interval, Duration::from_secs(120));
    }

    #[test]
    fn test_overrides() {
        let config = parse(&[
            "--enable-additional-hosts-annotations=False",
            "--workers",
            "4",
            "--namespace",
            "web",
            "--cloudflare-email",
            "ops@example.com",
            "--metrics-addr",
            "127.0.0.1:9100",
            "--instance",
            "controller-0",
        ])
        .unwrap();

        assert!(!config.enable_additional_hosts);
        assert_eq!(config.workers, 4);
        assert_eq!(config.namespace.as_deref(), Some("web"));
        assert_eq!(config.metrics_addr, "127.0.0.1:9100".parse().unwrap());
        assert_eq!(config.instance.as_deref(), Some("controller-0"));
        assert_eq!(
            config.cloudflare_auth(),
            CloudflareAuth::ApiKey { key: "secret".to_string(), email: "ops@example.com".to_string() }
        );
    }

    #[test]
    fn test_missing_required() {
        let result = ControllerConfig::try_parse_from(&REQUIRED[..5]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert!(err.to_string().contains("--cloudflare-token"));
    }

    #[test]
    fn test_invalid_values() {
        for (flag, value) in [
            ("--workers", "0"),
            ("--workers", "many"),
            ("--enable-additional-hosts-annotations", "yes"),
            ("--provider-timeout", "0"),
            ("--frequency", "-1"),
            ("--backoff-min", "0"),
            ("--metrics-addr", "not-an-addr"),
            ("--namespace", " "),
        ] {
            let arg = format!("{}={}", flag, value);
            assert!(parse(&[arg.as_str()]).is_err(), "{} should be rejected", arg);
        }
    }

    #[test]
    fn test_backoff_bounds() {
        let config = parse(&["--backoff-min", "600"]).unwrap();
        assert!(matches!(config.validate(), Err(ControllerError::InvalidConfig(msg)) if msg.contains("--backoff-max")));

        let config = parse(&["--backoff-min", "10", "--backoff-max", "10"]).unwrap();
        assert!(config.validate().is_ok());
    }
}
