//! Reconcile outcomes and the events that report them.

use crate::key::ResourceKey;
use crate::recorder::{ResourceEvent, Severity};
use std::fmt;

pub const REASON_SYNCED: &str = "Synced";
pub const REASON_ERROR: &str = "Error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Route53,
    Cloudflare,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Route53 => "route53",
            Provider::Cloudflare => "cloudflare",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Route53 => write!(f, "Route53"),
            Provider::Cloudflare => write!(f, "Cloudflare"),
        }
    }
}

/// One failed (host, provider) upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostFailure {
    pub host: String,
    pub provider: Provider,
    pub error: String,
}

/// Result of upserting a whole host set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub failures: Vec<HostFailure>,
}

impl SyncOutcome {
    pub fn failed(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Warning attached to the Ingress for one failed upsert
pub fn failure_event(provider: Provider, host: &str) -> ResourceEvent {
    ResourceEvent {
        severity: Severity::Warning,
        reason: REASON_ERROR.to_string(),
        note: format!("{} record ({}) failed to update.", provider, host),
        action: "Upsert".to_string(),
    }
}

/// Event attached to the Ingress after every host synced in both providers
pub fn synced_event(key: &ResourceKey) -> ResourceEvent {
    ResourceEvent {
        severity: Severity::Normal,
        reason: REASON_SYNCED.to_string(),
        note: format!("Cloudflare and Route53 records for ingress {} have been synced.", key),
        action: "Sync".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_messages() {
        assert_eq!(
            failure_event(Provider::Route53, "a.example.com").note,
            "Route53 record (a.example.com) failed to update."
        );
        assert_eq!(
            failure_event(Provider::Cloudflare, "a.example.com").note,
            "Cloudflare record (a.example.com) failed to update."
        );

        let synced = synced_event(&ResourceKey::new(Some("web"), "api"));
        assert_eq!(synced.severity, Severity::Normal);
        assert_eq!(synced.reason, "Synced");
        assert_eq!(synced.note, "Cloudflare and Route53 records for ingress web/api have been synced.");
    }

    #[test]
    fn test_outcome_failed() {
        assert!(!SyncOutcome::default().failed());
        let outcome = SyncOutcome {
            failures: vec![HostFailure {
                host: "a.example.com".to_string(),
                provider: Provider::Cloudflare,
                error: "boom".to_string(),
            }],
        };
        assert!(outcome.failed());
    }
}
