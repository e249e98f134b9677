//! Sync policy extraction from Ingress annotations.
//!
//! | Annotation | Meaning |
//! |---|---|
//! | `{prefix}/cloudflare-record` | record target, the name published in both providers |
//! | `dns.alpha.kubernetes.io/external` | origin host the Cloudflare record points at |
//! | `{prefix}/add-rules-hosts` | also publish every rule host |
//! | `{prefix}/add-aliases` | also publish every server alias |
//! | `ingress.kubernetes.io/server-alias` | whitespace-separated aliases |

use std::collections::BTreeMap;

pub const EXTERNAL_DNS_ANNOTATION: &str = "dns.alpha.kubernetes.io/external";
pub const SERVER_ALIAS_ANNOTATION: &str = "ingress.kubernetes.io/server-alias";

const RECORD_SUFFIX: &str = "cloudflare-record";
const ADD_RULES_HOSTS_SUFFIX: &str = "add-rules-hosts";
const ADD_ALIASES_SUFFIX: &str = "add-aliases";

/// What one Ingress asks to be published
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPolicy {
    pub record_target: String,
    pub origin_host: String,
    pub include_rule_hosts: bool,
    pub include_alias_hosts: bool,
    pub alias_hosts: Vec<String>,
}

impl SyncPolicy {
    /// Publishing the origin under its own name would point it at itself
    pub fn targets_origin(&self) -> bool {
        self.record_target == self.origin_host
    }
}

/// Annotation key under the controller's prefix
pub fn prefixed(prefix: &str, suffix: &str) -> String {
    format!("{}/{}", prefix, suffix)
}

/// Extract the sync policy from an annotation mapping.
///
/// Returns `None` when the resource has not opted in: either the record
/// annotation or the external DNS annotation is missing.
pub fn extract_policy(annotations: &BTreeMap<String, String>, prefix: &str) -> Option<SyncPolicy> {
    let record_target = annotations.get(&prefixed(prefix, RECORD_SUFFIX))?;
    let origin_host = annotations.get(EXTERNAL_DNS_ANNOTATION)?;

    let flag = |suffix: &str| {
        annotations
            .get(&prefixed(prefix, suffix))
            .and_then(|v| parse_bool(v))
            .unwrap_or(false)
    };

    let alias_hosts = annotations
        .get(SERVER_ALIAS_ANNOTATION)
        .map(|v| v.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default();

    Some(SyncPolicy {
        record_target: record_target.clone(),
        origin_host: origin_host.clone(),
        include_rule_hosts: flag(ADD_RULES_HOSTS_SUFFIX),
        include_alias_hosts: flag(ADD_ALIASES_SUFFIX),
        alias_hosts,
    })
}

/// Parse a boolean string. Anything outside the accepted spellings is `None`.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
