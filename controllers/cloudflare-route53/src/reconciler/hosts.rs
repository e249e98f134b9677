//! Host set resolution.

use super::policy::SyncPolicy;
use std::collections::HashSet;

/// Hostnames to publish for one Ingress, in processing order, without duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostSet(Vec<String>);

impl HostSet {
    /// Expand a policy into the hosts to publish.
    ///
    /// The record target always comes first. Rule hosts and then aliases are
    /// appended only when `additional_hosts` is enabled and the policy asks for
    /// them. Later duplicates are dropped.
    pub fn resolve(policy: &SyncPolicy, rule_hosts: &[String], additional_hosts: bool) -> Self {
        let mut candidates: Vec<&str> = vec![policy.record_target.as_str()];

        if additional_hosts && policy.include_rule_hosts {
            candidates.extend(rule_hosts.iter().map(String::as_str).filter(|h| !h.is_empty()));
        }
        if additional_hosts && policy.include_alias_hosts {
            candidates.extend(policy.alias_hosts.iter().map(String::as_str));
        }

        Self::from_ordered(candidates)
    }

    fn from_ordered<'a>(candidates: impl IntoIterator<Item = &'a str>) -> Self {
        let mut seen = HashSet::new();
        Self(
            candidates
                .into_iter()
                .filter(|host| seen.insert(*host))
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}
