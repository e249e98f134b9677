//! Mock Route53Client for unit testing
//!
//! Stores record sets in memory keyed by (hosted zone, name) so repeated
//! UPSERTs replace rather than duplicate, logs every call, and can be told
//! to fail for specific record names.

use crate::error::Route53Error;
use crate::models::{CnameRecord, normalize_hosted_zone_id};
use crate::route53_trait::Route53ClientTrait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// An UPSERT observed by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route53Call {
    pub hosted_zone_id: String,
    pub record: CnameRecord,
}

/// Mock Route53Client for testing
#[derive(Debug, Clone, Default)]
pub struct MockRoute53Client {
    pub(crate) record_sets: Arc<Mutex<HashMap<(String, String), CnameRecord>>>,
    pub(crate) calls: Arc<Mutex<Vec<Route53Call>>>,
    pub(crate) failing_names: Arc<Mutex<HashSet<String>>>,
}

impl MockRoute53Client {
    /// Create a new, empty mock client
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every UPSERT for `name` fail with an API error
    pub fn fail_for(&self, name: impl Into<String>) {
        self.failing_names.lock().unwrap().insert(name.into());
    }

    /// The stored record set for a name, if any
    pub fn record_set(&self, hosted_zone_id: &str, name: &str) -> Option<CnameRecord> {
        self.record_sets
            .lock()
            .unwrap()
            .get(&(normalize_hosted_zone_id(hosted_zone_id).to_string(), name.to_string()))
            .cloned()
    }

    /// Number of record sets stored across all zones
    pub fn record_set_count(&self) -> usize {
        self.record_sets.lock().unwrap().len()
    }

    /// All calls made so far
    pub fn calls(&self) -> Vec<Route53Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Route53ClientTrait for MockRoute53Client {
    async fn upsert_cname(&self, hosted_zone_id: &str, record: &CnameRecord) -> Result<(), Route53Error> {
        let zone_id = normalize_hosted_zone_id(hosted_zone_id).to_string();
        self.calls.lock().unwrap().push(Route53Call {
            hosted_zone_id: zone_id.clone(),
            record: record.clone(),
        });

        if self.failing_names.lock().unwrap().contains(&record.name) {
            return Err(Route53Error::Api(format!("injected failure for {}", record.name)));
        }

        self.record_sets
            .lock()
            .unwrap()
            .insert((zone_id, record.name.clone()), record.clone());
        Ok(())
    }
}
