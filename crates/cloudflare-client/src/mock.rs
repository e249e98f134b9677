//! Mock CloudflareClient for unit testing
//!
//! This module provides a mock implementation of CloudflareClientTrait that can be used
//! in unit tests without network access. Records are kept in memory per zone, every
//! call is logged, and failures can be injected per record name.

use crate::cloudflare_trait::CloudflareClientTrait;
use crate::error::CloudflareError;
use crate::models::*;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// A call observed by the mock, in the order it was made
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloudflareCall {
    ZoneLookup(String),
    List { zone_id: String, name: Option<String> },
    Create { zone_id: String, request: DnsRecordRequest },
    Update { zone_id: String, record_id: String, request: DnsRecordRequest },
}

/// Mock CloudflareClient for testing
#[derive(Debug, Clone, Default)]
pub struct MockCloudflareClient {
    // zone name -> zone id
    pub(crate) zones: Arc<Mutex<HashMap<String, String>>>,
    // zone id -> records, in insertion order
    pub(crate) records: Arc<Mutex<HashMap<String, Vec<DnsRecord>>>>,
    pub(crate) calls: Arc<Mutex<Vec<CloudflareCall>>>,
    // record names whose list/create/update calls fail
    pub(crate) failing_names: Arc<Mutex<HashSet<String>>>,
    pub(crate) next_id: Arc<Mutex<u64>>,
}

impl MockCloudflareClient {
    /// Create a new mock client with no zones
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a zone (for test setup)
    pub fn add_zone(&self, name: impl Into<String>, id: impl Into<String>) {
        self.zones.lock().unwrap().insert(name.into(), id.into());
    }

    /// Add an existing record to a zone (for test setup)
    pub fn add_record(&self, zone_id: &str, record: DnsRecord) {
        self.records
            .lock()
            .unwrap()
            .entry(zone_id.to_string())
            .or_default()
            .push(record);
    }

    /// Make every call touching `name` fail with an API error
    pub fn fail_for(&self, name: impl Into<String>) {
        self.failing_names.lock().unwrap().insert(name.into());
    }

    /// Records currently stored for a zone
    pub fn records(&self, zone_id: &str) -> Vec<DnsRecord> {
        self.records
            .lock()
            .unwrap()
            .get(zone_id)
            .cloned()
            .unwrap_or_default()
    }

    /// All calls made so far
    pub fn calls(&self) -> Vec<CloudflareCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of create calls made so far
    pub fn create_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, CloudflareCall::Create { .. }))
            .count()
    }

    /// Number of update calls made so far
    pub fn update_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, CloudflareCall::Update { .. }))
            .count()
    }

    fn record_call(&self, call: CloudflareCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_failure(&self, name: Option<&str>) -> Result<(), CloudflareError> {
        match name {
            Some(name) if self.failing_names.lock().unwrap().contains(name) => {
                Err(CloudflareError::Api(format!("injected failure for {}", name)))
            }
            _ => Ok(()),
        }
    }

    fn next_id(&self) -> String {
        let mut id = self.next_id.lock().unwrap();
        *id += 1;
        format!("record-{}", *id)
    }
}

#[async_trait::async_trait]
impl CloudflareClientTrait for MockCloudflareClient {
    async fn zone_id_by_name(&self, zone_name: &str) -> Result<String, CloudflareError> {
        self.record_call(CloudflareCall::ZoneLookup(zone_name.to_string()));
        self.zones
            .lock()
            .unwrap()
            .get(zone_name)
            .cloned()
            .ok_or_else(|| CloudflareError::ZoneNotFound(zone_name.to_string()))
    }

    async fn list_dns_records(&self, zone_id: &str, filter: &DnsRecordFilter) -> Result<Vec<DnsRecord>, CloudflareError> {
        self.record_call(CloudflareCall::List {
            zone_id: zone_id.to_string(),
            name: filter.name.clone(),
        });
        self.check_failure(filter.name.as_deref())?;
        Ok(self
            .records(zone_id)
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect())
    }

    async fn create_dns_record(&self, zone_id: &str, request: &DnsRecordRequest) -> Result<DnsRecord, CloudflareError> {
        self.record_call(CloudflareCall::Create {
            zone_id: zone_id.to_string(),
            request: request.clone(),
        });
        self.check_failure(Some(&request.name))?;

        let record = DnsRecord {
            id: self.next_id(),
            record_type: request.record_type.clone(),
            name: request.name.clone(),
            content: request.content.clone(),
            ttl: request.ttl,
            proxied: request.proxied,
            zone_id: Some(zone_id.to_string()),
        };
        self.add_record(zone_id, record.clone());
        Ok(record)
    }

    async fn update_dns_record(&self, zone_id: &str, record_id: &str, request: &DnsRecordRequest) -> Result<DnsRecord, CloudflareError> {
        self.record_call(CloudflareCall::Update {
            zone_id: zone_id.to_string(),
            record_id: record_id.to_string(),
            request: request.clone(),
        });
        self.check_failure(Some(&request.name))?;

        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(zone_id)
            .and_then(|rs| rs.iter_mut().find(|r| r.id == record_id))
            .ok_or_else(|| CloudflareError::Api(format!("Record {} not found", record_id)))?;

        record.record_type = request.record_type.clone();
        record.name = request.name.clone();
        record.content = request.content.clone();
        record.ttl = request.ttl;
        record.proxied = request.proxied;
        Ok(record.clone())
    }
}
