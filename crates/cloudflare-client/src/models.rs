//! Cloudflare API models
//!
//! These models match the Cloudflare v4 DNS records and zones endpoints.
//! See: https://developers.cloudflare.com/api/resources/dns/subresources/records/

use serde::{Deserialize, Serialize};

/// Record type used for every record this controller manages
pub const CNAME: &str = "CNAME";

/// TTL value Cloudflare interprets as "automatic"
pub const TTL_AUTO: u32 = 1;

/// Cloudflare API response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
    #[serde(default)]
    pub messages: Vec<ApiMessage>,
    pub result: Option<T>,
    #[serde(default)]
    pub result_info: Option<ResultInfo>,
}

/// Error or informational message in a response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub code: i64,
    pub message: String,
}

/// Pagination block of list responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultInfo {
    pub page: u32,
    pub per_page: u32,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub total_count: u32,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

impl ResultInfo {
    /// Page count, derived from `total_count` when the API omits it
    pub fn total_pages(&self) -> u32 {
        self.total_pages.unwrap_or_else(|| {
            if self.per_page == 0 {
                0
            } else {
                self.total_count.div_ceil(self.per_page)
            }
        })
    }

    /// Whether another page follows `page`, the page the caller requested.
    ///
    /// The `page` echoed back by the API is not trusted.
    pub fn has_page_after(&self, page: u32) -> bool {
        page < self.total_pages()
    }
}

/// Zone model (only the fields the controller reads)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
}

/// DNS record model matching the Cloudflare DNS record object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    pub ttl: u32,
    #[serde(default)]
    pub proxied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
}

/// Body for creating or updating a DNS record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecordRequest {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    pub ttl: u32,
    pub proxied: bool,
}

impl DnsRecordRequest {
    /// A proxied CNAME with automatic TTL, the shape every managed host gets
    pub fn proxied_cname(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            record_type: CNAME.to_string(),
            name: name.into(),
            content: content.into(),
            ttl: TTL_AUTO,
            proxied: true,
        }
    }
}

/// Filter applied when listing DNS records in a zone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DnsRecordFilter {
    pub name: Option<String>,
    pub record_type: Option<String>,
}

impl DnsRecordFilter {
    /// Filter matching CNAME records with exactly this name
    pub fn cname(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            record_type: Some(CNAME.to_string()),
        }
    }

    /// Whether a record satisfies this filter
    pub fn matches(&self, record: &DnsRecord) -> bool {
        self.name.as_deref().is_none_or(|n| record.name == n)
            && self
                .record_type
                .as_deref()
                .is_none_or(|t| record.record_type.eq_ignore_ascii_case(t))
    }

    /// Query parameters for the list endpoint
    pub fn query_params(&self) -> Vec<(&str, &str)> {
        let mut params = Vec::new();
        if let Some(name) = &self.name {
            params.push(("name", name.as_str()));
        }
        if let Some(record_type) = &self.record_type {
            params.push(("type", record_type.as_str()));
        }
        params
    }
}
