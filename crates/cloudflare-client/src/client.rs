//! Cloudflare API client
//!
//! Implements the Cloudflare v4 REST API calls used for CNAME management.
//! Endpoints: /zones and /zones/{zone_id}/dns_records

use crate::cloudflare_trait::CloudflareClientTrait;
use crate::error::CloudflareError;
use crate::models::*;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Default Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Records requested per page when listing
const PER_PAGE: u32 = 100;

/// Credentials used to authenticate against the Cloudflare API
#[derive(Clone, PartialEq, Eq)]
pub enum CloudflareAuth {
    /// Global API key paired with the account email (`X-Auth-Key` / `X-Auth-Email`)
    ApiKey { key: String, email: String },
    /// Scoped API token (`Authorization: Bearer`)
    ApiToken(String),
}

impl CloudflareAuth {
    /// Build credentials from a key/token and an optional account email.
    ///
    /// An email selects global API key authentication; without one the
    /// secret is treated as a scoped API token.
    pub fn from_parts(secret: String, email: Option<String>) -> Self {
        match email.filter(|e| !e.trim().is_empty()) {
            Some(email) => CloudflareAuth::ApiKey { key: secret, email },
            None => CloudflareAuth::ApiToken(secret),
        }
    }

    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            CloudflareAuth::ApiKey { key, email } => request
                .header("X-Auth-Key", key)
                .header("X-Auth-Email", email),
            CloudflareAuth::ApiToken(token) => request.bearer_auth(token),
        }
    }
}

impl fmt::Debug for CloudflareAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloudflareAuth::ApiKey { email, .. } => f
                .debug_struct("ApiKey")
                .field("key", &"<redacted>")
                .field("email", email)
                .finish(),
            CloudflareAuth::ApiToken(_) => f.debug_tuple("ApiToken").field(&"<redacted>").finish(),
        }
    }
}

/// Cloudflare API client
pub struct CloudflareClient {
    client: Client,
    base_url: String,
    auth: CloudflareAuth,
}

impl fmt::Debug for CloudflareClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudflareClient")
            .field("base_url", &self.base_url)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

impl CloudflareClient {
    /// Create a new Cloudflare client
    ///
    /// # Arguments
    /// * `base_url` - API base URL (normally [`CLOUDFLARE_API_BASE`])
    /// * `auth` - Credentials
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: String, auth: CloudflareAuth, timeout: Duration) -> Result<Self, CloudflareError> {
        let secret_missing = match &auth {
            CloudflareAuth::ApiKey { key, .. } => key.trim().is_empty(),
            CloudflareAuth::ApiToken(token) => token.trim().is_empty(),
        };
        if secret_missing {
            return Err(CloudflareError::InvalidConfig(
                "Cloudflare API key or token is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cloudflare-route53-controller/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_query_string(filters: &[(&str, &str)]) -> String {
        filters
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Send a request and unwrap the Cloudflare response envelope.
    ///
    /// Cloudflare reports most failures inside the envelope (`success: false`)
    /// even on 4xx responses, so the body is decoded before the status is judged.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<ApiResponse<T>, CloudflareError> {
        let response: Response = self
            .auth
            .apply(request)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status == 401 || status == 403 {
            return Err(CloudflareError::Authentication(format!(
                "{} rejected: {} - {}",
                what, status, body
            )));
        }

        let envelope: ApiResponse<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => return Err(CloudflareError::Serialization(e)),
            Err(_) => {
                return Err(CloudflareError::Api(format!(
                    "{} failed: {} - {}",
                    what,
                    status,
                    body.chars().take(500).collect::<String>()
                )));
            }
        };

        if !envelope.success || !status.is_success() {
            let errors = envelope
                .errors
                .iter()
                .map(|e| format!("{} ({})", e.message, e.code))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(CloudflareError::Api(format!("{} failed: {} - {}", what, status, errors)));
        }

        Ok(envelope)
    }

    /// Look up a zone identifier by zone name
    ///
    /// # Returns
    /// * `Ok(String)` - The zone identifier
    /// * `Err(CloudflareError::ZoneNotFound)` - No zone with that name is visible
    pub async fn zone_id_by_name(&self, zone_name: &str) -> Result<String, CloudflareError> {
        let url = format!(
            "{}/zones?{}",
            self.base_url,
            Self::build_query_string(&[("name", zone_name)])
        );
        debug!("Looking up Cloudflare zone ID for {}", zone_name);

        let response: ApiResponse<Vec<Zone>> = self.send(self.client.get(&url), "Zone lookup").await?;

        let zone = response
            .result
            .unwrap_or_default()
            .into_iter()
            .find(|z| z.name == zone_name)
            .ok_or_else(|| CloudflareError::ZoneNotFound(zone_name.to_string()))?;

        debug!("Found Cloudflare zone {} with ID {}", zone.name, zone.id);
        Ok(zone.id)
    }

    /// List DNS records in a zone matching a filter, fetching all pages
    pub async fn list_dns_records(
        &self,
        zone_id: &str,
        filter: &DnsRecordFilter,
    ) -> Result<Vec<DnsRecord>, CloudflareError> {
        let mut all_records = Vec::new();
        let mut page: u32 = 1;

        loop {
            let page_str = page.to_string();
            let per_page_str = PER_PAGE.to_string();
            let mut params = filter.query_params();
            params.push(("page", page_str.as_str()));
            params.push(("per_page", per_page_str.as_str()));

            let url = format!(
                "{}/zones/{}/dns_records?{}",
                self.base_url,
                zone_id,
                Self::build_query_string(&params)
            );
            debug!("Fetching page: {}", url);

            let response: ApiResponse<Vec<DnsRecord>> =
                self.send(self.client.get(&url), "DNS record listing").await?;

            let records = response.result.unwrap_or_default();
            let empty = records.is_empty();
            all_records.extend(records);

            match response.result_info {
                Some(info) if !empty && info.has_page_after(page) => page += 1,
                _ => break,
            }
        }

        Ok(all_records)
    }

    /// Create a DNS record
    pub async fn create_dns_record(
        &self,
        zone_id: &str,
        request: &DnsRecordRequest,
    ) -> Result<DnsRecord, CloudflareError> {
        let url = format!("{}/zones/{}/dns_records", self.base_url, zone_id);
        debug!("Creating {} record {} -> {}", request.record_type, request.name, request.content);

        let response: ApiResponse<DnsRecord> = self
            .send(self.client.post(&url).json(request), "DNS record creation")
            .await?;

        response
            .result
            .ok_or_else(|| CloudflareError::Api("DNS record creation returned no record".to_string()))
    }

    /// Update an existing DNS record in place
    pub async fn update_dns_record(
        &self,
        zone_id: &str,
        record_id: &str,
        request: &DnsRecordRequest,
    ) -> Result<DnsRecord, CloudflareError> {
        let url = format!("{}/zones/{}/dns_records/{}", self.base_url, zone_id, record_id);
        debug!("Updating record {} ({}) -> {}", request.name, record_id, request.content);

        let response: ApiResponse<DnsRecord> = self
            .send(self.client.patch(&url).json(request), "DNS record update")
            .await?;

        response
            .result
            .ok_or_else(|| CloudflareError::Api("DNS record update returned no record".to_string()))
    }
}

#[async_trait::async_trait]
impl CloudflareClientTrait for CloudflareClient {
    async fn zone_id_by_name(&self, zone_name: &str) -> Result<String, CloudflareError> {
        self.zone_id_by_name(zone_name).await
    }

    async fn list_dns_records(&self, zone_id: &str, filter: &DnsRecordFilter) -> Result<Vec<DnsRecord>, CloudflareError> {
        self.list_dns_records(zone_id, filter).await
    }

    async fn create_dns_record(&self, zone_id: &str, request: &DnsRecordRequest) -> Result<DnsRecord, CloudflareError> {
        self.create_dns_record(zone_id, request).await
    }

    async fn update_dns_record(&self, zone_id: &str, record_id: &str, request: &DnsRecordRequest) -> Result<DnsRecord, CloudflareError> {
        self.update_dns_record(zone_id, record_id, request).await
    }
}
