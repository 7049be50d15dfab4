// # Hetzner DNS Provider
//
// This crate implements the `DnsProvider` trait against the Hetzner DNS
// API (https://dns.hetzner.com/api-docs).
//
// ## Wire contract
//
// - Base URL: `https://dns.hetzner.com/api/v1`
// - Auth: static `Auth-API-Token` header on every call
// - List Zones:   GET    `/zones`            → `{"zones": [...]}`
// - List Records: GET    `/records?zone_id=` → `{"records": [...]}`
// - Create:       POST   `/records`          → `{"record": {...}}`
// - Delete:       DELETE `/records/{id}`
//
// Record objects carry `{id, type, name, value, ttl, zone_id}`.
//
// ## Responsibility boundaries
//
// Each method makes exactly one HTTP call. Any non-success status becomes
// `Error::Provider { status, body }` and is propagated as fatal: no
// retry, no backoff. Retry policy in this system belongs to address
// discovery only.
//
// ## Security
//
// The API token never appears in logs; the Debug implementation redacts it.

use async_trait::async_trait;
use hddns_core::config::ProviderConfig;
use hddns_core::traits::DnsProvider;
use hddns_core::types::{NewRecord, Record, Zone};
use hddns_core::{Error, Result};
use serde::Deserialize;
use std::time::Duration;

/// Hetzner DNS API base URL
const HETZNER_API_BASE: &str = "https://dns.hetzner.com/api/v1";

/// Auth header carrying the API token
const AUTH_HEADER: &str = "Auth-API-Token";

/// HTTP timeout for API requests
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ZonesResponse {
    zones: Vec<Zone>,
}

#[derive(Debug, Deserialize)]
struct RecordsResponse {
    records: Vec<Record>,
}

#[derive(Debug, Deserialize)]
struct RecordResponse {
    record: Record,
}

/// Hetzner DNS provider
pub struct HetznerProvider {
    /// Hetzner API token; never logged
    api_token: String,

    /// API base URL, overridable for testing
    api_base: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for HetznerProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HetznerProvider")
            .field("api_token", &"<REDACTED>")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl HetznerProvider {
    /// Create a provider for the production Hetzner API
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        Self::with_base(api_token, HETZNER_API_BASE)
    }

    /// Create a provider against an explicit API base URL
    pub fn with_base(api_token: impl Into<String>, api_base: impl Into<String>) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("Hetzner API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_token,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Create a provider from resolved configuration
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        config.validate()?;
        Self::with_base(config.token.clone(), config.api_base.clone())
    }

    /// Map a non-success response to `Error::Provider`, passing successes through
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error response".to_string());
        Err(Error::provider(status.as_u16(), body))
    }
}

#[async_trait]
impl DnsProvider for HetznerProvider {
    async fn list_zones(&self) -> Result<Vec<Zone>> {
        let url = format!("{}/zones", self.api_base);
        tracing::debug!(%url, "listing zones");

        let response = self
            .client
            .get(&url)
            .header(AUTH_HEADER, &self.api_token)
            .send()
            .await
            .map_err(|e| Error::http(format!("zone listing request failed: {e}")))?;
        let response = Self::check(response).await?;

        let body: ZonesResponse = response
            .json()
            .await
            .map_err(|e| Error::http(format!("failed to parse zone listing: {e}")))?;
        Ok(body.zones)
    }

    async fn list_records(&self, zone_id: &str) -> Result<Vec<Record>> {
        let url = format!("{}/records", self.api_base);
        tracing::debug!(%url, %zone_id, "listing records");

        let response = self
            .client
            .get(&url)
            .query(&[("zone_id", zone_id)])
            .header(AUTH_HEADER, &self.api_token)
            .send()
            .await
            .map_err(|e| Error::http(format!("record listing request failed: {e}")))?;
        let response = Self::check(response).await?;

        let body: RecordsResponse = response
            .json()
            .await
            .map_err(|e| Error::http(format!("failed to parse record listing: {e}")))?;
        Ok(body.records)
    }

    async fn create_record(&self, record: &NewRecord) -> Result<Record> {
        let url = format!("{}/records", self.api_base);
        tracing::debug!(%url, kind = %record.kind, name = %record.name, "creating record");

        let response = self
            .client
            .post(&url)
            .header(AUTH_HEADER, &self.api_token)
            .json(record)
            .send()
            .await
            .map_err(|e| Error::http(format!("record creation request failed: {e}")))?;
        let response = Self::check(response).await?;

        let body: RecordResponse = response
            .json()
            .await
            .map_err(|e| Error::http(format!("failed to parse created record: {e}")))?;
        Ok(body.record)
    }

    async fn delete_record(&self, record_id: &str) -> Result<()> {
        let url = format!("{}/records/{record_id}", self.api_base);
        tracing::debug!(%url, "deleting record");

        let response = self
            .client
            .delete(&url)
            .header(AUTH_HEADER, &self.api_token)
            .send()
            .await
            .map_err(|e| Error::http(format!("record deletion request failed: {e}")))?;
        Self::check(response).await?;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "hetzner"
    }
}
