// # name.com DNS Provider
//
// This crate provides the name.com v4 API client for the updater.
//
// ## Implementation Status
//
// - ✅ One logical API call per trait method (redirects replayed transparently)
// - ✅ HTTP timeout configured (30 seconds)
// - ✅ Status >= 400 surfaced as `Error::Api` with status and body, for reads and writes
// - ✅ Write preconditions checked before anything is sent
// - ❌ NO retry logic (a failed cycle is retried on the next tick)
// - ❌ NO caching (last-applied state owned by DdnsEngine)
//
// ## Security Requirements
//
// - API token NEVER appears in logs or Debug output
// - Redirects are only followed to https locations
//
// ## API Reference
//
// - name.com API v4: https://www.name.com/api-docs
// - List Records: GET `/v4/domains/:domain/records`
// - Create Record: POST `/v4/domains/:domain/records`
// - Update Record: PUT `/v4/domains/:domain/records/:id`
//
// All calls use HTTP basic auth with `username:token`.

pub mod transport;

use async_trait::async_trait;
use dyndns_core::config::ProviderConfig;
use dyndns_core::traits::{DnsProvider, DnsRecord, RecordWrite};
use dyndns_core::{Error, Result};
use reqwest::{Method, Url};
use serde::Deserialize;
use std::time::Duration;

use transport::{BasicAuth, HttpResponse, RedirectingClient};

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Body of `GET /v4/domains/:domain/records`
#[derive(Debug, Deserialize)]
struct RecordListing {
    records: Option<Vec<DnsRecord>>,
}

/// name.com DNS provider
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API token.
#[derive(Debug)]
pub struct NameComProvider {
    /// Username and API token
    credentials: BasicAuth,

    /// `https://{endpoint}`
    base_url: Url,

    /// HTTP client for API requests
    client: RedirectingClient,
}

impl NameComProvider {
    /// Create a new name.com provider
    ///
    /// # Parameters
    ///
    /// - `username`: name.com account username
    /// - `api_token`: API token for that account
    /// - `endpoint`: API host (e.g., "api.name.com" or "api.dev.name.com")
    pub fn new(
        username: impl Into<String>,
        api_token: impl Into<String>,
        endpoint: &str,
    ) -> Result<Self> {
        let base_url = Url::parse(&format!("https://{}", endpoint))
            .map_err(|e| Error::config(format!("Invalid registrar endpoint {}: {}", endpoint, e)))?;

        Self::with_base_url(username, api_token, base_url)
    }

    /// Create a provider talking to an explicit base URL
    ///
    /// Used against local mock servers; production code goes through
    /// [`NameComProvider::new`], which always uses https.
    pub fn with_base_url(
        username: impl Into<String>,
        api_token: impl Into<String>,
        base_url: Url,
    ) -> Result<Self> {
        let credentials = BasicAuth::new(username, api_token);

        if credentials.username.is_empty() {
            return Err(Error::config("name.com username cannot be empty"));
        }
        if credentials.password.is_empty() {
            return Err(Error::config("name.com API token cannot be empty"));
        }
        if base_url.cannot_be_a_base() {
            return Err(Error::config(format!("Invalid registrar base URL: {}", base_url)));
        }

        Ok(Self {
            credentials,
            base_url,
            client: RedirectingClient::new(DEFAULT_HTTP_TIMEOUT)?,
        })
    }

    /// Create a provider from configuration
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        config.validate()?;
        Self::new(
            config.username.as_str(),
            config.api_token.as_str(),
            &config.endpoint,
        )
    }

    /// Build `{base}/v4/domains/{domain}/records[/{id}]`
    fn records_url(&self, domain: &str, record_id: Option<u64>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| Error::config(format!("Invalid registrar base URL: {}", self.base_url)))?;
            segments.clear().extend(["v4", "domains", domain, "records"]);
            if let Some(id) = record_id {
                segments.push(&id.to_string());
            }
        }
        url.set_query(None);
        Ok(url)
    }

    async fn call(&self, method: Method, url: Url, body: Option<&serde_json::Value>) -> Result<HttpResponse> {
        let response = self
            .client
            .send(method, url, Some(&self.credentials), body)
            .await?;

        if response.status.as_u16() >= 400 {
            tracing::error!(
                "name.com API error: status {} {}: {}",
                response.status.as_u16(),
                response.status.canonical_reason().unwrap_or("Unknown"),
                response.body
            );
            return Err(Error::api(response.status.as_u16(), response.body));
        }

        Ok(response)
    }

    /// Send a create or update after checking its preconditions
    async fn write(
        &self,
        method: Method,
        domain: &str,
        record_id: Option<u64>,
        record: &RecordWrite,
    ) -> Result<()> {
        if domain.is_empty() {
            return Err(Error::invalid_input("domain cannot be empty"));
        }
        record.validate()?;

        let url = self.records_url(domain, record_id)?;
        let body = serde_json::to_value(record)?;
        self.call(method, url, Some(&body)).await?;
        Ok(())
    }
}

#[async_trait]
impl DnsProvider for NameComProvider {
    async fn list_records(&self, domain: &str) -> Result<Option<Vec<DnsRecord>>> {
        let url = self.records_url(domain, None)?;
        let response = self.call(Method::GET, url, None).await?;

        let listing: RecordListing = serde_json::from_str(&response.body)?;
        match listing.records {
            Some(records) => {
                tracing::debug!("Listed {} record(s) for {}", records.len(), domain);
                Ok(Some(records))
            }
            None => {
                tracing::debug!(
                    "Record listing for {} has no records field: {}",
                    domain,
                    response.body
                );
                Ok(None)
            }
        }
    }

    async fn create_record(&self, domain: &str, record: &RecordWrite) -> Result<()> {
        self.write(Method::POST, domain, None, record).await?;
        tracing::info!(
            "Created {} record {}.{} -> {}",
            record.record_type,
            record.host,
            domain,
            record.answer
        );
        Ok(())
    }

    async fn update_record(&self, domain: &str, record_id: u64, record: &RecordWrite) -> Result<()> {
        self.write(Method::PUT, domain, Some(record_id), record).await?;
        tracing::info!(
            "Updated {} record {} ({}.{}) -> {}",
            record.record_type,
            record_id,
            record.host,
            domain,
            record.answer
        );
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "namecom"
    }
}
