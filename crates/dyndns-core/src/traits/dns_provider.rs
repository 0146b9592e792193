// # DNS Provider Trait
//
// Defines the interface for reading and writing DNS records via a
// registrar API.
//
// ## Implementations
//
// - name.com v4 API: `dyndns-provider-namecom` crate
//
// ## Usage
//
// ```rust,ignore
// use dyndns_core::traits::{DnsProvider, RecordType, RecordWrite};
//
// #[tokio::main]
// async fn main() -> dyndns_core::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     let records = provider.list_records("example.com").await?.unwrap_or_default();
//     println!("{} record(s)", records.len());
//
//     provider.create_record(
//         "example.com",
//         &RecordWrite::new("home", RecordType::A, "203.0.113.7", 300),
//     ).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// DNS record type as seen by the updater
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// IPv4 address record
    #[serde(rename = "A")]
    A,
    /// IPv6 address record
    #[serde(rename = "AAAA")]
    Aaaa,
    /// Any other type (CNAME, MX, TXT, ...), ignored by the engine
    #[serde(other)]
    Other,
}

impl RecordType {
    /// Wire name of the record type
    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Other => "OTHER",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A DNS record as listed by the registrar
///
/// Only `id` and `record_type` drive decisions. The remaining fields are
/// kept for logging and are optional because registrars omit them freely
/// (name.com leaves out `host` for apex records).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Registrar-assigned identifier
    pub id: u64,

    /// Record type
    #[serde(rename = "type")]
    pub record_type: RecordType,

    /// Host label
    #[serde(default)]
    pub host: Option<String>,

    /// Record data (the address for A/AAAA)
    #[serde(default)]
    pub answer: Option<String>,

    /// Time-to-live in seconds
    #[serde(default)]
    pub ttl: Option<u32>,
}

/// Body of a create or update call: `{host, type, answer, ttl}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordWrite {
    pub host: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub answer: String,
    pub ttl: u32,
}

impl RecordWrite {
    /// Create a new record write
    pub fn new(
        host: impl Into<String>,
        record_type: RecordType,
        answer: impl Into<String>,
        ttl: u32,
    ) -> Self {
        Self {
            host: host.into(),
            record_type,
            answer: answer.into(),
            ttl,
        }
    }

    /// Check the write preconditions
    ///
    /// Every string must be non-empty, the type must be A or AAAA and the
    /// TTL must be positive. Violations are programming errors and are
    /// never retried.
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(Error::invalid_input("record host cannot be empty"));
        }
        if self.answer.is_empty() {
            return Err(Error::invalid_input("record answer cannot be empty"));
        }
        if self.record_type == RecordType::Other {
            return Err(Error::invalid_input("record type must be A or AAAA"));
        }
        if self.ttl == 0 {
            return Err(Error::invalid_input("record TTL must be a positive integer"));
        }
        Ok(())
    }
}

/// Trait for DNS provider implementations
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTPS API calls to their endpoint, following redirects
/// - ✅ Parse provider-specific responses
/// - ✅ Validate write preconditions before sending anything
///
/// ## Forbidden Capabilities
/// - ❌ Implement retry logic (a failed cycle is retried on the next tick)
/// - ❌ Remember applied addresses (owned by `DdnsEngine`)
/// - ❌ Decide whether a write is needed (owned by `DdnsEngine`)
///
/// Every method performs exactly one logical API call. A response with a
/// status of 400 or above is returned as [`Error::Api`].
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List all DNS records of a domain
    ///
    /// # Returns
    ///
    /// - `Ok(Some(records))`: The records, in registrar order
    /// - `Ok(None)`: The response had no records field (malformed body)
    /// - `Err(Error)`: Transport failure or registrar error status
    async fn list_records(&self, domain: &str) -> Result<Option<Vec<DnsRecord>>>;

    /// Create a new record
    async fn create_record(&self, domain: &str, record: &RecordWrite) -> Result<()>;

    /// Replace an existing record
    async fn update_record(&self, domain: &str, record_id: u64, record: &RecordWrite)
    -> Result<()>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
