//! Test doubles and common utilities for engine contract tests
//!
//! The doubles record every call so tests can assert on exactly which
//! registrar writes a cycle issued.

#![allow(dead_code)]

use dyndns_core::error::{Error, Result};
use dyndns_core::traits::{DnsProvider, DnsRecord, IpSource, IpVersion, RecordType, RecordWrite};
use dyndns_core::{DdnsEngine, EngineConfig};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const HOST: &str = "home";
pub const DOMAIN: &str = "example.com";
pub const TTL: u32 = 300;

/// An IpSource whose answer the test controls
#[derive(Clone)]
pub struct StaticIpSource {
    version: IpVersion,
    address: Arc<Mutex<Option<String>>>,
    call_count: Arc<AtomicUsize>,
}

impl StaticIpSource {
    pub fn new(version: IpVersion, address: Option<&str>) -> Self {
        Self {
            version,
            address: Arc::new(Mutex::new(address.map(str::to_owned))),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Change what the next discovery returns
    pub fn set(&self, address: Option<&str>) {
        *self.address.lock().unwrap() = address.map(str::to_owned);
    }

    /// Number of times current() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for StaticIpSource {
    async fn current(&self) -> Option<String> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.address.lock().unwrap().clone()
    }

    fn version(&self) -> IpVersion {
        self.version
    }
}

/// A registrar call as seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    List {
        domain: String,
    },
    Create {
        domain: String,
        record: RecordWrite,
    },
    Update {
        domain: String,
        record_id: u64,
        record: RecordWrite,
    },
}

impl ProviderCall {
    pub fn is_write(&self) -> bool {
        !matches!(self, ProviderCall::List { .. })
    }
}

/// What list_records answers
#[derive(Debug, Clone)]
pub enum Listing {
    Records(Vec<DnsRecord>),
    MissingRecordsField,
    Status(u16, String),
}

/// A DnsProvider that records calls; clones share all state
#[derive(Clone)]
pub struct MockDnsProvider {
    calls: Arc<Mutex<Vec<ProviderCall>>>,
    listing: Arc<Mutex<Listing>>,
    failing_types: Arc<Mutex<HashSet<RecordType>>>,
    list_delay: Duration,
}

impl MockDnsProvider {
    pub fn new(records: Vec<DnsRecord>) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            listing: Arc::new(Mutex::new(Listing::Records(records))),
            failing_types: Arc::new(Mutex::new(HashSet::new())),
            list_delay: Duration::ZERO,
        }
    }

    /// Make list_records sleep before answering
    pub fn with_list_delay(mut self, delay: Duration) -> Self {
        self.list_delay = delay;
        self
    }

    pub fn set_listing(&self, listing: Listing) {
        *self.listing.lock().unwrap() = listing;
    }

    /// Make writes of this record type fail with a 500
    pub fn fail_writes_for(&self, record_type: RecordType) {
        self.failing_types.lock().unwrap().insert(record_type);
    }

    pub fn recover_writes_for(&self, record_type: RecordType) {
        self.failing_types.lock().unwrap().remove(&record_type);
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<ProviderCall> {
        self.calls().into_iter().filter(ProviderCall::is_write).collect()
    }

    fn write_result(&self, record: &RecordWrite) -> Result<()> {
        if self.failing_types.lock().unwrap().contains(&record.record_type) {
            return Err(Error::api(500, "internal error"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn list_records(&self, domain: &str) -> Result<Option<Vec<DnsRecord>>> {
        if !self.list_delay.is_zero() {
            tokio::time::sleep(self.list_delay).await;
        }

        self.calls.lock().unwrap().push(ProviderCall::List {
            domain: domain.to_string(),
        });

        match self.listing.lock().unwrap().clone() {
            Listing::Records(records) => Ok(Some(records)),
            Listing::MissingRecordsField => Ok(None),
            Listing::Status(status, body) => Err(Error::api(status, body)),
        }
    }

    async fn create_record(&self, domain: &str, record: &RecordWrite) -> Result<()> {
        self.calls.lock().unwrap().push(ProviderCall::Create {
            domain: domain.to_string(),
            record: record.clone(),
        });
        self.write_result(record)
    }

    async fn update_record(&self, domain: &str, record_id: u64, record: &RecordWrite) -> Result<()> {
        self.calls.lock().unwrap().push(ProviderCall::Update {
            domain: domain.to_string(),
            record_id,
            record: record.clone(),
        });
        self.write_result(record)
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Helper to build a listed record
pub fn dns_record(id: u64, record_type: RecordType, host: &str, answer: &str) -> DnsRecord {
    DnsRecord {
        id,
        record_type,
        host: Some(host.to_string()),
        answer: Some(answer.to_string()),
        ttl: Some(TTL),
    }
}

/// Test fixture: an engine wired to controllable doubles
pub struct Harness {
    pub engine: DdnsEngine,
    pub ipv4: StaticIpSource,
    pub ipv6: StaticIpSource,
    pub provider: MockDnsProvider,
}

impl Harness {
    pub fn new(ipv4: Option<&str>, ipv6: Option<&str>, provider: MockDnsProvider) -> Self {
        let ipv4 = StaticIpSource::new(IpVersion::V4, ipv4);
        let ipv6 = StaticIpSource::new(IpVersion::V6, ipv6);

        let config = EngineConfig {
            ttl_secs: TTL,
            ..EngineConfig::default()
        };

        let engine = DdnsEngine::new(
            Box::new(ipv4.clone()),
            Box::new(ipv6.clone()),
            Box::new(provider.clone()),
            &config,
        )
        .expect("engine construction succeeds");

        Self {
            engine,
            ipv4,
            ipv6,
            provider,
        }
    }
}
