//! Core reconciliation engine
//!
//! The DdnsEngine is responsible for:
//! - Looking up the existing A/AAAA records of the domain
//! - Discovering the current public IPv4 and IPv6 addresses
//! - Creating or updating records whose address changed
//! - Remembering what was applied so unchanged addresses cost no writes
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐
//! │ IpSource v4  │   │ IpSource v6  │
//! └──────────────┘   └──────────────┘
//!         │                  │
//!         └────────┬─────────┘
//!                  ▼
//!         ┌──────────────┐          ┌──────────────┐
//!         │  DdnsEngine  │◀────────▶│ UpdaterState │
//!         └──────────────┘          └──────────────┘
//!                  │
//!                  ▼
//!         ┌──────────────┐
//!         │ DnsProvider  │  list / create / update
//!         └──────────────┘
//! ```
//!
//! ## Cycle Flow
//!
//! 1. List the domain's records; a registrar error aborts the cycle, a
//!    body without a records field ends it quietly
//! 2. Discover both families concurrently; none at all aborts the cycle
//! 3. Per family: skip if unavailable or already applied, otherwise update
//!    the first existing record of that type or create one
//! 4. Remember the address only after the registrar accepted the write
//!
//! A failed write is confined to its own family and reported in the
//! [`CycleReport`]; the other family is always attempted.

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::state::UpdaterState;
use crate::traits::{DnsProvider, DnsRecord, IpSource, IpVersion, RecordType, RecordWrite};
use std::time::Duration;
use tokio::sync::{Mutex, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// What happened to one address family during a cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FamilyOutcome {
    /// No record of this type existed, one was created
    Created {
        address: String,
    },

    /// The first existing record of this type was replaced
    Updated {
        record_id: u64,
        address: String,
    },

    /// The discovered address was already applied, nothing written
    Unchanged {
        address: String,
    },

    /// No address of this family could be discovered
    Unavailable,

    /// The registrar write failed, state untouched
    Failed {
        error: String,
    },
}

impl FamilyOutcome {
    /// Whether this outcome issued a successful write
    pub fn is_write(&self) -> bool {
        matches!(self, FamilyOutcome::Created { .. } | FamilyOutcome::Updated { .. })
    }

    /// Whether this outcome is a failed write
    pub fn is_failure(&self) -> bool {
        matches!(self, FamilyOutcome::Failed { .. })
    }
}

/// Per-family result of one reconciliation cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub ipv4: FamilyOutcome,
    pub ipv6: FamilyOutcome,
}

impl CycleReport {
    /// Outcome for one family
    pub fn outcome(&self, version: IpVersion) -> &FamilyOutcome {
        match version {
            IpVersion::V4 => &self.ipv4,
            IpVersion::V6 => &self.ipv6,
        }
    }

    /// Whether any family failed to write
    pub fn has_failures(&self) -> bool {
        self.ipv4.is_failure() || self.ipv6.is_failure()
    }
}

/// First A and first AAAA record IDs of the domain listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExistingRecords {
    pub a: Option<u64>,
    pub aaaa: Option<u64>,
}

impl ExistingRecords {
    /// Pick the first record of each address type in the listing
    ///
    /// Host labels are not compared. Later duplicates are ignored; only the
    /// earliest record of each type is managed.
    pub fn find(records: &[DnsRecord]) -> Self {
        let mut existing = Self::default();

        for record in records {
            let slot = match record.record_type {
                RecordType::A => &mut existing.a,
                RecordType::Aaaa => &mut existing.aaaa,
                RecordType::Other => continue,
            };
            if slot.is_none() {
                *slot = Some(record.id);
            } else {
                debug!("Ignoring later {} record {}", record.record_type, record.id);
            }
        }

        existing
    }

    /// Record ID for one family
    pub fn id_for(&self, version: IpVersion) -> Option<u64> {
        match version {
            IpVersion::V4 => self.a,
            IpVersion::V6 => self.aaaa,
        }
    }
}

/// Core reconciliation engine
///
/// One instance per process. The remembered addresses live inside the
/// engine behind an async mutex; a cycle holds that mutex from start to
/// finish, so overlapping cycles are rejected instead of interleaved.
///
/// ## Lifecycle
///
/// 1. Create with [`DdnsEngine::new()`]
/// 2. Either drive single cycles with
///    [`DdnsEngine::update_host_dns_to_current_addresses()`] or hand
///    control to [`DdnsEngine::run_with_shutdown()`]
pub struct DdnsEngine {
    /// Source for the public IPv4 address
    ipv4_source: Box<dyn IpSource>,

    /// Source for the public IPv6 address
    ipv6_source: Box<dyn IpSource>,

    /// Registrar client
    provider: Box<dyn DnsProvider>,

    /// TTL applied to every write
    ttl: u32,

    /// Last-applied addresses
    state: Mutex<UpdaterState>,
}

impl DdnsEngine {
    /// Create a new engine
    ///
    /// # Parameters
    ///
    /// - `ipv4_source`: Source reporting [`IpVersion::V4`]
    /// - `ipv6_source`: Source reporting [`IpVersion::V6`]
    /// - `provider`: Registrar client
    /// - `config`: Engine settings (TTL)
    pub fn new(
        ipv4_source: Box<dyn IpSource>,
        ipv6_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        config: &EngineConfig,
    ) -> Result<Self> {
        config.validate()?;

        if ipv4_source.version() != IpVersion::V4 {
            return Err(Error::config("IPv4 source must discover IPv4 addresses"));
        }
        if ipv6_source.version() != IpVersion::V6 {
            return Err(Error::config("IPv6 source must discover IPv6 addresses"));
        }

        Ok(Self {
            ipv4_source,
            ipv6_source,
            provider,
            ttl: config.ttl_secs,
            state: Mutex::new(UpdaterState::new()),
        })
    }

    /// Last address successfully applied for a family
    pub async fn last_applied(&self, version: IpVersion) -> Option<String> {
        self.state
            .lock()
            .await
            .last_applied(version)
            .map(str::to_owned)
    }

    /// Run one reconciliation cycle for `host` under `domain`
    ///
    /// # Returns
    ///
    /// - `Ok(Some(report))`: The cycle ran; see the per-family outcomes
    /// - `Ok(None)`: The record listing had no records field, nothing done
    /// - `Err(Error::CycleInProgress)`: Another cycle is running
    /// - `Err(Error::NoPublicAddress)`: Neither family was discovered
    /// - `Err(_)`: The record lookup failed
    pub async fn update_host_dns_to_current_addresses(
        &self,
        host: &str,
        domain: &str,
    ) -> Result<Option<CycleReport>> {
        let mut state = self.state.try_lock().map_err(|_| Error::CycleInProgress)?;

        debug!(
            "Listing {} records for {}",
            self.provider.provider_name(),
            domain
        );
        let records = match self.provider.list_records(domain).await {
            Ok(Some(records)) => records,
            Ok(None) => {
                warn!(
                    "Record listing for {} has no records field, skipping this cycle",
                    domain
                );
                return Ok(None);
            }
            Err(e) => {
                error!("Failed to list records for {}: {}", domain, e);
                return Err(e);
            }
        };
        let existing = ExistingRecords::find(&records);

        let (ipv4, ipv6) = tokio::join!(self.ipv4_source.current(), self.ipv6_source.current());
        if ipv4.is_none() && ipv6.is_none() {
            return Err(Error::NoPublicAddress);
        }

        let ipv4 = self
            .reconcile_family(&mut state, IpVersion::V4, ipv4, &existing, host, domain)
            .await;
        let ipv6 = self
            .reconcile_family(&mut state, IpVersion::V6, ipv6, &existing, host, domain)
            .await;

        Ok(Some(CycleReport { ipv4, ipv6 }))
    }

    /// Bring one family's record in line with its discovered address
    async fn reconcile_family(
        &self,
        state: &mut UpdaterState,
        version: IpVersion,
        discovered: Option<String>,
        existing: &ExistingRecords,
        host: &str,
        domain: &str,
    ) -> FamilyOutcome {
        let record_type = version.record_type();

        let Some(address) = discovered else {
            info!(
                "No public {} address found, skipping {} record",
                version, record_type
            );
            return FamilyOutcome::Unavailable;
        };

        if state.is_applied(version, &address) {
            info!(
                "{} address unchanged ({}), skipping {} record",
                version, address, record_type
            );
            return FamilyOutcome::Unchanged { address };
        }

        let write = RecordWrite::new(host, record_type, address.as_str(), self.ttl);
        let result = match existing.id_for(version) {
            Some(record_id) => {
                info!(
                    "Updating {} record {} for {}.{} -> {}",
                    record_type, record_id, host, domain, address
                );
                self.provider
                    .update_record(domain, record_id, &write)
                    .await
                    .map(|()| FamilyOutcome::Updated {
                        record_id,
                        address: address.clone(),
                    })
            }
            None => {
                info!(
                    "Creating {} record for {}.{} -> {}",
                    record_type, host, domain, address
                );
                self.provider
                    .create_record(domain, &write)
                    .await
                    .map(|()| FamilyOutcome::Created {
                        address: address.clone(),
                    })
            }
        };

        match result {
            Ok(outcome) => {
                state.record_applied(version, address);
                outcome
            }
            Err(e) => {
                error!(
                    "Failed to write {} record for {}.{}: {}",
                    record_type, host, domain, e
                );
                FamilyOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Run a cycle and log how it went
    ///
    /// Errors are logged, never returned.
    pub async fn run_cycle(&self, host: &str, domain: &str) {
        match self.update_host_dns_to_current_addresses(host, domain).await {
            Ok(Some(report)) => {
                for version in [IpVersion::V4, IpVersion::V6] {
                    match report.outcome(version) {
                        FamilyOutcome::Failed { error: reason } => {
                            error!("{} update failed: {}", version, reason)
                        }
                        outcome => debug!("{} outcome: {:?}", version, outcome),
                    }
                }
                info!("Reconciliation cycle for {}.{} finished", host, domain);
            }
            Ok(None) => {}
            Err(e) => error!("Reconciliation cycle for {}.{} failed: {}", host, domain, e),
        }
    }

    /// Run a cycle now and then every `interval` until shutdown
    ///
    /// A shutdown request stops the timer. A cycle that is already running
    /// is allowed to finish first. Dropping the sender counts as a request.
    pub async fn run_with_shutdown(
        &self,
        host: &str,
        domain: &str,
        interval: Duration,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Managing {}.{} every {:?} (TTL {}s)",
            host, domain, interval, self.ttl
        );

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown_rx => {
                    info!("Shutdown requested, stopping update timer");
                    break;
                }

                _ = ticker.tick() => {
                    self.run_cycle(host, domain).await;
                }
            }
        }
    }
}
