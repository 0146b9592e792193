// # Memory State
//
// In-memory record of the addresses most recently written to the registrar.
//
// ## Crash Behavior
//
// - All state is lost on restart/crash
// - First cycle after a restart treats both families as "changed" and
//   writes them, which is harmless because the registrar write is an
//   idempotent replace
//
// ## Invariant
//
// A slot only changes through `record_applied`, and the engine only calls
// it after the registrar accepted the write. A failed write leaves the slot
// untouched so the next cycle tries again.

use crate::traits::IpVersion;

/// Last-applied addresses for the A and AAAA records
///
/// # Example
///
/// ```rust
/// use dyndns_core::state::UpdaterState;
/// use dyndns_core::traits::IpVersion;
///
/// let mut state = UpdaterState::new();
/// assert!(!state.is_applied(IpVersion::V4, "203.0.113.7"));
///
/// state.record_applied(IpVersion::V4, "203.0.113.7");
/// assert!(state.is_applied(IpVersion::V4, "203.0.113.7"));
/// assert_eq!(state.last_applied(IpVersion::V6), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdaterState {
    last_ipv4_address: Option<String>,
    last_ipv6_address: Option<String>,
}

impl UpdaterState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Last address successfully applied for a family
    pub fn last_applied(&self, version: IpVersion) -> Option<&str> {
        match version {
            IpVersion::V4 => self.last_ipv4_address.as_deref(),
            IpVersion::V6 => self.last_ipv6_address.as_deref(),
        }
    }

    /// Whether `address` is byte-for-byte the last applied address
    pub fn is_applied(&self, version: IpVersion, address: &str) -> bool {
        self.last_applied(version) == Some(address)
    }

    /// Remember a successful write
    pub fn record_applied(&mut self, version: IpVersion, address: impl Into<String>) {
        let slot = match version {
            IpVersion::V4 => &mut self.last_ipv4_address,
            IpVersion::V6 => &mut self.last_ipv6_address,
        };
        *slot = Some(address.into());
    }
}
