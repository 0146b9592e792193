// # IP Source Trait
//
// Defines the interface for discovering the current public address of one
// address family.
//
// ## Implementations
//
// - HTTP "what is my IP" endpoints: `dyndns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use dyndns_core::IpSource;
//
// #[tokio::main]
// async fn main() {
//     let source = /* IpSource implementation */;
//
//     match source.current().await {
//         Some(address) => println!("public {:?} address: {}", source.version(), address),
//         None => println!("no {:?} connectivity", source.version()),
//     }
// }
// ```

use async_trait::async_trait;
use std::fmt;
use std::net::IpAddr;

use super::dns_provider::RecordType;

/// IP version (v4 or v6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    /// DNS record type that carries addresses of this family
    pub fn record_type(self) -> RecordType {
        match self {
            IpVersion::V4 => RecordType::A,
            IpVersion::V6 => RecordType::Aaaa,
        }
    }

    /// Whether `ip` belongs to this family
    pub fn matches(self, ip: &IpAddr) -> bool {
        match self {
            IpVersion::V4 => ip.is_ipv4(),
            IpVersion::V6 => ip.is_ipv6(),
        }
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpVersion::V4 => f.write_str("IPv4"),
            IpVersion::V6 => f.write_str("IPv6"),
        }
    }
}

/// Trait for IP source implementations
///
/// An IP source answers a single question: what is the public address of
/// this machine for one address family, right now.
///
/// # Failure model
///
/// Discovery never fails loudly. A transport error, a non-200 status or an
/// unusable body all collapse into `None` ("unavailable"). Implementations
/// log the reason themselves; the engine only sees the absence of an
/// address and decides what that means for the cycle.
///
/// # Forbidden Capabilities
/// - ❌ Perform DNS updates (use `DnsProvider`)
/// - ❌ Remember previously discovered addresses (owned by `DdnsEngine`)
/// - ❌ Implement retry logic or polling loops (the daemon schedules cycles)
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current public address
    ///
    /// # Returns
    ///
    /// - `Some(String)`: The address as reported by the detection service
    /// - `None`: The address is unavailable this time
    async fn current(&self) -> Option<String>;

    /// Get the IP version this source discovers
    fn version(&self) -> IpVersion;
}
