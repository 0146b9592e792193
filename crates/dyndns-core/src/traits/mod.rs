//! Core traits for the updater
//!
//! This module defines the seams between the reconciliation engine and the
//! outside world.
//!
//! - [`IpSource`]: Discover the current public address of one family
//! - [`DnsProvider`]: List and write DNS records via the registrar API

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::{IpSource, IpVersion};
pub use dns_provider::{DnsProvider, DnsRecord, RecordType, RecordWrite};
