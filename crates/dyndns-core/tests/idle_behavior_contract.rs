//! Contract Test: Nothing to reconcile
//!
//! Constraints verified:
//! - With neither family discovered the cycle fails and writes nothing
//! - One missing family is skipped without affecting the other

mod common;

use common::*;
use dyndns_core::traits::{IpVersion, RecordType};
use dyndns_core::{Error, FamilyOutcome};
use tokio_test::assert_err;

#[tokio::test]
async fn no_public_address_is_an_error() {
    let provider = MockDnsProvider::new(vec![
        dns_record(1, RecordType::A, HOST, "198.51.100.2"),
        dns_record(2, RecordType::Aaaa, HOST, "2001:db8::2"),
    ]);
    let harness = Harness::new(None, None, provider);

    let result = harness
        .engine
        .update_host_dns_to_current_addresses(HOST, DOMAIN)
        .await;

    let err = assert_err!(result);
    assert!(matches!(err, Error::NoPublicAddress));
    assert_eq!(err.to_string(), "No public IP addresses found");
    assert!(harness.provider.writes().is_empty());
}

#[tokio::test]
async fn no_public_address_twice_still_writes_nothing() {
    let harness = Harness::new(None, None, MockDnsProvider::new(Vec::new()));

    for _ in 0..2 {
        assert!(
            harness
                .engine
                .update_host_dns_to_current_addresses(HOST, DOMAIN)
                .await
                .is_err()
        );
    }

    assert!(harness.provider.writes().is_empty());
    assert_eq!(harness.ipv4.call_count(), 2);
    assert_eq!(harness.ipv6.call_count(), 2);
}

#[tokio::test]
async fn ipv4_only_host_skips_aaaa() {
    let harness = Harness::new(Some("203.0.113.7"), None, MockDnsProvider::new(Vec::new()));

    let report = harness
        .engine
        .update_host_dns_to_current_addresses(HOST, DOMAIN)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.ipv6, FamilyOutcome::Unavailable);
    assert!(report.ipv4.is_write());
    assert_eq!(harness.engine.last_applied(IpVersion::V6).await, None);
}

#[tokio::test]
async fn ipv6_only_host_skips_a() {
    let harness = Harness::new(None, Some("2001:db8::7"), MockDnsProvider::new(Vec::new()));

    let report = harness
        .engine
        .update_host_dns_to_current_addresses(HOST, DOMAIN)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.ipv4, FamilyOutcome::Unavailable);
    assert!(report.ipv6.is_write());
    assert_eq!(harness.provider.writes().len(), 1);
}
