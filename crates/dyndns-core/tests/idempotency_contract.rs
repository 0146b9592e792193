//! Contract Test: State Model & Idempotency
//!
//! Constraints verified:
//! - An address already applied never triggers a second write
//! - Comparison is against the last applied address, not the last seen one
//! - A restarted engine starts with empty state and writes again

mod common;

use common::*;
use dyndns_core::FamilyOutcome;
use dyndns_core::traits::{IpVersion, RecordType};

#[tokio::test]
async fn identical_addresses_write_once() {
    let harness = Harness::new(
        Some("203.0.113.7"),
        Some("2001:db8::7"),
        MockDnsProvider::new(Vec::new()),
    );

    for _ in 0..2 {
        harness
            .engine
            .update_host_dns_to_current_addresses(HOST, DOMAIN)
            .await
            .unwrap();
    }

    // One write per family, all in the first cycle
    assert_eq!(harness.provider.writes().len(), 2);
}

#[tokio::test]
async fn unchanged_address_leaves_state_alone() {
    let harness = Harness::new(Some("203.0.113.7"), None, MockDnsProvider::new(Vec::new()));

    harness
        .engine
        .update_host_dns_to_current_addresses(HOST, DOMAIN)
        .await
        .unwrap();
    let report = harness
        .engine
        .update_host_dns_to_current_addresses(HOST, DOMAIN)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        report.ipv4,
        FamilyOutcome::Unchanged {
            address: "203.0.113.7".to_string()
        }
    );
    assert_eq!(harness.provider.writes().len(), 1);
    assert_eq!(
        harness.engine.last_applied(IpVersion::V4).await.as_deref(),
        Some("203.0.113.7")
    );
}

#[tokio::test]
async fn address_change_triggers_new_write() {
    let provider = MockDnsProvider::new(vec![dns_record(3, RecordType::A, HOST, "198.51.100.2")]);
    let harness = Harness::new(Some("203.0.113.7"), None, provider);

    harness
        .engine
        .update_host_dns_to_current_addresses(HOST, DOMAIN)
        .await
        .unwrap();

    harness.ipv4.set(Some("203.0.113.8"));
    harness
        .engine
        .update_host_dns_to_current_addresses(HOST, DOMAIN)
        .await
        .unwrap();

    assert_eq!(harness.provider.writes().len(), 2);
    assert_eq!(
        harness.engine.last_applied(IpVersion::V4).await.as_deref(),
        Some("203.0.113.8")
    );
}

#[tokio::test]
async fn flapping_back_after_failed_write_reapplies() {
    let provider = MockDnsProvider::new(vec![dns_record(3, RecordType::A, HOST, "198.51.100.2")]);
    let harness = Harness::new(Some("203.0.113.7"), None, provider);

    // Cycle 1: applied
    harness
        .engine
        .update_host_dns_to_current_addresses(HOST, DOMAIN)
        .await
        .unwrap();

    // Cycle 2: new address, write fails
    harness.ipv4.set(Some("203.0.113.8"));
    harness.provider.fail_writes_for(RecordType::A);
    harness
        .engine
        .update_host_dns_to_current_addresses(HOST, DOMAIN)
        .await
        .unwrap();

    // Cycle 3: back to the applied address, nothing to do
    harness.ipv4.set(Some("203.0.113.7"));
    harness.provider.recover_writes_for(RecordType::A);
    let report = harness
        .engine
        .update_host_dns_to_current_addresses(HOST, DOMAIN)
        .await
        .unwrap()
        .unwrap();

    assert!(matches!(report.ipv4, FamilyOutcome::Unchanged { .. }));
    assert_eq!(harness.provider.writes().len(), 2);
}

#[tokio::test]
async fn restart_starts_with_empty_state() {
    let provider = MockDnsProvider::new(vec![dns_record(3, RecordType::A, HOST, "203.0.113.7")]);

    let first = Harness::new(Some("203.0.113.7"), None, provider.clone());
    first
        .engine
        .update_host_dns_to_current_addresses(HOST, DOMAIN)
        .await
        .unwrap();
    drop(first);

    let second = Harness::new(Some("203.0.113.7"), None, provider.clone());
    second
        .engine
        .update_host_dns_to_current_addresses(HOST, DOMAIN)
        .await
        .unwrap();

    // Nothing is persisted, so the restarted engine writes again
    assert_eq!(provider.writes().len(), 2);
}
