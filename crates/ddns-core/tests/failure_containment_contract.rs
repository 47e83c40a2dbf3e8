//! Architectural Contract Test: Failure Containment
//!
//! Constraints verified:
//! - A failing family does not stop the next family
//! - No mutation without a resolved address
//! - No update without confirmed current content
//! - No create when the record lookup itself failed
//! - A failed pass leaves the next pass free to converge
//!
//! If this test fails, a transient error can either abort a pass or cause
//! a blind write.

mod common;

use common::*;
use ddns_core::{
    AddressSource, AddressSpec, Error, FamilyOutcome, Mode, RecordFamily, RecordTypeSelector,
    StaticAddressSource,
};
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn unavailable_ipv4_does_not_block_ipv6() {
    let directory = MockDirectory::new();
    let addresses = ScriptedAddressSource::new();
    addresses.set(RecordFamily::Aaaa, "2001:db8::1");

    let reconciler = reconciler(
        target(RecordTypeSelector::Both, Mode::Upsert),
        &directory,
        &addresses,
    );

    let report = reconciler.run_pass().await;

    assert!(matches!(
        report.outcome(RecordFamily::A),
        Some(FamilyOutcome::Failed(Error::AddressUnavailable { family: RecordFamily::A, .. }))
    ));
    assert!(matches!(
        report.outcome(RecordFamily::Aaaa),
        Some(FamilyOutcome::Created { .. })
    ));
    assert_eq!(report.failures(), 1);
    assert_eq!(directory.record_count(RecordFamily::A), 0);
}

#[tokio::test]
async fn unavailable_address_issues_no_directory_calls() {
    let directory = MockDirectory::new();
    directory.insert(RecordFamily::A, "198.51.100.7");
    let addresses = ScriptedAddressSource::new();

    let reconciler = reconciler(
        target(RecordTypeSelector::A, Mode::Upsert),
        &directory,
        &addresses,
    );

    reconciler.run_pass().await;

    assert!(directory.calls().is_empty());
    assert_eq!(directory.content(RecordFamily::A).as_deref(), Some("198.51.100.7"));
}

#[tokio::test]
async fn failed_content_read_prevents_update() {
    let directory = MockDirectory::new();
    directory.insert(RecordFamily::A, "198.51.100.7");
    directory.fail(Op::ReadContent);
    let addresses = ScriptedAddressSource::new();
    addresses.set(RecordFamily::A, "203.0.113.5");

    let reconciler = reconciler(
        target(RecordTypeSelector::A, Mode::Upsert),
        &directory,
        &addresses,
    );

    let report = reconciler.run_pass().await;

    assert_eq!(report.failures(), 1);
    assert!(directory.mutations().is_empty());
    assert_eq!(directory.content(RecordFamily::A).as_deref(), Some("198.51.100.7"));
}

#[tokio::test]
async fn malformed_content_read_prevents_update() {
    let directory = MockDirectory::new();
    directory.insert(RecordFamily::A, "198.51.100.7");
    directory.malformed_reads();
    let addresses = ScriptedAddressSource::new();
    addresses.set(RecordFamily::A, "203.0.113.5");

    let reconciler = reconciler(
        target(RecordTypeSelector::A, Mode::Upsert),
        &directory,
        &addresses,
    );

    let report = reconciler.run_pass().await;

    assert!(matches!(
        report.outcome(RecordFamily::A),
        Some(FamilyOutcome::Failed(Error::DirectoryCallFailed(_)))
    ));
    assert!(directory.mutations().is_empty());
}

#[tokio::test]
async fn failed_lookup_prevents_create() {
    let directory = MockDirectory::new();
    directory.fail(Op::FindRecord);
    let addresses = ScriptedAddressSource::new();
    addresses.set(RecordFamily::A, "203.0.113.5");

    let reconciler = reconciler(
        target(RecordTypeSelector::A, Mode::Upsert),
        &directory,
        &addresses,
    );

    let report = reconciler.run_pass().await;

    assert_eq!(report.failures(), 1);
    assert!(directory.mutations().is_empty());
    assert_eq!(directory.record_count(RecordFamily::A), 0);
}

#[tokio::test]
async fn failed_mutation_is_reported_and_retried_next_pass() {
    let directory = MockDirectory::new();
    directory.fail(Op::Create);
    let addresses = ScriptedAddressSource::new();
    addresses.set(RecordFamily::A, "203.0.113.5");

    let reconciler = reconciler(
        target(RecordTypeSelector::A, Mode::Upsert),
        &directory,
        &addresses,
    );

    let first = reconciler.run_pass().await;
    match first.outcome(RecordFamily::A) {
        Some(FamilyOutcome::Failed(e)) => {
            assert!(e.to_string().contains("Create rejected"), "got: {}", e);
            assert!(!e.is_fatal());
        }
        other => panic!("expected failure, got {:?}", other),
    }

    directory.recover(Op::Create);
    let second = reconciler.run_pass().await;

    assert!(second.is_success());
    assert_eq!(directory.content(RecordFamily::A).as_deref(), Some("203.0.113.5"));
}

#[tokio::test]
async fn static_source_rejects_mapped_ipv4_for_a() {
    let spec = AddressSpec::parse("::ffff:203.0.113.5,2001:db8::1");
    let addresses = assert_ok!(StaticAddressSource::new(spec));

    let err = assert_err!(addresses.resolve(RecordFamily::A).await);
    assert!(matches!(
        err,
        Error::AddressUnavailable {
            family: RecordFamily::A,
            ..
        }
    ));
    let v6 = assert_ok!(addresses.resolve(RecordFamily::Aaaa).await);
    assert_eq!(v6.as_str(), "2001:db8::1");
}
