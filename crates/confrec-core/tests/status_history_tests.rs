//! Config Status History Tests
//!
//! Status records written by the orchestrator, queried through the manager.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{service_with, site_definition, site_properties, RecordingApplier};
use confrec_core::model::{ApplyStatus, ConfigSnapshots, Operation};
use confrec_core::status::ConfigStatusManager;
use confrec_core::{ApplyRequest, ConfigError, InMemoryStatusStore};

#[test]
fn test_failure_success_failure_history() {
    // GIVEN three attempts for one package: FAILURE, SUCCESS, FAILURE
    let mut manager = ConfigStatusManager::new(Box::new(InMemoryStatusStore::new()));
    let first = manager.create("pkg.hist");
    let second = manager.create("pkg.hist").with_status(ApplyStatus::Success);
    let third = manager.create("pkg.hist").with_message("boom");
    for record in [&first, &second, &third] {
        manager.save(record).unwrap();
    }

    // THEN the last successful is the middle one and the latest is the third
    let last_ok = manager.find_last_successful("pkg.hist").unwrap().unwrap();
    assert_eq!(last_ok.id, second.id);
    let latest = manager.find_latest("pkg.hist").unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].id, third.id);
    assert_eq!(latest[0].message.as_deref(), Some("boom"));

    // AND history is ordered oldest first
    let ids: Vec<_> = manager.find("pkg.hist").unwrap().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![first.id, second.id, third.id]);
}

#[test]
fn test_snapshots_travel_with_the_record() {
    let applier = RecordingApplier::new();
    let mut service = service_with(&applier);
    let snapshots = ConfigSnapshots {
        local: Some("properties: []".to_string()),
        default: None,
        definition: Some("handlers: []".to_string()),
    };

    let report = service
        .apply(
            ApplyRequest::new("pkg.snap", site_definition(), site_properties("snap", "S"))
                .with_snapshots(snapshots.clone()),
        )
        .unwrap();

    let stored = service
        .status()
        .find_last_successful("pkg.snap")
        .unwrap()
        .unwrap();
    assert_eq!(stored.id, report.record.id);
    assert_eq!(stored.snapshots, snapshots);
}

#[test]
fn test_record_failure_for_unparsable_package() {
    let applier = RecordingApplier::new();
    let mut service = service_with(&applier);
    let err = ConfigError::MalformedInput {
        reason: "bad yaml".to_string(),
    };

    let record = service
        .record_failure("pkg.broken", Operation::Apply, ConfigSnapshots::default(), &err)
        .unwrap();

    assert_eq!(record.status, ApplyStatus::Failure);
    assert!(record.message.as_deref().unwrap().contains("bad yaml"));
    assert!(service.status().find_last_successful("pkg.broken").unwrap().is_none());
}

#[test]
fn test_purge_by_pattern() {
    let applier = RecordingApplier::new();
    let mut service = service_with(&applier);
    for (package, site) in [("shop.a", "a"), ("shop.b", "b"), ("blog", "c")] {
        service
            .apply(ApplyRequest::new(package, site_definition(), site_properties(site, "T")))
            .unwrap();
    }

    let removed = service.status_mut().delete("shop.%").unwrap();

    assert_eq!(removed, 2);
    let names: Vec<String> = service
        .status()
        .find_latest("%")
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["blog".to_string()]);
}
