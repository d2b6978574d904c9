// Integration tests for the SQLite status log and claims registry

use std::collections::BTreeSet;

use confrec_core::claims::TargetClaims;
use confrec_core::model::{
    ApplyStatus, ConfigDefinition, HandlerDef, Operation, PropertySet, SetterDef,
};
use confrec_core::status::ConfigStatusManager;
use confrec_core::{
    ApplyRequest, ConfigError, ConfigService, PropertyApplier, SetterInvocation, SetterRegistry,
};
use confrec_store::db::open_status_db;
use confrec_store::{SqliteStatusStore, SqliteTargetClaims};

struct Accept;

impl PropertyApplier for Accept {
    fn apply(&mut self, _invocation: &SetterInvocation<'_>) -> confrec_core::Result<()> {
        Ok(())
    }
}

fn definition(target: &str) -> ConfigDefinition {
    ConfigDefinition::new().with_handler(
        HandlerDef::new("site", "site", target)
            .with_setter(SetterDef::new("title").with_property("title", "${title}")),
    )
}

#[test]
fn test_failure_success_failure_survives_reopen() {
    // Given: A status database on disk
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("status.db");

    let (second_id, third_id) = {
        let store = SqliteStatusStore::new(open_status_db(&path).unwrap());
        let mut manager = ConfigStatusManager::new(Box::new(store));

        // When: FAILURE, SUCCESS, FAILURE are saved
        let first = manager.create("pkg.site");
        let second = manager.create("pkg.site").with_status(ApplyStatus::Success);
        let third = manager.create("pkg.site").with_message("boom");
        for record in [&first, &second, &third] {
            assert!(manager.save(record).unwrap());
        }
        // And: A duplicate save is ignored
        assert!(!manager.save(&third).unwrap());
        (second.id, third.id)
    };

    // Then: A new manager over the reopened file sees the same history
    let store = SqliteStatusStore::new(open_status_db(&path).unwrap());
    let manager = ConfigStatusManager::new(Box::new(store));
    assert_eq!(manager.find("pkg.site").unwrap().len(), 3);
    assert_eq!(
        manager.find_last_successful("pkg.site").unwrap().unwrap().id,
        second_id
    );
    let latest = manager.find_latest("pkg.%").unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].id, third_id);
    assert_eq!(latest[0].message.as_deref(), Some("boom"));
}

#[test]
fn test_equal_timestamps_keep_insertion_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("status.db");
    let store = SqliteStatusStore::new(open_status_db(&path).unwrap());
    let mut manager = ConfigStatusManager::new(Box::new(store));

    let anchor = manager.create("a");
    manager.save(&anchor).unwrap();
    let at = anchor.applied_at;
    let first = confrec_core::model::ConfigStatus::new("x", at);
    let second = confrec_core::model::ConfigStatus::new("y", at);
    manager.save(&first).unwrap();
    manager.save(&second).unwrap();

    let names: Vec<String> = manager
        .find("_")
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["a".to_string(), "x".to_string(), "y".to_string()]);
}

#[test]
fn test_service_over_sqlite_stores() {
    // Given: A service whose status log and claims live in one database file
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("confrec.db");
    let mut service = ConfigService::new(
        Box::new(SqliteStatusStore::new(open_status_db(&path).unwrap())),
        Box::new(SqliteTargetClaims::new(open_status_db(&path).unwrap())),
        SetterRegistry::new().with_applier("site", Box::new(Accept)),
    );
    let props = PropertySet::new().with_scalar("title", "Home");

    // When: Two packages target the same site
    service
        .apply(ApplyRequest::new("pkg.a", definition("home"), props.clone()))
        .unwrap();
    let err = service
        .apply(ApplyRequest::new("pkg.b", definition("home"), props))
        .unwrap_err();

    // Then: The second is a recorded conflict
    assert!(matches!(err, ConfigError::ValidationConflict { .. }));
    let latest = service.status().find_latest("pkg.%").unwrap();
    let statuses: Vec<(String, ApplyStatus, Operation)> = latest
        .into_iter()
        .map(|r| (r.name, r.status, r.operation))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("pkg.a".to_string(), ApplyStatus::Success, Operation::Apply),
            ("pkg.b".to_string(), ApplyStatus::Failure, Operation::Apply),
        ]
    );

    // And: The claim is visible through a separate connection
    let claims = SqliteTargetClaims::new(open_status_db(&path).unwrap());
    let expected: BTreeSet<String> = ["site:home".to_string()].into_iter().collect();
    assert_eq!(claims.claims_of("pkg.a").unwrap(), expected);
    assert!(claims.claims_of_others("pkg.a").unwrap().is_empty());
}
