#![allow(clippy::unwrap_used, clippy::expect_used)]

use confrec_core::logging_facility::Profile;
use confrec_core::SetterRegistry;
use confrec_engine::{open_service, EngineSettings};

#[test]
fn test_open_service_installs_configured_subscriber() {
    // GIVEN settings that choose the test logging profile
    let dir = tempfile::tempdir().unwrap();
    let text = format!(
        "status_db = {:?}\n\n[logging]\nprofile = \"test\"\n",
        dir.path().join("status.db").display().to_string()
    );
    let settings = EngineSettings::from_toml_str(&text).unwrap();
    assert_eq!(settings.logging.profile, Profile::Test);
    assert!(!tracing::dispatcher::has_been_set());

    // WHEN a service is opened from them
    open_service(&settings, SetterRegistry::new()).unwrap();

    // THEN a global subscriber is in place
    assert!(tracing::dispatcher::has_been_set());
}
