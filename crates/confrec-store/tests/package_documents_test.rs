// Integration tests for reading and parsing a package directory

use std::fs;
use std::sync::{Arc, Mutex};

use confrec_core::model::{ObjectState, PropertyNode};
use confrec_core::{
    ApplyRequest, ConfigService, ExErrorKind, InMemoryStatusStore, InMemoryTargetClaims,
    PropertyApplier, SetterInvocation, SetterRegistry,
};
use confrec_store::package::PackageFiles;
use confrec_store::{parse_config_definition, parse_property_set};

const DEFINITION: &str = r#"
handlers:
  - name: site
    type: site
    target: "${site.name}"
    setters:
      - name: title
        properties:
          title: "${site.title}"
          port: "${site.port}"
"#;

const DEFAULTS: &str = r#"
properties:
  - name: site
    properties:
      - name: name
        value: home
      - name: title
        value: Default
      - name: port
        value: 8080
"#;

const LOCAL: &str = r#"
properties:
  - name: site
    properties:
      - name: title
        value: Local
"#;

#[derive(Clone, Default)]
struct Recorder {
    seen: Arc<Mutex<Vec<(String, ObjectState, String)>>>,
}

impl PropertyApplier for Recorder {
    fn apply(&mut self, invocation: &SetterInvocation<'_>) -> confrec_core::Result<()> {
        let rendered: Vec<String> = invocation
            .setter
            .current
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        self.seen.lock().unwrap().push((
            invocation.target.to_string(),
            invocation.state,
            rendered.join(","),
        ));
        Ok(())
    }
}

#[test]
fn test_package_directory_applies_end_to_end() {
    // Given: A package directory with all three documents
    let dir = tempfile::tempdir().unwrap();
    let files = PackageFiles::new(dir.path());
    fs::write(files.config_definition(), DEFINITION).unwrap();
    fs::write(files.default_config(), DEFAULTS).unwrap();
    fs::write(files.local_config(), LOCAL).unwrap();

    // When: The documents are read and parsed
    let sources = files.read().unwrap();
    let definition = parse_config_definition(&sources.definition).unwrap();
    let defaults = parse_property_set(sources.default.as_deref().unwrap()).unwrap();
    let local = parse_property_set(sources.local.as_deref().unwrap()).unwrap();

    // And: Applied through a service
    let recorder = Recorder::default();
    let mut service = ConfigService::new(
        Box::new(InMemoryStatusStore::new()),
        Box::new(InMemoryTargetClaims::new()),
        SetterRegistry::new().with_applier("site", Box::new(recorder.clone())),
    );
    let report = service
        .apply(
            ApplyRequest::new("pkg.files", definition, local)
                .with_defaults(defaults)
                .with_snapshots(sources.snapshots()),
        )
        .unwrap();

    // Then: The local title overrides the default and numbers arrive as text
    let seen = recorder.seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![(
            "home".to_string(),
            ObjectState::Current,
            "title=Local,port=8080".to_string()
        )]
    );
    assert_eq!(report.record.snapshots.local.as_deref(), Some(LOCAL));
    assert_eq!(report.record.snapshots.definition.as_deref(), Some(DEFINITION));
}

#[test]
fn test_optional_documents_may_be_missing() {
    let dir = tempfile::tempdir().unwrap();
    let files = PackageFiles::new(dir.path());
    fs::write(files.config_definition(), "handlers: []\n").unwrap();

    let sources = files.read().unwrap();

    assert!(sources.default.is_none());
    assert!(sources.local.is_none());
    assert!(parse_config_definition(&sources.definition)
        .unwrap()
        .handlers
        .is_empty());
}

#[test]
fn test_missing_definition_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();

    let err = PackageFiles::new(dir.path()).read().unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Io);
    assert!(err.message().contains("config-definition.yaml"));
}

#[test]
fn test_digest_tracks_content() {
    let dir = tempfile::tempdir().unwrap();
    let files = PackageFiles::new(dir.path());
    fs::write(files.config_definition(), DEFINITION).unwrap();
    let before = files.read().unwrap().digest();
    assert_eq!(before, files.read().unwrap().digest());

    fs::write(files.local_config(), LOCAL).unwrap();
    assert_ne!(before, files.read().unwrap().digest());
}

#[test]
fn test_nested_sets_parse_in_declaration_order() {
    let set = parse_property_set(DEFAULTS).unwrap();
    match set.get("site") {
        Some(PropertyNode::Set(site)) => {
            let names: Vec<&str> = site.properties.iter().map(|p| p.name.as_str()).collect();
            assert_eq!(names, vec!["name", "title", "port"]);
        }
        other => panic!("expected a set, got {:?}", other),
    }
}
