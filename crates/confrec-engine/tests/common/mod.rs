use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use confrec_core::errors::Result;
use confrec_core::model::ObjectState;
use confrec_core::{ConfigService, PropertyApplier, SetterInvocation, SetterRegistry};
use confrec_engine::{open_service, EngineSettings};
use confrec_store::PackageFiles;
use tempfile::TempDir;

/// `(setter, target, state, "k=v,...")` per call
pub type Seen = (String, String, ObjectState, String);

#[derive(Clone, Default)]
pub struct Recorder {
    pub seen: Arc<Mutex<Vec<Seen>>>,
}

#[allow(dead_code)]
impl Recorder {
    pub fn take(&self) -> Vec<Seen> {
        std::mem::take(&mut *self.seen.lock().unwrap())
    }
}

impl PropertyApplier for Recorder {
    fn apply(&mut self, invocation: &SetterInvocation<'_>) -> Result<()> {
        let rendered: Vec<String> = invocation
            .setter
            .current
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        self.seen.lock().unwrap().push((
            invocation.setter.name.clone(),
            invocation.target.to_string(),
            invocation.state,
            rendered.join(","),
        ));
        Ok(())
    }
}

/// Scratch space holding one package directory and the status database
pub struct Workspace {
    pub root: TempDir,
    pub settings: EngineSettings,
}

#[allow(dead_code)]
impl Workspace {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let settings = EngineSettings {
            status_db: root.path().join("status.db"),
            ..EngineSettings::default()
        };
        fs::create_dir_all(root.path().join("pkg")).unwrap();
        Self { root, settings }
    }

    pub fn package_dir(&self) -> PathBuf {
        self.root.path().join("pkg")
    }

    pub fn files(&self) -> PackageFiles {
        PackageFiles::new(self.package_dir())
    }

    pub fn service(&self, recorder: &Recorder) -> ConfigService {
        open_service(
            &self.settings,
            SetterRegistry::new().with_applier("site", Box::new(recorder.clone())),
        )
        .unwrap()
    }

    pub fn write_definition(&self, text: &str) {
        fs::write(self.files().config_definition(), text).unwrap();
    }

    pub fn write_defaults(&self, text: &str) {
        fs::write(self.files().default_config(), text).unwrap();
    }

    pub fn write_local(&self, text: &str) {
        fs::write(self.files().local_config(), text).unwrap();
    }
}

pub const DEFINITION: &str = r#"
handlers:
  - name: site
    type: site
    target: "${site.name}"
    setters:
      - name: title
        properties:
          title: "${site.title}"
      - name: theme
        properties:
          theme: "${site.theme}"
"#;

pub const DEFAULTS: &str = r#"
properties:
  - name: site
    properties:
      - name: name
        value: home
      - name: title
        value: Default
      - name: theme
        value: light
"#;

/// Local overrides for the site title and theme
#[allow(dead_code)]
pub fn local(title: &str, theme: &str) -> String {
    format!(
        "properties:\n  - name: site\n    properties:\n      - name: title\n        value: {}\n      - name: theme\n        value: {}\n",
        title, theme
    )
}
