use std::sync::{Arc, Mutex};

use confrec_core::errors::{ConfigError, Result};
use confrec_core::model::{ConfigDefinition, HandlerDef, ObjectState, PropertySet, SetterDef};
use confrec_core::{
    ConfigService, InMemoryStatusStore, InMemoryTargetClaims, PropertyApplier, SetterInvocation,
    SetterRegistry,
};

/// One observed setter call
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub handler: String,
    pub setter: String,
    pub target: String,
    pub state: ObjectState,
    /// `name=value` pairs of the current bag, in bag order
    pub current: Vec<String>,
    /// `name=value` pairs of the previous bag, if any
    pub previous: Option<Vec<String>>,
}

/// Applier that records every call, optionally failing on one target
#[derive(Clone, Default)]
pub struct RecordingApplier {
    pub calls: Arc<Mutex<Vec<Call>>>,
    pub fail_on_target: Option<String>,
}

#[allow(dead_code)]
impl RecordingApplier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(target: &str) -> Self {
        Self {
            calls: Arc::default(),
            fail_on_target: Some(target.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl PropertyApplier for RecordingApplier {
    fn apply(&mut self, invocation: &SetterInvocation<'_>) -> Result<()> {
        if self.fail_on_target.as_deref() == Some(invocation.target) {
            return Err(ConfigError::SetterFailed {
                handler: invocation.handler.name.clone(),
                setter: invocation.setter.name.clone(),
                target: invocation.target.to_string(),
                reason: "target rejected the change".to_string(),
            });
        }

        let render = |bag: &confrec_core::model::PropertyBag| -> Vec<String> {
            bag.iter().map(|(k, v)| format!("{}={}", k, v)).collect()
        };
        self.calls.lock().unwrap().push(Call {
            handler: invocation.handler.name.clone(),
            setter: invocation.setter.name.clone(),
            target: invocation.target.to_string(),
            state: invocation.state,
            current: render(&invocation.setter.current),
            previous: invocation.setter.previous.as_ref().map(render),
        });
        Ok(())
    }
}

/// Service with in-memory stores and the given applier registered for `site`
#[allow(dead_code)]
pub fn service_with(applier: &RecordingApplier) -> ConfigService {
    ConfigService::new(
        Box::new(InMemoryStatusStore::new()),
        Box::new(InMemoryTargetClaims::new()),
        SetterRegistry::new().with_applier("site", Box::new(applier.clone())),
    )
}

/// A `site` handler targeting `${site.name}` with title and banner setters
#[allow(dead_code)]
pub fn site_definition() -> ConfigDefinition {
    ConfigDefinition::new().with_handler(
        HandlerDef::new("site", "site", "${site.name}")
            .with_setter(SetterDef::new("title").with_property("title", "${site.title}"))
            .with_setter(SetterDef::new("banner").with_property("text", "Welcome to ${site.title}")),
    )
}

#[allow(dead_code)]
pub fn site_properties(name: &str, title: &str) -> PropertySet {
    PropertySet::new().with_set(
        "site",
        PropertySet::new()
            .with_scalar("name", name)
            .with_scalar("title", title),
    )
}
