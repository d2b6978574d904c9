//! Setter registry
//!
//! Appliers are the external capability that turns a resolved property bag
//! into a change on a domain object. They are registered per object type and
//! looked up by the handler's `object_type` tag.

use std::collections::BTreeMap;

use crate::errors::Result;
use crate::model::{ConfigHandler, ObjectState, PropertySetter};

/// One call of a setter against one target object
#[derive(Debug, Clone, Copy)]
pub struct SetterInvocation<'a> {
    pub handler: &'a ConfigHandler,
    pub setter: &'a PropertySetter,
    pub target: &'a str,
    pub state: ObjectState,
}

/// Applies resolved setter properties to target objects of one type
///
/// An applier decides what each [`ObjectState`] means for its objects: a
/// `Previous` target is typically reverted or removed.
pub trait PropertyApplier {
    /// Apply one setter to one target
    ///
    /// # Errors
    ///
    /// Implementations return `SetterFailed` (or `UnresolvedPlaceholder` via
    /// [`PropertySetter::require`]) to abort the apply.
    fn apply(&mut self, invocation: &SetterInvocation<'_>) -> Result<()>;
}

/// Object-type tag → applier
#[derive(Default)]
pub struct SetterRegistry {
    appliers: BTreeMap<String, Box<dyn PropertyApplier>>,
}

impl SetterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an applier, replacing any previous one for the type
    pub fn register(&mut self, object_type: impl Into<String>, applier: Box<dyn PropertyApplier>) {
        self.appliers.insert(object_type.into(), applier);
    }

    /// Builder form of [`register`](Self::register)
    pub fn with_applier(
        mut self,
        object_type: impl Into<String>,
        applier: Box<dyn PropertyApplier>,
    ) -> Self {
        self.register(object_type, applier);
        self
    }

    pub fn supports(&self, object_type: &str) -> bool {
        self.appliers.contains_key(object_type)
    }

    pub fn get_mut(&mut self, object_type: &str) -> Option<&mut (dyn PropertyApplier + 'static)> {
        self.appliers.get_mut(object_type).map(|a| a.as_mut())
    }

    /// Registered object types, sorted
    pub fn object_types(&self) -> Vec<&str> {
        self.appliers.keys().map(String::as_str).collect()
    }
}

impl std::fmt::Debug for SetterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetterRegistry")
            .field("object_types", &self.object_types())
            .finish()
    }
}
