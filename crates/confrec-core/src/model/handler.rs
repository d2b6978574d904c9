use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::value::PropertyValue;
use crate::errors::{ConfigError, Result};

/// Which side of the change a target object's data comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectState {
    /// Only the new properties name this object
    Current,
    /// Only the previously-applied properties name this object
    Previous,
    /// Both sides name this object
    Both,
}

impl ObjectState {
    /// Combine two observations of the same object
    pub fn merge(self, other: ObjectState) -> ObjectState {
        if self == other {
            self
        } else {
            ObjectState::Both
        }
    }

    /// Whether the new properties describe this object
    pub fn has_current(&self) -> bool {
        matches!(self, ObjectState::Current | ObjectState::Both)
    }

    /// Whether the previous properties describe this object
    pub fn has_previous(&self) -> bool {
        matches!(self, ObjectState::Previous | ObjectState::Both)
    }

    /// Stable text form
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectState::Current => "CURRENT",
            ObjectState::Previous => "PREVIOUS",
            ObjectState::Both => "BOTH",
        }
    }
}

impl std::fmt::Display for ObjectState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Insertion-ordered bag of resolved properties
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBag {
    entries: Vec<(String, PropertyValue)>,
}

impl PropertyBag {
    /// Create an empty bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry, keeping its first position
    pub fn insert(&mut self, name: impl Into<String>, value: PropertyValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Look up an entry
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Whether an entry exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entry names in insertion order
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A resolved property setter
///
/// `current` holds every template whose placeholders all resolved against the
/// new properties. `previous` is `None` when there is no previous state for
/// this setter (no previous map, or no placeholder resolved against it).
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySetter {
    pub name: String,
    pub templates: Vec<(String, PropertyValue)>,
    pub current: PropertyBag,
    pub previous: Option<PropertyBag>,
    /// Placeholder names that had no current value
    pub unresolved: Vec<String>,
}

impl PropertySetter {
    /// Get a current property that the applier treats as required
    ///
    /// # Errors
    ///
    /// Returns `UnresolvedPlaceholder` if the property has no current value.
    pub fn require(&self, name: &str) -> Result<&PropertyValue> {
        self.current
            .get(name)
            .ok_or_else(|| ConfigError::UnresolvedPlaceholder {
                name: name.to_string(),
                setter: self.name.clone(),
            })
    }

    /// Previous value of a property, if any
    pub fn previous_value(&self, name: &str) -> Option<&PropertyValue> {
        self.previous.as_ref().and_then(|bag| bag.get(name))
    }
}

/// A resolved handler, built fresh for every apply
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigHandler {
    pub name: String,
    pub object_type: String,
    pub setters: Vec<PropertySetter>,
    pub extra_current: PropertyBag,
    pub extra_previous: Option<PropertyBag>,
    pub targets: BTreeMap<String, ObjectState>,
}

impl ConfigHandler {
    /// Look up an extra property by key or by `handler.key`
    pub fn extra(&self, key: &str) -> Option<&PropertyValue> {
        self.extra_current.get(key).or_else(|| {
            key.strip_prefix(self.name.as_str())
                .and_then(|rest| rest.strip_prefix('.'))
                .and_then(|local| self.extra_current.get(local))
        })
    }

    /// State of a target object, if this handler touches it
    pub fn object_state(&self, target: &str) -> Option<ObjectState> {
        self.targets.get(target).copied()
    }

    /// Claim keys (`object_type:target`) for objects the new state describes
    pub fn claim_keys(&self) -> BTreeSet<String> {
        self.targets
            .iter()
            .filter(|(_, state)| state.has_current())
            .map(|(name, _)| claim_key(&self.object_type, name))
            .collect()
    }
}

/// Cross-package identity of a target object
pub fn claim_key(object_type: &str, target: &str) -> String {
    format!("{}:{}", object_type, target)
}
