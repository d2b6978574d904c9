//! Identifier newtypes and run correlation
//!
//! Every apply or de-apply attempt gets a fresh [`RunId`]; every status record
//! written for it gets a [`StatusId`]. Both are UUIDv7.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a single apply or de-apply attempt
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(String);

impl RunId {
    /// Generate a new RunId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a persisted config status record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StatusId(String);

impl StatusId {
    /// Generate a new StatusId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap an id read back from storage
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for StatusId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StatusId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Context carried through one apply/de-apply for log correlation
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: RunId,
    pub package: String,
}

impl RunContext {
    /// Create a context with a fresh RunId for the given package
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            run_id: RunId::new(),
            package: package.into(),
        }
    }
}
