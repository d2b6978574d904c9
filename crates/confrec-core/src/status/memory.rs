use chrono::{DateTime, Utc};
use confrec_core_types::StatusId;

use super::{NamePattern, StatusStore};
use crate::errors::Result;
use crate::model::ConfigStatus;

/// Vec-backed status store
///
/// Records are kept in insertion order. Not thread-safe; designed for
/// single-threaded use and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStatusStore {
    records: Vec<ConfigStatus>,
}

impl InMemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl StatusStore for InMemoryStatusStore {
    fn insert(&mut self, record: &ConfigStatus) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn contains(&self, name: &str, applied_at: DateTime<Utc>) -> Result<bool> {
        Ok(self
            .records
            .iter()
            .any(|r| r.name == name && r.applied_at == applied_at))
    }

    fn find(&self, pattern: &NamePattern) -> Result<Vec<ConfigStatus>> {
        let mut found: Vec<ConfigStatus> = self
            .records
            .iter()
            .filter(|r| pattern.matches(&r.name))
            .cloned()
            .collect();
        // stable: ties stay in insertion order
        found.sort_by_key(|r| r.applied_at);
        Ok(found)
    }

    fn delete_matching(&mut self, pattern: &NamePattern) -> Result<usize> {
        let before = self.records.len();
        self.records.retain(|r| !pattern.matches(&r.name));
        Ok(before - self.records.len())
    }

    fn delete_by_id(&mut self, id: &StatusId) -> Result<bool> {
        let before = self.records.len();
        self.records.retain(|r| &r.id != id);
        Ok(before != self.records.len())
    }
}
