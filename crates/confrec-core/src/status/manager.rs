use std::collections::BTreeMap;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use confrec_core_types::StatusId;

use super::{NamePattern, StatusStore};
use crate::errors::Result;
use crate::model::ConfigStatus;

/// Creates, saves, queries and purges status records over a [`StatusStore`]
pub struct ConfigStatusManager {
    store: Box<dyn StatusStore>,
    last_created: Option<DateTime<Utc>>,
}

impl ConfigStatusManager {
    pub fn new(store: Box<dyn StatusStore>) -> Self {
        Self {
            store,
            last_created: None,
        }
    }

    /// New failure-by-default record for `name`, stamped now
    ///
    /// Timestamps have microsecond precision and strictly increase across
    /// calls on the same manager, so records created back to back keep their
    /// creation order.
    pub fn create(&mut self, name: &str) -> ConfigStatus {
        let mut applied_at = Utc::now().trunc_subsecs(6);
        if let Some(last) = self.last_created {
            if applied_at <= last {
                applied_at = last + Duration::microseconds(1);
            }
        }
        self.last_created = Some(applied_at);
        ConfigStatus::new(name, applied_at)
    }

    /// Persist a record unless one with the same name and timestamp exists
    ///
    /// Returns whether the record was written.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the store fails.
    pub fn save(&mut self, record: &ConfigStatus) -> Result<bool> {
        if self.store.contains(&record.name, record.applied_at)? {
            tracing::debug!(
                package = %record.name,
                applied_at = %record.applied_at,
                "status record already saved"
            );
            return Ok(false);
        }
        self.store.insert(record)?;
        tracing::debug!(
            package = %record.name,
            status = record.status.as_str(),
            operation = record.operation.as_str(),
            "status record saved"
        );
        Ok(true)
    }

    /// All records whose name matches the pattern, oldest first
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the store fails.
    pub fn find(&self, pattern: &str) -> Result<Vec<ConfigStatus>> {
        self.store.find(&NamePattern::new(pattern))
    }

    /// Most recent record of every matching name, ordered by name
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the store fails.
    pub fn find_latest(&self, pattern: &str) -> Result<Vec<ConfigStatus>> {
        let mut latest = BTreeMap::new();
        for record in self.find(pattern)? {
            latest.insert(record.name.clone(), record);
        }
        Ok(latest.into_values().collect())
    }

    /// Most recent successful record for exactly `name`
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the store fails.
    pub fn find_last_successful(&self, name: &str) -> Result<Option<ConfigStatus>> {
        Ok(self
            .find(name)?
            .into_iter()
            .rev()
            .find(|r| r.name == name && r.is_success()))
    }

    /// Delete all records whose name matches the pattern
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the store fails.
    pub fn delete(&mut self, pattern: &str) -> Result<usize> {
        let removed = self.store.delete_matching(&NamePattern::new(pattern))?;
        tracing::info!(pattern, removed, "status records purged");
        Ok(removed)
    }

    /// Delete one record by id
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the store fails.
    pub fn delete_id(&mut self, id: &StatusId) -> Result<bool> {
        self.store.delete_by_id(id)
    }
}

impl std::fmt::Debug for ConfigStatusManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStatusManager")
            .field("last_created", &self.last_created)
            .finish_non_exhaustive()
    }
}
