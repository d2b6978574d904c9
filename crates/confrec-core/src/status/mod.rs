//! Config status history
//!
//! Every apply and de-apply attempt leaves one [`ConfigStatus`] record. The
//! history is append-only: records are inserted and purged, never updated.
//! "Latest" and "last successful" are always derived by scanning the ordered
//! history; no mutable "current" pointer is kept.

mod manager;
mod memory;
mod pattern;

pub use manager::ConfigStatusManager;
pub use memory::InMemoryStatusStore;
pub use pattern::NamePattern;

use chrono::{DateTime, Utc};
use confrec_core_types::StatusId;

use crate::errors::Result;
use crate::model::ConfigStatus;

/// Persistence capability for status records
///
/// `find` must return records ordered by `applied_at`, ties broken by
/// insertion order.
pub trait StatusStore {
    /// Append a record
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the backend rejects the write.
    fn insert(&mut self, record: &ConfigStatus) -> Result<()>;

    /// Whether a record with this name and timestamp exists
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the backend cannot be read.
    fn contains(&self, name: &str, applied_at: DateTime<Utc>) -> Result<bool>;

    /// Records whose name matches the pattern, in history order
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the backend cannot be read.
    fn find(&self, pattern: &NamePattern) -> Result<Vec<ConfigStatus>>;

    /// Delete records whose name matches the pattern; returns how many
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the backend rejects the delete.
    fn delete_matching(&mut self, pattern: &NamePattern) -> Result<usize>;

    /// Delete one record by id; returns whether it existed
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the backend rejects the delete.
    fn delete_by_id(&mut self, id: &StatusId) -> Result<bool>;
}
