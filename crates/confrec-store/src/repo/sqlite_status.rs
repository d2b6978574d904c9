//! SQLite status store
//!
//! Persists the config status history in the `config_status` table.
//! Timestamps are stored as microseconds since the epoch; `seq` keeps
//! insertion order for records with equal timestamps.

#![allow(clippy::result_large_err)]

use chrono::{DateTime, Utc};
use confrec_core::errors::{ConfigError, Result as CoreResult};
use confrec_core::model::{ApplyStatus, ConfigSnapshots, ConfigStatus, Operation};
use confrec_core::status::{NamePattern, StatusStore};
use confrec_core_types::StatusId;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::errors::storage_error;

const SELECT_COLUMNS: &str = "id, name, applied_at, operation, status, \
     local_config, default_config, config_definition, message";

/// Status store backed by a SQLite connection
///
/// The connection must have the confrec migrations applied (see
/// [`open_status_db`](crate::db::open_status_db)).
pub struct SqliteStatusStore {
    conn: Connection,
}

impl SqliteStatusStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Load one record by id
    ///
    /// # Errors
    ///
    /// Returns `Storage` on query or decode failure.
    pub fn get(&self, id: &StatusId) -> CoreResult<Option<ConfigStatus>> {
        let sql = format!("SELECT {} FROM config_status WHERE id = ?1", SELECT_COLUMNS);
        let raw = self
            .conn
            .query_row(&sql, [id.as_str()], RawStatus::from_row)
            .optional()
            .map_err(|e| storage_error("status_get", e))?;
        raw.map(RawStatus::into_status).transpose()
    }

    /// Candidate rows for a pattern
    ///
    /// SQLite LIKE is case-insensitive for ASCII, so it only narrows the scan;
    /// [`NamePattern::matches`] makes the case-sensitive decision.
    fn candidates(&self, pattern: &NamePattern) -> CoreResult<Vec<ConfigStatus>> {
        let sql = format!(
            "SELECT {} FROM config_status WHERE name LIKE ?1 ORDER BY applied_at, seq",
            SELECT_COLUMNS
        );
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| storage_error("status_find", e))?;
        let raws = stmt
            .query_map([pattern.as_str()], RawStatus::from_row)
            .map_err(|e| storage_error("status_find", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| storage_error("status_find", e))?;

        raws.into_iter()
            .filter(|raw| pattern.matches(&raw.name))
            .map(RawStatus::into_status)
            .collect()
    }
}

impl StatusStore for SqliteStatusStore {
    fn insert(&mut self, record: &ConfigStatus) -> CoreResult<()> {
        self.conn
            .execute(
                "INSERT INTO config_status (id, name, applied_at, operation, status, \
                 local_config, default_config, config_definition, message) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    record.id.as_str(),
                    record.name,
                    record.applied_at.timestamp_micros(),
                    record.operation.as_str(),
                    record.status.as_str(),
                    record.snapshots.local,
                    record.snapshots.default,
                    record.snapshots.definition,
                    record.message,
                ],
            )
            .map_err(|e| storage_error("status_insert", e))?;
        Ok(())
    }

    fn contains(&self, name: &str, applied_at: DateTime<Utc>) -> CoreResult<bool> {
        self.conn
            .query_row(
                "SELECT 1 FROM config_status WHERE name = ?1 AND applied_at = ?2",
                rusqlite::params![name, applied_at.timestamp_micros()],
                |_| Ok(()),
            )
            .optional()
            .map(|found| found.is_some())
            .map_err(|e| storage_error("status_contains", e))
    }

    fn find(&self, pattern: &NamePattern) -> CoreResult<Vec<ConfigStatus>> {
        self.candidates(pattern)
    }

    fn delete_matching(&mut self, pattern: &NamePattern) -> CoreResult<usize> {
        let ids: Vec<StatusId> = self
            .candidates(pattern)?
            .into_iter()
            .map(|record| record.id)
            .collect();

        let tx = self
            .conn
            .transaction()
            .map_err(|e| storage_error("status_delete", e))?;
        for id in &ids {
            tx.execute("DELETE FROM config_status WHERE id = ?1", [id.as_str()])
                .map_err(|e| storage_error("status_delete", e))?;
        }
        tx.commit().map_err(|e| storage_error("status_delete", e))?;

        Ok(ids.len())
    }

    fn delete_by_id(&mut self, id: &StatusId) -> CoreResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM config_status WHERE id = ?1", [id.as_str()])
            .map_err(|e| storage_error("status_delete_id", e))?;
        Ok(removed > 0)
    }
}

/// Row as stored, before text columns are decoded
struct RawStatus {
    id: String,
    name: String,
    applied_at: i64,
    operation: String,
    status: String,
    local_config: Option<String>,
    default_config: Option<String>,
    config_definition: Option<String>,
    message: Option<String>,
}

impl RawStatus {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            applied_at: row.get(2)?,
            operation: row.get(3)?,
            status: row.get(4)?,
            local_config: row.get(5)?,
            default_config: row.get(6)?,
            config_definition: row.get(7)?,
            message: row.get(8)?,
        })
    }

    fn into_status(self) -> CoreResult<ConfigStatus> {
        let decode = |what: &str, value: &str| {
            ConfigError::storage(
                "status_decode",
                format!("record {} has invalid {} '{}'", self.id, what, value),
            )
        };
        let applied_at = DateTime::from_timestamp_micros(self.applied_at)
            .ok_or_else(|| decode("applied_at", &self.applied_at.to_string()))?;
        let operation =
            Operation::parse(&self.operation).ok_or_else(|| decode("operation", &self.operation))?;
        let status =
            ApplyStatus::parse(&self.status).ok_or_else(|| decode("status", &self.status))?;

        Ok(ConfigStatus {
            id: StatusId::from_string(self.id),
            name: self.name,
            applied_at,
            operation,
            status,
            snapshots: ConfigSnapshots {
                local: self.local_config,
                default: self.default_config,
                definition: self.config_definition,
            },
            message: self.message,
        })
    }
}
