//! Error handling for confrec-store
//!
//! Store entry points return `ExError`. Implementations of the core
//! persistence traits return `ConfigError::Storage` so the orchestrator can
//! record them like any other failure.

use confrec_core::errors::{ConfigError, ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Storage failure inside a core persistence trait
pub fn storage_error(op: &str, err: rusqlite::Error) -> ConfigError {
    ConfigError::storage(op, err.to_string())
}

/// Malformed document content
pub fn malformed(reason: impl Into<String>) -> ConfigError {
    ConfigError::MalformedInput {
        reason: reason.into(),
    }
}
