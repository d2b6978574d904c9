//! confrec engine - orchestration layer
//!
//! Wires the reconciliation core to package files and the SQLite status
//! database, driven by [`EngineSettings`].

#![allow(clippy::result_large_err)]

pub mod commands;
pub mod settings;

use confrec_core::logging_facility;
use confrec_core::{ConfigService, SetterRegistry};
use confrec_store::db::open_status_db;
use confrec_store::errors::Result;
use confrec_store::{SqliteStatusStore, SqliteTargetClaims};

pub use commands::engine_command::{apply_engine_command, EngineCommand, EngineCommandResult};
pub use commands::package::{
    apply_package, de_apply_package, latest_status, previous_properties, purge_status,
    PackageOptions,
};
pub use settings::EngineSettings;

/// Install the logging subscriber for `settings.logging.profile`
///
/// Only the first call in a process takes effect.
pub fn init_logging(settings: &EngineSettings) {
    logging_facility::init(settings.logging.profile);
}

/// Build a service whose status log and claims live in `settings.status_db`
///
/// Logging is initialized from the settings first.
///
/// # Errors
///
/// Returns `Persistence` if the database cannot be opened or migrated.
pub fn open_service(settings: &EngineSettings, registry: SetterRegistry) -> Result<ConfigService> {
    init_logging(settings);
    let status = SqliteStatusStore::new(open_status_db(&settings.status_db)?);
    let claims = SqliteTargetClaims::new(open_status_db(&settings.status_db)?);
    tracing::info!(status_db = %settings.status_db.display(), "opened status database");
    Ok(ConfigService::new(Box::new(status), Box::new(claims), registry)
        .with_syntax(settings.placeholder.clone()))
}
