//! Engine-level commands that need files or the status database.

#![allow(clippy::result_large_err)]

use std::path::PathBuf;

use confrec_core::model::ConfigStatus;
use confrec_core::{ApplyReport, ConfigService};
use confrec_store::errors::Result;
use confrec_store::PackageFiles;

use crate::commands::package::{
    apply_package, de_apply_package, latest_status, purge_status, PackageOptions,
};
use crate::settings::EngineSettings;

/// Engine-level commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    /// Apply the package in `dir`.
    ApplyPackage {
        dir: PathBuf,
        package: String,
        /// None uses the settings default.
        changes_only: Option<bool>,
    },
    /// Revert the package in `dir` to its defaults.
    DeApplyPackage { dir: PathBuf, package: String },
    /// Delete status history matching a LIKE pattern.
    PurgeStatus { pattern: String },
    /// Latest status record per package matching a LIKE pattern.
    LatestStatus { pattern: String },
}

/// Result of applying an engine command.
#[derive(Debug, Clone)]
pub enum EngineCommandResult {
    Applied(ApplyReport),
    DeApplied(ApplyReport),
    Purged(usize),
    Latest(Vec<ConfigStatus>),
}

/// Apply an engine command against a service.
pub fn apply_engine_command(
    cmd: EngineCommand,
    service: &mut ConfigService,
    settings: &EngineSettings,
) -> Result<EngineCommandResult> {
    match cmd {
        EngineCommand::ApplyPackage {
            dir,
            package,
            changes_only,
        } => {
            let options = PackageOptions {
                changes_only: changes_only.unwrap_or(settings.changes_only),
            };
            let report = apply_package(service, &PackageFiles::new(dir), &package, options)?;
            Ok(EngineCommandResult::Applied(report))
        }
        EngineCommand::DeApplyPackage { dir, package } => {
            let report = de_apply_package(service, &PackageFiles::new(dir), &package)?;
            Ok(EngineCommandResult::DeApplied(report))
        }
        EngineCommand::PurgeStatus { pattern } => {
            Ok(EngineCommandResult::Purged(purge_status(service, &pattern)?))
        }
        EngineCommand::LatestStatus { pattern } => {
            Ok(EngineCommandResult::Latest(latest_status(service, &pattern)?))
        }
    }
}
