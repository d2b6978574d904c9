//! Package commands over the file layout and the status history
//!
//! ## Apply pipeline (in order):
//! 1. Read the package documents (a missing definition is an I/O error, no record)
//! 2. Parse them (a parse failure writes a FAILURE record and stops)
//! 3. Derive the previously applied properties from the last SUCCESS record
//! 4. Hand the request to [`ConfigService::apply`]

#![allow(clippy::result_large_err)]

use confrec_core::errors::{ConfigError, ExError, Result as CoreResult};
use confrec_core::model::{
    ConfigDefinition, ConfigSnapshots, ConfigStatus, FlatMap, Operation, PropertySet,
};
use confrec_core::normalize::{normalize, overlay};
use confrec_core::{ApplyReport, ApplyRequest, ConfigService, DeApplyRequest};
use confrec_store::errors::Result;
use confrec_store::{parse_config_definition, parse_property_set, PackageFiles, PackageSources};

/// Options for [`apply_package`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackageOptions {
    /// Run only the setters affected by what changed since the last success
    pub changes_only: bool,
}

/// Parsed documents of one package
#[derive(Debug, Clone)]
struct ParsedPackage {
    definition: ConfigDefinition,
    defaults: Option<PropertySet>,
    local: PropertySet,
}

/// Apply the package stored in `files` under the name `package`
///
/// # Errors
///
/// Returns `Io` if the documents cannot be read, otherwise the error of the
/// failed step with the package attached. Every error after reading leaves a
/// FAILURE record.
pub fn apply_package(
    service: &mut ConfigService,
    files: &PackageFiles,
    package: &str,
    options: PackageOptions,
) -> Result<ApplyReport> {
    let sources = files.read()?;
    let parsed = parse_or_record(service, package, Operation::Apply, &sources)?;
    let previous = previous_properties(service, package)?;
    tracing::debug!(
        package,
        previous_len = previous.len(),
        changes_only = options.changes_only,
        "prepared apply"
    );

    let mut request = ApplyRequest::new(package, parsed.definition, parsed.local)
        .with_previous(previous)
        .with_changes_only(options.changes_only)
        .with_snapshots(sources.snapshots());
    if let Some(defaults) = parsed.defaults {
        request = request.with_defaults(defaults);
    }

    service
        .apply(request)
        .map_err(|e| context(e, "apply_package", package))
}

/// Withdraw the package's local properties, reverting its targets to the
/// package defaults
///
/// # Errors
///
/// Same as [`apply_package`].
pub fn de_apply_package(
    service: &mut ConfigService,
    files: &PackageFiles,
    package: &str,
) -> Result<ApplyReport> {
    let sources = files.read()?;
    let parsed = parse_or_record(service, package, Operation::DeApply, &sources)?;

    let request = DeApplyRequest::new(
        package,
        parsed.definition,
        parsed.defaults.unwrap_or_default(),
        parsed.local,
    )
    .with_snapshots(sources.snapshots());

    service
        .de_apply(request)
        .map_err(|e| context(e, "de_apply_package", package))
}

/// Delete status history whose name matches `pattern`
///
/// # Errors
///
/// Returns `Persistence` if the store fails.
pub fn purge_status(service: &mut ConfigService, pattern: &str) -> Result<usize> {
    service
        .status_mut()
        .delete(pattern)
        .map_err(|e| ExError::from(e).with_op("purge_status"))
}

/// Latest record per package whose name matches `pattern`
///
/// # Errors
///
/// Returns `Persistence` if the store fails.
pub fn latest_status(service: &ConfigService, pattern: &str) -> Result<Vec<ConfigStatus>> {
    service
        .status()
        .find_latest(pattern)
        .map_err(|e| ExError::from(e).with_op("latest_status"))
}

/// Properties in effect after the last successful attempt
///
/// An apply left `default` overlaid by `local`; a de-apply left `default`.
/// Snapshots that no longer parse are treated as no previous state, so the
/// next apply runs in full.
pub fn previous_properties(service: &ConfigService, package: &str) -> Result<FlatMap> {
    let last = service
        .status()
        .find_last_successful(package)
        .map_err(|e| context(e, "previous_properties", package))?;
    let Some(record) = last else {
        return Ok(FlatMap::new());
    };

    match snapshot_properties(&record.snapshots, record.operation) {
        Ok(previous) => Ok(previous),
        Err(err) => {
            tracing::warn!(
                package,
                status_id = %record.id,
                error = %err,
                "stored snapshot does not parse, assuming no previous state"
            );
            Ok(FlatMap::new())
        }
    }
}

fn snapshot_properties(snapshots: &ConfigSnapshots, operation: Operation) -> CoreResult<FlatMap> {
    let defaults = normalize(&parse_optional(snapshots.default.as_deref())?, true);
    match operation {
        Operation::Apply => {
            let local = normalize(&parse_optional(snapshots.local.as_deref())?, true);
            Ok(overlay(&defaults, &local))
        }
        Operation::DeApply => Ok(defaults),
    }
}

fn parse_optional(text: Option<&str>) -> CoreResult<PropertySet> {
    text.map(parse_property_set)
        .transpose()
        .map(Option::unwrap_or_default)
}

fn parse_sources(sources: &PackageSources) -> CoreResult<ParsedPackage> {
    Ok(ParsedPackage {
        definition: parse_config_definition(&sources.definition)?,
        defaults: sources
            .default
            .as_deref()
            .map(parse_property_set)
            .transpose()?,
        local: parse_optional(sources.local.as_deref())?,
    })
}

fn parse_or_record(
    service: &mut ConfigService,
    package: &str,
    operation: Operation,
    sources: &PackageSources,
) -> Result<ParsedPackage> {
    let op = match operation {
        Operation::Apply => "apply_package",
        Operation::DeApply => "de_apply_package",
    };
    match parse_sources(sources) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            tracing::warn!(package, error = %err, "package documents do not parse");
            service
                .record_failure(package, operation, sources.snapshots(), &err)
                .map_err(|e| context(e, op, package))?;
            Err(context(err, op, package))
        }
    }
}

/// Attach the command and package, keeping a more specific operation if the
/// error already names one
fn context(err: ConfigError, op: &str, package: &str) -> ExError {
    let err = ExError::from(err);
    let err = match err.op() {
        Some(_) => err,
        None => err.with_op(op),
    };
    err.with_package(package)
}
