//! Apply / de-apply orchestrator
//!
//! [`ConfigService`] drives one package through
//! normalize → (delta) → resolve → validate → invoke → record.
//!
//! ## Atomicity Contract
//!
//! - Resolution and validation failures happen before any setter is called,
//!   so they leave no effects besides the FAILURE record.
//! - The first setter failure stops all remaining invocations. Setters already
//!   invoked are not rolled back.
//! - Every attempt writes exactly one status record, SUCCESS or FAILURE.
//!
//! ## Example
//!
//! ```
//! use confrec_core::apply::{ApplyRequest, ConfigService};
//! use confrec_core::claims::InMemoryTargetClaims;
//! use confrec_core::model::{ConfigDefinition, PropertySet};
//! use confrec_core::registry::SetterRegistry;
//! use confrec_core::status::InMemoryStatusStore;
//!
//! let mut service = ConfigService::new(
//!     Box::new(InMemoryStatusStore::new()),
//!     Box::new(InMemoryTargetClaims::new()),
//!     SetterRegistry::new(),
//! );
//! let request = ApplyRequest::new(
//!     "pkg.empty",
//!     ConfigDefinition::new(),
//!     PropertySet::new().with_scalar("a", "1"),
//! );
//! let report = service.apply(request).unwrap();
//! assert!(report.record.is_success());
//! ```

use std::collections::BTreeSet;
use std::time::Instant;

use confrec_core_types::{RunContext, RunId};

use crate::claims::TargetClaims;
use crate::delta::delta;
use crate::errors::{ConfigError, Result};
use crate::mapper::resolve_handlers;
use crate::model::{
    ApplyStatus, ConfigDefinition, ConfigHandler, ConfigSnapshots, ConfigStatus, FlatMap,
    Operation, PropertySet,
};
use crate::normalize::{normalize, overlay};
use crate::placeholder::PlaceholderSyntax;
use crate::registry::{SetterInvocation, SetterRegistry};
use crate::status::{ConfigStatusManager, StatusStore};
use crate::{log_op_end, log_op_error, log_op_start};

/// Input of one apply
#[derive(Debug, Clone)]
pub struct ApplyRequest {
    pub package: String,
    pub definition: ConfigDefinition,
    pub local: PropertySet,
    pub defaults: Option<PropertySet>,
    /// Normalized properties of the last successful apply
    pub previous: FlatMap,
    pub changes_only: bool,
    pub snapshots: ConfigSnapshots,
}

impl ApplyRequest {
    pub fn new(package: impl Into<String>, definition: ConfigDefinition, local: PropertySet) -> Self {
        Self {
            package: package.into(),
            definition,
            local,
            defaults: None,
            previous: FlatMap::new(),
            changes_only: false,
            snapshots: ConfigSnapshots::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: PropertySet) -> Self {
        self.defaults = Some(defaults);
        self
    }

    pub fn with_previous(mut self, previous: FlatMap) -> Self {
        self.previous = previous;
        self
    }

    pub fn with_changes_only(mut self, changes_only: bool) -> Self {
        self.changes_only = changes_only;
        self
    }

    pub fn with_snapshots(mut self, snapshots: ConfigSnapshots) -> Self {
        self.snapshots = snapshots;
        self
    }
}

/// Input of one de-apply
#[derive(Debug, Clone)]
pub struct DeApplyRequest {
    pub package: String,
    pub definition: ConfigDefinition,
    /// Properties to fall back to
    pub defaults: PropertySet,
    /// Properties being withdrawn
    pub local: PropertySet,
    pub snapshots: ConfigSnapshots,
}

impl DeApplyRequest {
    pub fn new(
        package: impl Into<String>,
        definition: ConfigDefinition,
        defaults: PropertySet,
        local: PropertySet,
    ) -> Self {
        Self {
            package: package.into(),
            definition,
            defaults,
            local,
            snapshots: ConfigSnapshots::default(),
        }
    }

    pub fn with_snapshots(mut self, snapshots: ConfigSnapshots) -> Self {
        self.snapshots = snapshots;
        self
    }
}

/// Outcome of a successful apply or de-apply
#[derive(Debug, Clone)]
pub struct ApplyReport {
    pub run_id: RunId,
    /// The SUCCESS record that was written
    pub record: ConfigStatus,
    pub handlers: usize,
    pub invocations: usize,
    /// Changes-only apply found nothing to do
    pub unchanged: bool,
}

#[derive(Debug, Default)]
struct Outcome {
    handlers: usize,
    invocations: usize,
    unchanged: bool,
}

/// Apply / de-apply orchestrator
///
/// Explicitly constructed with its collaborators; there is no global state.
pub struct ConfigService {
    status: ConfigStatusManager,
    claims: Box<dyn TargetClaims>,
    registry: SetterRegistry,
    syntax: PlaceholderSyntax,
}

impl ConfigService {
    pub fn new(
        status_store: Box<dyn StatusStore>,
        claims: Box<dyn TargetClaims>,
        registry: SetterRegistry,
    ) -> Self {
        Self {
            status: ConfigStatusManager::new(status_store),
            claims,
            registry,
            syntax: PlaceholderSyntax::default(),
        }
    }

    /// Builder: use custom placeholder delimiters
    pub fn with_syntax(mut self, syntax: PlaceholderSyntax) -> Self {
        self.syntax = syntax;
        self
    }

    pub fn status(&self) -> &ConfigStatusManager {
        &self.status
    }

    pub fn status_mut(&mut self) -> &mut ConfigStatusManager {
        &mut self.status
    }

    pub fn registry_mut(&mut self) -> &mut SetterRegistry {
        &mut self.registry
    }

    pub fn syntax(&self) -> &PlaceholderSyntax {
        &self.syntax
    }

    /// Apply a package's properties
    ///
    /// # Errors
    ///
    /// Returns the first resolution, validation, setter or storage error. A
    /// FAILURE record carrying the error text has been written by then.
    pub fn apply(&mut self, request: ApplyRequest) -> Result<ApplyReport> {
        let ctx = RunContext::new(&request.package);
        let start = Instant::now();
        log_op_start!(
            "apply",
            package = %ctx.package,
            run_id = %ctx.run_id,
            changes_only = request.changes_only
        );

        let record = self
            .status
            .create(&request.package)
            .with_operation(Operation::Apply)
            .with_snapshots(request.snapshots.clone());
        let outcome = self.run_apply(&request);
        self.finish("apply", &ctx, record, outcome, start)
    }

    /// Withdraw a package's local properties, reverting to defaults
    ///
    /// Keys present only in the local properties are passed to setters as
    /// `Previous` data so appliers can remove them.
    ///
    /// # Errors
    ///
    /// Same as [`apply`](Self::apply).
    pub fn de_apply(&mut self, request: DeApplyRequest) -> Result<ApplyReport> {
        let ctx = RunContext::new(&request.package);
        let start = Instant::now();
        log_op_start!("de_apply", package = %ctx.package, run_id = %ctx.run_id);

        let record = self
            .status
            .create(&request.package)
            .with_operation(Operation::DeApply)
            .with_snapshots(request.snapshots.clone());
        let outcome = self.run_de_apply(&request);
        self.finish("de_apply", &ctx, record, outcome, start)
    }

    /// Write a FAILURE record for an attempt that failed before it could run,
    /// e.g. because its documents did not parse
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the record cannot be saved.
    pub fn record_failure(
        &mut self,
        package: &str,
        operation: Operation,
        snapshots: ConfigSnapshots,
        error: &ConfigError,
    ) -> Result<ConfigStatus> {
        let record = self
            .status
            .create(package)
            .with_operation(operation)
            .with_snapshots(snapshots)
            .with_message(error.to_string());
        self.status.save(&record)?;
        Ok(record)
    }

    fn finish(
        &mut self,
        op: &'static str,
        ctx: &RunContext,
        record: ConfigStatus,
        outcome: Result<Outcome>,
        start: Instant,
    ) -> Result<ApplyReport> {
        let result = outcome.and_then(|outcome| {
            let record = record.clone().with_status(ApplyStatus::Success);
            self.status.save(&record)?;
            Ok(ApplyReport {
                run_id: ctx.run_id.clone(),
                record,
                handlers: outcome.handlers,
                invocations: outcome.invocations,
                unchanged: outcome.unchanged,
            })
        });
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(report) => {
                log_op_end!(
                    op,
                    duration_ms = duration_ms,
                    package = %ctx.package,
                    run_id = %ctx.run_id,
                    handler_count = report.handlers,
                    invocations = report.invocations
                );
                Ok(report)
            }
            Err(err) => {
                let failed = record.with_message(err.to_string());
                if let Err(save_err) = self.status.save(&failed) {
                    tracing::error!(
                        package = %ctx.package,
                        error = %save_err,
                        "could not record failure"
                    );
                }
                log_op_error!(
                    op,
                    err.clone(),
                    duration_ms = duration_ms,
                    package = %ctx.package,
                    run_id = %ctx.run_id,
                    pre_apply = err.kind().is_pre_apply()
                );
                Err(err)
            }
        }
    }

    fn run_apply(&mut self, request: &ApplyRequest) -> Result<Outcome> {
        let defaults = request
            .defaults
            .as_ref()
            .map(|d| normalize(d, true))
            .unwrap_or_default();
        let local = normalize(&request.local, true);
        let full = overlay(&defaults, &local);

        let partial = if request.changes_only {
            let changed = delta(&full, &request.previous);
            tracing::debug!(package = %request.package, delta_len = changed.len(), "computed delta");
            if changed.is_empty() {
                return Ok(Outcome {
                    unchanged: true,
                    ..Outcome::default()
                });
            }
            Some(changed)
        } else {
            None
        };

        // Validation covers the whole definition; only the affected subset runs.
        let all = resolve_handlers(
            &request.definition,
            None,
            &full,
            &request.previous,
            &self.syntax,
        )?;
        self.check_object_types(&all)?;
        let claims = self.check_claims(&request.package, &all)?;

        let handlers = match &partial {
            Some(partial) => resolve_handlers(
                &request.definition,
                Some(partial),
                &full,
                &request.previous,
                &self.syntax,
            )?,
            None => all,
        };

        let invocations = self.invoke(&handlers)?;
        self.claims.replace_claims(&request.package, &claims)?;

        Ok(Outcome {
            handlers: handlers.len(),
            invocations,
            unchanged: false,
        })
    }

    fn run_de_apply(&mut self, request: &DeApplyRequest) -> Result<Outcome> {
        let current = normalize(&request.defaults, true);
        let previous = normalize(&request.local, true);

        let handlers = resolve_handlers(
            &request.definition,
            Some(&previous),
            &current,
            &previous,
            &self.syntax,
        )?;
        self.check_object_types(&handlers)?;

        let invocations = self.invoke(&handlers)?;
        self.claims.release(&request.package)?;

        Ok(Outcome {
            handlers: handlers.len(),
            invocations,
            unchanged: false,
        })
    }

    fn check_object_types(&self, handlers: &[ConfigHandler]) -> Result<()> {
        match handlers
            .iter()
            .find(|h| !self.registry.supports(&h.object_type))
        {
            Some(h) => Err(ConfigError::UnsupportedObjectType {
                handler: h.name.clone(),
                object_type: h.object_type.clone(),
            }),
            None => Ok(()),
        }
    }

    fn check_claims(&self, package: &str, handlers: &[ConfigHandler]) -> Result<BTreeSet<String>> {
        let wanted: BTreeSet<String> = handlers.iter().flat_map(|h| h.claim_keys()).collect();
        let others = self.claims.claims_of_others(package)?;

        if let Some((key, owner)) = wanted
            .iter()
            .find_map(|key| others.get(key).map(|owner| (key, owner)))
        {
            return Err(ConfigError::ValidationConflict {
                target: key.clone(),
                package: package.to_string(),
                owner: owner.clone(),
            });
        }
        Ok(wanted)
    }

    fn invoke(&mut self, handlers: &[ConfigHandler]) -> Result<usize> {
        let mut invocations = 0;
        for handler in handlers {
            let applier = self.registry.get_mut(&handler.object_type).ok_or_else(|| {
                ConfigError::UnsupportedObjectType {
                    handler: handler.name.clone(),
                    object_type: handler.object_type.clone(),
                }
            })?;

            for setter in &handler.setters {
                for (target, state) in &handler.targets {
                    tracing::debug!(
                        handler = %handler.name,
                        setter = %setter.name,
                        target = %target,
                        object_state = %state,
                        "invoking setter"
                    );
                    applier.apply(&SetterInvocation {
                        handler,
                        setter,
                        target,
                        state: *state,
                    })?;
                    invocations += 1;
                }
            }
        }
        Ok(invocations)
    }
}

impl std::fmt::Debug for ConfigService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigService")
            .field("status", &self.status)
            .field("registry", &self.registry)
            .field("syntax", &self.syntax)
            .finish_non_exhaustive()
    }
}
