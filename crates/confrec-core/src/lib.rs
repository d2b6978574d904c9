//! confrec core - declarative configuration reconciliation kernel
//!
//! This crate holds the pure engine. It performs no I/O; persistence and
//! setter capabilities are injected through traits.
//!
//! - Property value model and hierarchical property documents
//! - Normalizer (hierarchical document → flat FQN map) and overlay
//! - Delta finder between flat maps
//! - Placeholder scanning and the config mapper (definition → handlers)
//! - Append-only status history over a [`status::StatusStore`]
//! - Cross-package target claims
//! - Setter registry and the apply / de-apply orchestrator
//! - Canonical error and logging facilities

pub mod apply;
pub mod claims;
pub mod delta;
pub mod errors;
pub mod logging_facility;
pub mod mapper;
pub mod model;
pub mod normalize;
pub mod placeholder;
pub mod registry;
pub mod status;

// Re-export commonly used types
pub use apply::{ApplyReport, ApplyRequest, ConfigService, DeApplyRequest};
pub use claims::{InMemoryTargetClaims, TargetClaims};
pub use errors::{ConfigError, ExError, ExErrorKind, Result};
pub use model::{FlatMap, PropertySet, PropertyValue};
pub use placeholder::PlaceholderSyntax;
pub use registry::{PropertyApplier, SetterInvocation, SetterRegistry};
pub use status::{ConfigStatusManager, InMemoryStatusStore, StatusStore};
