//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_RUN_ID: &str = "run_id";

// Entity identifiers
pub const FIELD_PACKAGE: &str = "package";
pub const FIELD_HANDLER: &str = "handler";
pub const FIELD_SETTER: &str = "setter";
pub const FIELD_TARGET: &str = "target";
pub const FIELD_OBJECT_STATE: &str = "object_state";

// Collection sizes
pub const FIELD_PROPERTY_COUNT: &str = "property_count";
pub const FIELD_DELTA_LEN: &str = "delta_len";
pub const FIELD_HANDLER_COUNT: &str = "handler_count";
pub const FIELD_INVOCATIONS: &str = "invocations";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
