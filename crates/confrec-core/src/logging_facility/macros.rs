//! Canonical logging macros
//!
//! Each macro stamps `component`, `op` and `event` from the shared schema,
//! then appends any extra `tracing` fields given after the required ones.

/// Log the start of an operation
///
/// ```
/// # use confrec_core::log_op_start;
/// log_op_start!("apply");
/// log_op_start!("apply", package = "pkg.site");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::logging_facility::schema::EVENT_START,
            $($($field)*)?
        );
    };
}

/// Log the successful end of an operation
///
/// ```
/// # use confrec_core::log_op_end;
/// log_op_end!("apply", duration_ms = 42);
/// log_op_end!("apply", duration_ms = 42, invocations = 3);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::logging_facility::schema::EVENT_END,
            duration_ms = $duration,
            $($($field)*)?
        );
    };
}

/// Log the failed end of an operation
///
/// The error goes through [`ExError`](crate::errors::ExError), so the stable
/// code and message are always present.
///
/// ```
/// # use confrec_core::{log_op_error, errors::ConfigError};
/// let err = ConfigError::MalformedInput { reason: "bad".to_string() };
/// log_op_error!("apply", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::logging_facility::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            err.message = ex_err.message(),
            $($($field)*)?
        );
    }};
}
