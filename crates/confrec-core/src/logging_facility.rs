//! Structured logging facility for confrec
//!
//! - Single initialization point via `init(profile)`
//! - Structured logging macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! # Usage
//!
//! ```rust
//! use confrec_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```
//!
//! Every apply and de-apply emits one `start` event and exactly one of
//! `end` / `end_error`, tagged with the package name and run id.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use confrec_core_types::schema;
pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
