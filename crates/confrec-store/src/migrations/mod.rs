//! Migration framework
//!
//! - Embedded SQL migrations, applied in order and recorded in
//!   `schema_version`
//! - SHA-256 checksums guard against edited migrations

pub(crate) mod checksums;
mod embedded;
mod runner;

pub use runner::apply_migrations;
