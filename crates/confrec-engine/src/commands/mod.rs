//! Command orchestration layer.
//!
//! Provides high-level command functions that coordinate between
//! core reconciliation logic, package files and the status database.

pub mod engine_command;
pub mod package;
