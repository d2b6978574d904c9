//! Core types shared across confrec crates
//!
//! This crate provides foundational types used by the engine, the store and
//! the logging facility:
//!
//! - **Identifiers**: RunId (one apply/de-apply attempt), StatusId (one status record)
//! - **Run context**: RunContext carried through an apply for log correlation
//! - **Schema constants**: Canonical field keys and event names

pub mod ids;
pub mod schema;

pub use ids::{RunContext, RunId, StatusId};
