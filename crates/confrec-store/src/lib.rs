//! confrec store - persistence and document formats
//!
//! Provides:
//! - SQLite status log and target-claims registry with embedded migrations
//! - YAML parsers for property documents and config definitions
//! - Package directory layout

pub mod db;
pub mod document;
pub mod errors;
pub mod migrations;
pub mod package;
pub mod repo;

// Re-export key types
pub use document::{parse_config_definition, parse_property_set};
pub use errors::Result;
pub use package::{PackageFiles, PackageSources};
pub use repo::{SqliteStatusStore, SqliteTargetClaims};
