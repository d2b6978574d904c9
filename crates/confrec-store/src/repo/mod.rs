//! SQLite implementations of the core persistence traits
//!
//! Each repository owns its own connection. Point both at the same database
//! file to keep the status log and the claims together.

pub mod sqlite_claims;
pub mod sqlite_status;

pub use sqlite_claims::SqliteTargetClaims;
pub use sqlite_status::SqliteStatusStore;
