//! YAML documents
//!
//! - Property documents (defaults and local overrides)
//! - Config definitions (handlers, setters, templates)

pub mod definition;
pub mod format;
pub mod properties;

pub use definition::parse_config_definition;
pub use properties::parse_property_set;
