//! YAML document schema
//!
//! Raw serde shapes of the property and definition documents. Values stay as
//! `serde_yaml::Value` here; the parsers decide what each shape means.

use serde::Deserialize;
use serde_yaml::{Mapping, Value};

/// Top-level property document (`default-config.yaml`, `local-config.yaml`)
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyDoc {
    #[serde(default)]
    pub properties: Vec<RawProperty>,
}

/// One property declaration; at most one body field may be set
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawProperty {
    pub name: String,
    pub value: Option<Value>,
    pub list: Option<Vec<Value>>,
    pub pairs: Option<Vec<Vec<Value>>>,
    pub properties: Option<Vec<RawProperty>>,
    #[serde(rename = "ref")]
    pub reference: Option<String>,
}

/// Top-level config definition (`config-definition.yaml`)
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefinitionDoc {
    #[serde(default)]
    pub handlers: Vec<RawHandler>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawHandler {
    pub name: String,
    #[serde(rename = "type")]
    pub object_type: String,
    pub target: Value,
    #[serde(default)]
    pub setters: Vec<RawSetter>,
    #[serde(default)]
    pub extra: Mapping,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSetter {
    pub name: String,
    #[serde(default)]
    pub properties: Mapping,
}
