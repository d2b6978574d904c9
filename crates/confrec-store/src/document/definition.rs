//! Config definition parser
//!
//! ```yaml
//! handlers:
//!   - name: site
//!     type: site
//!     target: "${site.name}"
//!     setters:
//!       - name: title
//!         properties:
//!           title: "${site.title}"
//!     extra:
//!       owner: "${site.owner}"
//! ```
//!
//! Template values may be scalars, sequences or mappings of templates.

#![allow(clippy::result_large_err)]

use std::collections::HashSet;

use confrec_core::errors::Result as CoreResult;
use confrec_core::model::{ConfigDefinition, FlatMap, HandlerDef, PropertyValue, SetterDef};
use serde_yaml::{Mapping, Value};

use crate::document::format::{DefinitionDoc, RawHandler};
use crate::errors::malformed;

/// Parse a config definition
///
/// # Errors
///
/// Returns `MalformedInput` for YAML errors, unknown keys, empty or duplicate
/// handler names, and null or tagged template values.
pub fn parse_config_definition(content: &str) -> CoreResult<ConfigDefinition> {
    if content.trim().is_empty() {
        return Ok(ConfigDefinition::new());
    }
    let doc: DefinitionDoc = serde_yaml::from_str(content)
        .map_err(|e| malformed(format!("YAML parse error: {}", e)))?;

    let mut seen = HashSet::new();
    let mut definition = ConfigDefinition::new();
    for raw in &doc.handlers {
        if raw.name.trim().is_empty() || raw.object_type.trim().is_empty() {
            return Err(malformed("handler name and type must not be empty"));
        }
        if !seen.insert(raw.name.as_str()) {
            return Err(malformed(format!("duplicate handler {}", raw.name)));
        }
        definition = definition.with_handler(handler(raw)?);
    }
    Ok(definition)
}

fn handler(raw: &RawHandler) -> CoreResult<HandlerDef> {
    let context = format!("handler {}", raw.name);
    let mut handler = HandlerDef::new(
        raw.name.clone(),
        raw.object_type.clone(),
        template(&raw.target, &context)?,
    );

    for setter in &raw.setters {
        let context = format!("setter {}.{}", raw.name, setter.name);
        let mut def = SetterDef::new(setter.name.clone());
        for (key, value) in entries(&setter.properties, &context)? {
            def = def.with_property(key, value);
        }
        handler = handler.with_setter(def);
    }

    for (key, value) in entries(&raw.extra, &context)? {
        handler = handler.with_extra(key, value);
    }
    Ok(handler)
}

/// Mapping entries as templates, in document order
fn entries(mapping: &Mapping, context: &str) -> CoreResult<Vec<(String, PropertyValue)>> {
    mapping
        .iter()
        .map(|(key, value)| Ok((key_text(key, context)?, template(value, context)?)))
        .collect()
}

fn template(value: &Value, context: &str) -> CoreResult<PropertyValue> {
    match value {
        Value::String(s) => Ok(PropertyValue::scalar(s.clone())),
        Value::Number(n) => Ok(PropertyValue::scalar(n.to_string())),
        Value::Bool(b) => Ok(PropertyValue::scalar(b.to_string())),
        Value::Sequence(items) => Ok(PropertyValue::sequence(
            items
                .iter()
                .map(|item| template(item, context))
                .collect::<CoreResult<_>>()?,
        )),
        Value::Mapping(mapping) => {
            let mut map = FlatMap::new();
            for (key, value) in entries(mapping, context)? {
                map.insert(key, value);
            }
            Ok(PropertyValue::mapping(map))
        }
        Value::Null => Err(malformed(format!("{} has an empty template", context))),
        Value::Tagged(_) => Err(malformed(format!("{} uses an unsupported YAML tag", context))),
    }
}

fn key_text(key: &Value, context: &str) -> CoreResult<String> {
    match key {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(malformed(format!("{} has a non-scalar key", context))),
    }
}
