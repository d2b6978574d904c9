//! Property document parser
//!
//! ```yaml
//! properties:
//!   - name: title
//!     value: Home
//!   - name: colors
//!     list: [red, green]
//!   - name: aliases
//!     pairs: [[a, b]]
//!   - name: page
//!     properties:
//!       - name: width
//!         value: 10
//!   - name: same_page
//!     ref: page
//!   - name: unset
//! ```
//!
//! A `ref` names an earlier property-set or value-list by its dotted path and
//! shares that instance. Numbers and booleans are read as text.

#![allow(clippy::result_large_err)]

use std::collections::HashMap;
use std::sync::Arc;

use confrec_core::errors::Result as CoreResult;
use confrec_core::model::{ListItem, PropertyNode, PropertySet};
use serde_yaml::Value;

use crate::document::format::{PropertyDoc, RawProperty};
use crate::errors::malformed;

/// Parse a property document
///
/// Blank input is an empty property-set.
///
/// # Errors
///
/// Returns `MalformedInput` for YAML errors, unknown keys, more than one body
/// on a property, empty names, malformed pairs or unknown references.
pub fn parse_property_set(content: &str) -> CoreResult<PropertySet> {
    if content.trim().is_empty() {
        return Ok(PropertySet::new());
    }
    let doc: PropertyDoc = serde_yaml::from_str(content)
        .map_err(|e| malformed(format!("YAML parse error: {}", e)))?;

    Builder::default().set(&doc.properties, Some(""))
}

enum Shared {
    Set(Arc<PropertySet>),
    List(Arc<Vec<ListItem>>),
}

/// Builds the tree, remembering addressable collections for `ref`
#[derive(Default)]
struct Builder {
    shared: HashMap<String, Shared>,
}

impl Builder {
    /// `prefix` is `None` inside value-lists, whose sets are not addressable
    fn set(&mut self, properties: &[RawProperty], prefix: Option<&str>) -> CoreResult<PropertySet> {
        let mut set = PropertySet::new();
        for raw in properties {
            if raw.name.trim().is_empty() {
                return Err(malformed("property name must not be empty"));
            }
            let path = prefix.map(|p| {
                if p.is_empty() {
                    raw.name.clone()
                } else {
                    format!("{}.{}", p, raw.name)
                }
            });
            let node = self.node(raw, path.as_deref())?;
            set.push(raw.name.clone(), node);
        }
        Ok(set)
    }

    fn node(&mut self, raw: &RawProperty, path: Option<&str>) -> CoreResult<PropertyNode> {
        let bodies = [
            raw.value.is_some(),
            raw.list.is_some(),
            raw.pairs.is_some(),
            raw.properties.is_some(),
            raw.reference.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count();
        if bodies > 1 {
            return Err(malformed(format!(
                "property {} declares more than one of value/list/pairs/properties/ref",
                raw.name
            )));
        }

        if let Some(value) = &raw.value {
            return Ok(PropertyNode::Scalar(scalar_text(value, &raw.name)?));
        }
        if let Some(items) = &raw.list {
            let items = Arc::new(self.list_items(items, &raw.name)?);
            if let Some(path) = path {
                self.shared.insert(path.to_string(), Shared::List(items.clone()));
            }
            return Ok(PropertyNode::List(items));
        }
        if let Some(pairs) = &raw.pairs {
            return Ok(PropertyNode::Pairs(pair_entries(pairs, &raw.name)?));
        }
        if let Some(properties) = &raw.properties {
            let set = Arc::new(self.set(properties, path)?);
            if let Some(path) = path {
                self.shared.insert(path.to_string(), Shared::Set(set.clone()));
            }
            return Ok(PropertyNode::Set(set));
        }
        if let Some(reference) = &raw.reference {
            return match self.shared.get(reference) {
                Some(Shared::Set(set)) => Ok(PropertyNode::Set(set.clone())),
                Some(Shared::List(items)) => Ok(PropertyNode::List(items.clone())),
                None => Err(malformed(format!(
                    "property {} references unknown set or list '{}'",
                    raw.name, reference
                ))),
            };
        }
        Ok(PropertyNode::Absent)
    }

    fn list_items(&mut self, items: &[Value], owner: &str) -> CoreResult<Vec<ListItem>> {
        items.iter().map(|item| self.list_item(item, owner)).collect()
    }

    fn list_item(&mut self, item: &Value, owner: &str) -> CoreResult<ListItem> {
        match item {
            Value::Sequence(inner) => Ok(ListItem::List(Arc::new(self.list_items(inner, owner)?))),
            Value::Mapping(_) => {
                let doc: PropertyDoc = serde_yaml::from_value(item.clone()).map_err(|e| {
                    malformed(format!("list {} has an invalid set element: {}", owner, e))
                })?;
                Ok(ListItem::Set(Arc::new(self.set(&doc.properties, None)?)))
            }
            other => Ok(ListItem::Scalar(scalar_text(other, owner)?)),
        }
    }
}

fn scalar_text(value: &Value, owner: &str) -> CoreResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(malformed(format!(
            "property {} must hold a scalar value",
            owner
        ))),
    }
}

fn pair_entries(pairs: &[Vec<Value>], owner: &str) -> CoreResult<Vec<(String, String)>> {
    pairs
        .iter()
        .map(|pair| match pair.as_slice() {
            [first, second] => Ok((scalar_text(first, owner)?, scalar_text(second, owner)?)),
            _ => Err(malformed(format!(
                "pair-list {} entries must have exactly two elements",
                owner
            ))),
        })
        .collect()
}
