//! Property normalizer
//!
//! Flattens a hierarchical [`PropertySet`] into a [`FlatMap`].
//!
//! ## Addressing rules
//!
//! - A nested property-set becomes a `Mapping` under its own name, keyed by
//!   local names.
//! - With `resolve_fq_name`, every entry reachable through nested mappings is
//!   also inserted at top level under its dotted FQN (`page.header.title`).
//! - Property-sets inside a value-list are reachable only through the list.
//!   They never get top-level FQN entries.
//! - `Absent` declarations are omitted; empty sets and lists stay empty
//!   collections.
//! - A set or list shared by two declarations (same `Arc`) normalizes to one
//!   shared output `Arc`.
//! - When two entries land on the same key, the later one in document order
//!   wins.
//! - [`overlay`] builds new mappings where two mappings meet under one key, so
//!   aliasing identity from the input maps does not survive there.

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::{FlatMap, ListItem, PropertyNode, PropertySet, PropertyValue};

/// Normalize a property document into a flat map
///
/// # Example
///
/// ```
/// use confrec_core::model::PropertySet;
/// use confrec_core::normalize::normalize;
///
/// let doc = PropertySet::new()
///     .with_scalar("x", "1")
///     .with_set("a", PropertySet::new().with_scalar("b", "2").with_scalar("c", "3"));
///
/// assert_eq!(normalize(&doc, false).len(), 2);
/// assert_eq!(normalize(&doc, true).len(), 4);
/// ```
pub fn normalize(document: &PropertySet, resolve_fq_name: bool) -> FlatMap {
    let mut walker = Walker::default();
    let mut result = FlatMap::new();

    for property in &document.properties {
        let Some(value) = walker.node(&property.node) else {
            continue;
        };
        let nested = match &value {
            PropertyValue::Mapping(map) if resolve_fq_name => Some(map.clone()),
            _ => None,
        };
        result.insert(property.name.clone(), value);
        if let Some(map) = nested {
            expose_fq_names(&property.name, &map, &mut result);
        }
    }

    tracing::debug!(
        declared = document.len(),
        property_count = result.len(),
        resolve_fq_name,
        "normalized property document"
    );
    result
}

/// Lay `top` over `base`
///
/// Keys in `top` replace keys in `base`, except that two mappings under the
/// same key are merged recursively.
pub fn overlay(base: &FlatMap, top: &FlatMap) -> FlatMap {
    let mut merged = base.clone();
    for (key, value) in top {
        let value = match (merged.get(key), value) {
            (Some(PropertyValue::Mapping(under)), PropertyValue::Mapping(over))
                if !Arc::ptr_eq(under, over) =>
            {
                PropertyValue::Mapping(Arc::new(overlay(under, over)))
            }
            _ => value.clone(),
        };
        merged.insert(key.clone(), value);
    }
    merged
}

fn expose_fq_names(prefix: &str, map: &FlatMap, result: &mut FlatMap) {
    for (name, value) in map {
        let fq_name = format!("{}.{}", prefix, name);
        result.insert(fq_name.clone(), value.clone());
        if let PropertyValue::Mapping(nested) = value {
            expose_fq_names(&fq_name, nested, result);
        }
    }
}

/// Recursive walk with identity memoization for shared collections
#[derive(Default)]
struct Walker {
    sets: HashMap<*const PropertySet, Arc<FlatMap>>,
    lists: HashMap<*const Vec<ListItem>, Arc<Vec<PropertyValue>>>,
}

impl Walker {
    fn node(&mut self, node: &PropertyNode) -> Option<PropertyValue> {
        match node {
            PropertyNode::Absent => None,
            PropertyNode::Scalar(s) => Some(PropertyValue::Scalar(s.clone())),
            PropertyNode::List(items) => Some(PropertyValue::Sequence(self.list(items))),
            PropertyNode::Pairs(pairs) => Some(PropertyValue::sequence(
                pairs
                    .iter()
                    .map(|(k, v)| {
                        PropertyValue::pair(PropertyValue::scalar(k), PropertyValue::scalar(v))
                    })
                    .collect(),
            )),
            PropertyNode::Set(set) => Some(PropertyValue::Mapping(self.set(set))),
        }
    }

    fn set(&mut self, set: &Arc<PropertySet>) -> Arc<FlatMap> {
        let key = Arc::as_ptr(set);
        if let Some(done) = self.sets.get(&key) {
            return done.clone();
        }

        let mut map = FlatMap::new();
        for property in &set.properties {
            if let Some(value) = self.node(&property.node) {
                map.insert(property.name.clone(), value);
            }
        }

        let map = Arc::new(map);
        self.sets.insert(key, map.clone());
        map
    }

    fn list(&mut self, items: &Arc<Vec<ListItem>>) -> Arc<Vec<PropertyValue>> {
        let key = Arc::as_ptr(items);
        if let Some(done) = self.lists.get(&key) {
            return done.clone();
        }

        let values: Vec<PropertyValue> = items
            .iter()
            .map(|item| match item {
                ListItem::Scalar(s) => PropertyValue::Scalar(s.clone()),
                ListItem::List(inner) => PropertyValue::Sequence(self.list(inner)),
                ListItem::Set(set) => PropertyValue::Mapping(self.set(set)),
            })
            .collect();

        let values = Arc::new(values);
        self.lists.insert(key, values.clone());
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested_doc() -> PropertySet {
        PropertySet::new().with_scalar("x", "1").with_set(
            "a",
            PropertySet::new().with_scalar("b", "2").with_scalar("c", "3"),
        )
    }

    #[test]
    fn test_top_level_only_without_fq_names() {
        let flat = normalize(&nested_doc(), false);
        assert_eq!(flat.len(), 2);
        assert!(flat.contains_key("a"));
        assert!(!flat.contains_key("a.b"));
    }

    #[test]
    fn test_fq_names_added_for_nested_sets() {
        let flat = normalize(&nested_doc(), true);
        assert_eq!(flat.len(), 4);
        assert_eq!(flat.get("a.b"), Some(&PropertyValue::scalar("2")));
        assert_eq!(flat.get("a.c"), Some(&PropertyValue::scalar("3")));

        let nested = flat.get("a").and_then(|v| v.as_mapping()).unwrap();
        assert_eq!(nested.get("b"), Some(&PropertyValue::scalar("2")));
    }

    #[test]
    fn test_deep_nesting_exposes_intermediate_mappings() {
        let doc = PropertySet::new().with_set(
            "page",
            PropertySet::new().with_set("header", PropertySet::new().with_scalar("title", "T")),
        );
        let flat = normalize(&doc, true);
        assert_eq!(flat.len(), 3);
        assert!(flat.get("page.header").unwrap().as_mapping().is_some());
        assert_eq!(flat.get("page.header.title"), Some(&PropertyValue::scalar("T")));
    }

    #[test]
    fn test_empty_collections_are_not_dropped() {
        let doc = PropertySet::new()
            .with_set("empty_set", PropertySet::new())
            .with_list("empty_list", Vec::<&str>::new());
        let flat = normalize(&doc, true);
        assert_eq!(flat.get("empty_set").unwrap().as_mapping().unwrap().len(), 0);
        assert_eq!(flat.get("empty_list").unwrap().as_sequence().unwrap().len(), 0);
    }

    #[test]
    fn test_absent_property_is_omitted() {
        let doc = PropertySet::new().with_scalar("a", "1").with_absent("b");
        let flat = normalize(&doc, true);
        assert_eq!(flat.len(), 1);
        assert!(!flat.contains_key("b"));
    }

    #[test]
    fn test_pairs_become_sequence_of_pairs() {
        let doc = PropertySet::new().with_pairs("aliases", vec![("a", "b")]);
        let flat = normalize(&doc, false);
        let expected = PropertyValue::pair_list(vec![("a", "b")]);
        assert_eq!(flat.get("aliases"), Some(&expected));
    }

    #[test]
    fn test_overlay_merges_mappings() {
        let defaults = normalize(
            &PropertySet::new().with_set(
                "a",
                PropertySet::new().with_scalar("b", "default-b").with_scalar("c", "default-c"),
            ),
            true,
        );
        let local = normalize(
            &PropertySet::new().with_set("a", PropertySet::new().with_scalar("b", "local-b")),
            true,
        );

        let merged = overlay(&defaults, &local);
        assert_eq!(merged.get("a.b"), Some(&PropertyValue::scalar("local-b")));
        assert_eq!(merged.get("a.c"), Some(&PropertyValue::scalar("default-c")));
        let a = merged.get("a").unwrap().as_mapping().unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a.get("b"), Some(&PropertyValue::scalar("local-b")));
    }

    #[test]
    fn test_overlay_rebuilds_merged_mappings() {
        let shared = Arc::new(PropertySet::new().with_scalar("k", "local"));
        let mut doc = PropertySet::new();
        doc.push("first", PropertyNode::Set(shared.clone()));
        doc.push("second", PropertyNode::Set(shared));
        let local = normalize(&doc, false);
        let defaults = normalize(
            &PropertySet::new().with_set("first", PropertySet::new().with_scalar("d", "1")),
            false,
        );

        let merged = overlay(&defaults, &local);

        // The untouched alias keeps its instance; the merged one is new
        match (local.get("second"), merged.get("second")) {
            (Some(PropertyValue::Mapping(a)), Some(PropertyValue::Mapping(b))) => {
                assert!(Arc::ptr_eq(a, b));
            }
            other => panic!("expected mappings, got {:?}", other),
        }
        match (local.get("first"), merged.get("first")) {
            (Some(PropertyValue::Mapping(a)), Some(PropertyValue::Mapping(b))) => {
                assert!(!Arc::ptr_eq(a, b));
                assert_eq!(b.len(), 2);
            }
            other => panic!("expected mappings, got {:?}", other),
        }
    }
}
