//! Delta finder
//!
//! One-directional diff between two flat property maps: what must be
//! (re)applied to move from `old` to `new`. Keys that exist only in `old` are
//! never reported.

use crate::model::FlatMap;

/// Keys of `new` that are absent from `old` or hold a different value
///
/// ```
/// use confrec_core::delta::delta;
/// use confrec_core::model::{FlatMap, PropertyValue};
///
/// let mut old = FlatMap::new();
/// old.insert("a".to_string(), PropertyValue::scalar("1"));
/// let mut new = old.clone();
/// new.insert("b".to_string(), PropertyValue::scalar("2"));
///
/// let d = delta(&new, &old);
/// assert_eq!(d.len(), 1);
/// assert!(d.contains_key("b"));
/// assert!(delta(&old, &new).is_empty());
/// ```
pub fn delta(new: &FlatMap, old: &FlatMap) -> FlatMap {
    new.iter()
        .filter(|(key, value)| old.get(*key) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
