use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Flat property namespace: fully-qualified dotted name to value
pub type FlatMap = BTreeMap<String, PropertyValue>;

/// A property value
///
/// Collections are shared through `Arc` so that a collection referenced from
/// two places in a document stays one instance after normalization. Equality
/// is structural.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// Plain text
    Scalar(String),
    /// Ordered list of values (a pair-list is a sequence of `Pair`s)
    Sequence(Arc<Vec<PropertyValue>>),
    /// Nested map keyed by local names
    Mapping(Arc<FlatMap>),
    /// Two-tuple
    Pair(Box<PropertyValue>, Box<PropertyValue>),
}

impl PropertyValue {
    /// Create a scalar value
    pub fn scalar(s: impl Into<String>) -> Self {
        PropertyValue::Scalar(s.into())
    }

    /// Create a sequence value
    pub fn sequence(items: Vec<PropertyValue>) -> Self {
        PropertyValue::Sequence(Arc::new(items))
    }

    /// Create a mapping value
    pub fn mapping(map: FlatMap) -> Self {
        PropertyValue::Mapping(Arc::new(map))
    }

    /// Create a pair value
    pub fn pair(first: PropertyValue, second: PropertyValue) -> Self {
        PropertyValue::Pair(Box::new(first), Box::new(second))
    }

    /// Create a pair-list from scalar tuples
    pub fn pair_list<K: Into<String>, V: Into<String>>(pairs: Vec<(K, V)>) -> Self {
        PropertyValue::sequence(
            pairs
                .into_iter()
                .map(|(k, v)| PropertyValue::pair(PropertyValue::scalar(k), PropertyValue::scalar(v)))
                .collect(),
        )
    }

    /// Borrow the text of a scalar
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            PropertyValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the items of a sequence
    pub fn as_sequence(&self) -> Option<&[PropertyValue]> {
        match self {
            PropertyValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow the entries of a mapping
    pub fn as_mapping(&self) -> Option<&FlatMap> {
        match self {
            PropertyValue::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Whether this is a scalar
    pub fn is_scalar(&self) -> bool {
        matches!(self, PropertyValue::Scalar(_))
    }

    /// Short type tag used in log fields and messages
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Scalar(_) => "scalar",
            PropertyValue::Sequence(_) => "sequence",
            PropertyValue::Mapping(_) => "mapping",
            PropertyValue::Pair(_, _) => "pair",
        }
    }
}

/// Stringification used when a value is interpolated into surrounding text
impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Scalar(s) => write!(f, "{}", s),
            PropertyValue::Sequence(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            PropertyValue::Mapping(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", k, v)?;
                }
                write!(f, "}}")
            }
            PropertyValue::Pair(first, second) => write!(f, "({}, {})", first, second),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Scalar(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Scalar(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_shapes() {
        let seq = PropertyValue::sequence(vec!["a".into(), "b".into()]);
        assert_eq!(seq.to_string(), "[a, b]");

        let mut map = FlatMap::new();
        map.insert("k".to_string(), "v".into());
        map.insert("k2".to_string(), "v2".into());
        assert_eq!(PropertyValue::mapping(map).to_string(), "{k=v, k2=v2}");

        let pairs = PropertyValue::pair_list(vec![("x", "1")]);
        assert_eq!(pairs.to_string(), "[(x, 1)]");
    }

    #[test]
    fn test_equality_is_structural() {
        let a = PropertyValue::sequence(vec!["x".into()]);
        let b = PropertyValue::sequence(vec!["x".into()]);
        assert_eq!(a, b);
        assert_ne!(a, PropertyValue::scalar("x"));
    }

    #[test]
    fn test_accessors() {
        let v = PropertyValue::scalar("hello");
        assert_eq!(v.as_scalar(), Some("hello"));
        assert!(v.as_sequence().is_none());
        assert_eq!(v.type_name(), "scalar");
    }
}
