use std::sync::Arc;

/// A hierarchical property-definition document (default or local config)
///
/// Properties keep their declaration order. Two properties that hold the same
/// `Arc` (set or list) are aliases of one collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertySet {
    pub properties: Vec<Property>,
}

/// One named property declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub node: PropertyNode,
}

/// Body of a property declaration
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyNode {
    /// Explicitly declared with no value; omitted by normalization
    Absent,
    Scalar(String),
    List(Arc<Vec<ListItem>>),
    Pairs(Vec<(String, String)>),
    Set(Arc<PropertySet>),
}

/// Element of a value-list
#[derive(Debug, Clone, PartialEq)]
pub enum ListItem {
    Scalar(String),
    List(Arc<Vec<ListItem>>),
    Set(Arc<PropertySet>),
}

impl PropertySet {
    /// Create an empty property set
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a scalar property
    pub fn with_scalar(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, PropertyNode::Scalar(value.into()));
        self
    }

    /// Builder: add a scalar value-list
    pub fn with_list<S: Into<String>>(mut self, name: impl Into<String>, items: Vec<S>) -> Self {
        let items = items.into_iter().map(|s| ListItem::Scalar(s.into())).collect();
        self.push(name, PropertyNode::List(Arc::new(items)));
        self
    }

    /// Builder: add a pair-list
    pub fn with_pairs<K: Into<String>, V: Into<String>>(
        mut self,
        name: impl Into<String>,
        pairs: Vec<(K, V)>,
    ) -> Self {
        let pairs = pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self.push(name, PropertyNode::Pairs(pairs));
        self
    }

    /// Builder: add a nested property set
    pub fn with_set(mut self, name: impl Into<String>, set: PropertySet) -> Self {
        self.push(name, PropertyNode::Set(Arc::new(set)));
        self
    }

    /// Builder: add an explicitly absent property
    pub fn with_absent(mut self, name: impl Into<String>) -> Self {
        self.push(name, PropertyNode::Absent);
        self
    }

    /// Append a property declaration
    pub fn push(&mut self, name: impl Into<String>, node: PropertyNode) {
        self.properties.push(Property {
            name: name.into(),
            node,
        });
    }

    /// Number of direct declarations
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether the set declares nothing
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Find a direct declaration by name
    pub fn get(&self, name: &str) -> Option<&PropertyNode> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.node)
    }
}
