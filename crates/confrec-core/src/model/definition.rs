use super::value::PropertyValue;

/// A package's config definition: the handlers to resolve and run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDefinition {
    pub handlers: Vec<HandlerDef>,
}

/// Declaration of one handler
///
/// `target` is a template naming the object(s) the handler configures. It may
/// resolve to a scalar (one object) or a sequence of scalars (several).
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerDef {
    pub name: String,
    pub object_type: String,
    pub target: PropertyValue,
    pub setters: Vec<SetterDef>,
    pub extra: Vec<(String, PropertyValue)>,
}

/// Declaration of one property setter: ordered property templates
#[derive(Debug, Clone, PartialEq)]
pub struct SetterDef {
    pub name: String,
    pub properties: Vec<(String, PropertyValue)>,
}

impl ConfigDefinition {
    /// Create an empty definition
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a handler
    pub fn with_handler(mut self, handler: HandlerDef) -> Self {
        self.handlers.push(handler);
        self
    }
}

impl HandlerDef {
    /// Create a handler with no setters
    pub fn new(
        name: impl Into<String>,
        object_type: impl Into<String>,
        target: impl Into<PropertyValue>,
    ) -> Self {
        Self {
            name: name.into(),
            object_type: object_type.into(),
            target: target.into(),
            setters: Vec::new(),
            extra: Vec::new(),
        }
    }

    /// Builder: add a setter
    pub fn with_setter(mut self, setter: SetterDef) -> Self {
        self.setters.push(setter);
        self
    }

    /// Builder: add an extra property template
    pub fn with_extra(mut self, key: impl Into<String>, template: impl Into<PropertyValue>) -> Self {
        self.extra.push((key.into(), template.into()));
        self
    }
}

impl SetterDef {
    /// Create a setter with no properties
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    /// Builder: add a property template
    pub fn with_property(
        mut self,
        name: impl Into<String>,
        template: impl Into<PropertyValue>,
    ) -> Self {
        self.properties.push((name.into(), template.into()));
        self
    }
}
