//! Placeholder scanning and substitution
//!
//! A placeholder is `PREFIX name SUFFIX` inside a scalar template (`${site.title}`
//! with the default syntax). Whitespace inside the delimiters is ignored.
//!
//! - A template whose trimmed text is exactly one placeholder is a *whole*
//!   reference: it resolves to the typed value (a sequence stays a sequence).
//! - Any other template with placeholders is *interpolated*: each placeholder
//!   is replaced by its value's display form, left to right, and the result
//!   is a scalar.
//! - Sequences, mappings and pairs are substituted leaf by leaf and keep their
//!   shape. Mapping keys are never substituted.

use serde::Deserialize;

use crate::errors::{ConfigError, Result};
use crate::model::{FlatMap, PropertyValue};

pub const DEFAULT_PREFIX: &str = "${";
pub const DEFAULT_SUFFIX: &str = "}";

/// Placeholder delimiter pair
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlaceholderSyntax {
    pub prefix: String,
    pub suffix: String,
}

impl Default for PlaceholderSyntax {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}

/// Classification of one scalar template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Template {
    /// No placeholders
    Constant,
    /// Exactly one placeholder and nothing but whitespace around it
    Whole(String),
    /// Placeholders mixed with text, or several placeholders
    Interpolated(Vec<Segment>),
}

/// Piece of an interpolated template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Ref(String),
}

/// Result of substituting one template against one property map
#[derive(Debug, Clone, PartialEq)]
pub struct Substitution {
    /// Resolved value; `None` if any referenced name was missing
    pub value: Option<PropertyValue>,
    /// Number of placeholders that found a value
    pub resolved: usize,
    /// Referenced names with no value
    pub missing: Vec<String>,
}

impl PlaceholderSyntax {
    /// Create a syntax with custom delimiters
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` if either delimiter is empty.
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Result<Self> {
        let syntax = Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        };
        syntax.validate()?;
        Ok(syntax)
    }

    /// Check the delimiters are usable
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` if either delimiter is empty.
    pub fn validate(&self) -> Result<()> {
        if self.prefix.is_empty() || self.suffix.is_empty() {
            return Err(ConfigError::MalformedInput {
                reason: "placeholder prefix and suffix must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Locate and classify the placeholders of a scalar template
    ///
    /// # Errors
    ///
    /// Returns `MalformedPlaceholder` for an unterminated placeholder, an empty
    /// name, or a name containing the prefix.
    pub fn scan(&self, text: &str) -> Result<Template> {
        let mut segments = Vec::new();
        let mut refs = 0usize;
        let mut rest = text;

        while let Some(start) = rest.find(self.prefix.as_str()) {
            if start > 0 {
                segments.push(Segment::Text(rest[..start].to_string()));
            }
            let after = &rest[start + self.prefix.len()..];
            let end = after
                .find(self.suffix.as_str())
                .ok_or_else(|| malformed(text, "unterminated placeholder"))?;
            let raw = &after[..end];
            if raw.contains(self.prefix.as_str()) {
                return Err(malformed(text, "nested placeholder"));
            }
            let name = raw.trim();
            if name.is_empty() {
                return Err(malformed(text, "empty placeholder name"));
            }
            segments.push(Segment::Ref(name.to_string()));
            refs += 1;
            rest = &after[end + self.suffix.len()..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        if refs == 0 {
            return Ok(Template::Constant);
        }
        if refs == 1 {
            let only_whitespace_around = segments.iter().all(|s| match s {
                Segment::Text(t) => t.trim().is_empty(),
                Segment::Ref(_) => true,
            });
            if only_whitespace_around {
                if let Some(Segment::Ref(name)) =
                    segments.into_iter().find(|s| matches!(s, Segment::Ref(_)))
                {
                    return Ok(Template::Whole(name));
                }
                return Err(malformed(text, "placeholder scan lost its reference"));
            }
        }
        Ok(Template::Interpolated(segments))
    }

    /// Every placeholder name referenced by a template, in encounter order
    ///
    /// # Errors
    ///
    /// Propagates `MalformedPlaceholder` from [`scan`](Self::scan).
    pub fn references(&self, template: &PropertyValue) -> Result<Vec<String>> {
        let mut names = Vec::new();
        self.collect_references(template, &mut names)?;
        Ok(names)
    }

    fn collect_references(&self, template: &PropertyValue, names: &mut Vec<String>) -> Result<()> {
        match template {
            PropertyValue::Scalar(text) => match self.scan(text)? {
                Template::Constant => {}
                Template::Whole(name) => names.push(name),
                Template::Interpolated(segments) => {
                    names.extend(segments.into_iter().filter_map(|s| match s {
                        Segment::Ref(name) => Some(name),
                        Segment::Text(_) => None,
                    }));
                }
            },
            PropertyValue::Sequence(items) => {
                for item in items.iter() {
                    self.collect_references(item, names)?;
                }
            }
            PropertyValue::Mapping(map) => {
                for value in map.values() {
                    self.collect_references(value, names)?;
                }
            }
            PropertyValue::Pair(first, second) => {
                self.collect_references(first, names)?;
                self.collect_references(second, names)?;
            }
        }
        Ok(())
    }

    /// Substitute a template against a property map
    ///
    /// # Errors
    ///
    /// Propagates `MalformedPlaceholder` from [`scan`](Self::scan). Missing
    /// names are not errors; they are reported in [`Substitution::missing`].
    pub fn substitute(&self, template: &PropertyValue, props: &FlatMap) -> Result<Substitution> {
        let mut resolved = 0usize;
        let mut missing = Vec::new();
        let value = self.substitute_value(template, props, &mut resolved, &mut missing)?;
        Ok(Substitution {
            value: if missing.is_empty() { value } else { None },
            resolved,
            missing,
        })
    }

    fn substitute_value(
        &self,
        template: &PropertyValue,
        props: &FlatMap,
        resolved: &mut usize,
        missing: &mut Vec<String>,
    ) -> Result<Option<PropertyValue>> {
        let value = match template {
            PropertyValue::Scalar(text) => match self.scan(text)? {
                Template::Constant => Some(template.clone()),
                Template::Whole(name) => match props.get(&name) {
                    Some(value) => {
                        *resolved += 1;
                        Some(value.clone())
                    }
                    None => {
                        missing.push(name);
                        None
                    }
                },
                Template::Interpolated(segments) => {
                    let mut out = String::new();
                    let mut complete = true;
                    for segment in segments {
                        match segment {
                            Segment::Text(t) => out.push_str(&t),
                            Segment::Ref(name) => match props.get(&name) {
                                Some(value) => {
                                    *resolved += 1;
                                    out.push_str(&value.to_string());
                                }
                                None => {
                                    complete = false;
                                    missing.push(name);
                                }
                            },
                        }
                    }
                    complete.then_some(PropertyValue::Scalar(out))
                }
            },
            PropertyValue::Sequence(items) => {
                let mut out = Vec::with_capacity(items.len());
                let mut complete = true;
                for item in items.iter() {
                    match self.substitute_value(item, props, resolved, missing)? {
                        Some(v) => out.push(v),
                        None => complete = false,
                    }
                }
                complete.then(|| PropertyValue::sequence(out))
            }
            PropertyValue::Mapping(map) => {
                let mut out = FlatMap::new();
                let mut complete = true;
                for (key, item) in map.iter() {
                    match self.substitute_value(item, props, resolved, missing)? {
                        Some(v) => {
                            out.insert(key.clone(), v);
                        }
                        None => complete = false,
                    }
                }
                complete.then(|| PropertyValue::mapping(out))
            }
            PropertyValue::Pair(first, second) => {
                let first = self.substitute_value(first, props, resolved, missing)?;
                let second = self.substitute_value(second, props, resolved, missing)?;
                match (first, second) {
                    (Some(a), Some(b)) => Some(PropertyValue::pair(a, b)),
                    _ => None,
                }
            }
        };
        Ok(value)
    }
}

fn malformed(template: &str, reason: &str) -> ConfigError {
    ConfigError::MalformedPlaceholder {
        template: template.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props() -> FlatMap {
        let mut map = FlatMap::new();
        map.insert("X".to_string(), PropertyValue::sequence(vec!["a".into(), "b".into()]));
        map.insert("name".to_string(), PropertyValue::scalar("home"));
        map.insert("n".to_string(), PropertyValue::scalar("7"));
        map
    }

    #[test]
    fn test_scan_classifies_templates() {
        let syntax = PlaceholderSyntax::default();
        assert_eq!(syntax.scan("plain").unwrap(), Template::Constant);
        assert_eq!(syntax.scan("${X}").unwrap(), Template::Whole("X".to_string()));
        assert_eq!(
            syntax.scan("  ${ X }  ").unwrap(),
            Template::Whole("X".to_string())
        );
        assert!(matches!(
            syntax.scan("A ${X} B").unwrap(),
            Template::Interpolated(_)
        ));
        assert!(matches!(
            syntax.scan("${a}${b}").unwrap(),
            Template::Interpolated(_)
        ));
    }

    #[test]
    fn test_scan_rejects_malformed() {
        let syntax = PlaceholderSyntax::default();
        assert!(matches!(
            syntax.scan("${open"),
            Err(ConfigError::MalformedPlaceholder { .. })
        ));
        assert!(matches!(
            syntax.scan("${  }"),
            Err(ConfigError::MalformedPlaceholder { .. })
        ));
        assert!(matches!(
            syntax.scan("${a${b}}"),
            Err(ConfigError::MalformedPlaceholder { .. })
        ));
    }

    #[test]
    fn test_whole_reference_keeps_type() {
        let syntax = PlaceholderSyntax::default();
        let sub = syntax.substitute(&"${X}".into(), &props()).unwrap();
        assert_eq!(
            sub.value,
            Some(PropertyValue::sequence(vec!["a".into(), "b".into()]))
        );
        assert_eq!(sub.resolved, 1);
    }

    #[test]
    fn test_interpolation_stringifies() {
        let syntax = PlaceholderSyntax::default();
        let sub = syntax.substitute(&"A ${X} B".into(), &props()).unwrap();
        assert_eq!(sub.value, Some(PropertyValue::scalar("A [a, b] B")));
    }

    #[test]
    fn test_multiple_placeholders_in_order() {
        let syntax = PlaceholderSyntax::default();
        let sub = syntax.substitute(&"${name}-${n}".into(), &props()).unwrap();
        assert_eq!(sub.value, Some(PropertyValue::scalar("home-7")));
        assert_eq!(sub.resolved, 2);
    }

    #[test]
    fn test_missing_reference_yields_no_value() {
        let syntax = PlaceholderSyntax::default();
        let sub = syntax.substitute(&"${name} ${nope}".into(), &props()).unwrap();
        assert_eq!(sub.value, None);
        assert_eq!(sub.missing, vec!["nope".to_string()]);
        assert_eq!(sub.resolved, 1);
    }

    #[test]
    fn test_nested_templates_keep_shape() {
        let syntax = PlaceholderSyntax::default();
        let mut map = FlatMap::new();
        map.insert("k".to_string(), PropertyValue::scalar("${name}"));
        let template = PropertyValue::sequence(vec![
            PropertyValue::mapping(map),
            PropertyValue::pair("${n}".into(), "fixed".into()),
        ]);

        let sub = syntax.substitute(&template, &props()).unwrap();
        let mut expected_map = FlatMap::new();
        expected_map.insert("k".to_string(), PropertyValue::scalar("home"));
        assert_eq!(
            sub.value,
            Some(PropertyValue::sequence(vec![
                PropertyValue::mapping(expected_map),
                PropertyValue::pair("7".into(), "fixed".into()),
            ]))
        );
    }

    #[test]
    fn test_custom_delimiters() {
        let syntax = PlaceholderSyntax::new("@{", "}@").unwrap();
        let sub = syntax.substitute(&"x-@{name}@".into(), &props()).unwrap();
        assert_eq!(sub.value, Some(PropertyValue::scalar("x-home")));
        assert!(PlaceholderSyntax::new("", "}").is_err());
    }

    #[test]
    fn test_references_in_encounter_order() {
        let syntax = PlaceholderSyntax::default();
        let template = PropertyValue::sequence(vec!["${b}".into(), "x ${a} ${c}".into()]);
        assert_eq!(
            syntax.references(&template).unwrap(),
            vec!["b".to_string(), "a".to_string(), "c".to_string()]
        );
    }
}
