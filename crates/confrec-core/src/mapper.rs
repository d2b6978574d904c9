//! Config mapper
//!
//! Turns a [`ConfigDefinition`] into resolved [`ConfigHandler`]s by
//! substituting every setter template against the new (full) property map and
//! against the previously-applied map.
//!
//! With a partial map (changes-only mode) a setter survives only if it has no
//! placeholders, or references a changed key, or references a key that was
//! removed since the previous apply. Handlers left with no setters are
//! dropped.

use std::collections::BTreeMap;

use crate::errors::{ConfigError, Result};
use crate::model::{
    ConfigDefinition, ConfigHandler, FlatMap, HandlerDef, ObjectState, PropertyBag,
    PropertySetter, PropertyValue, SetterDef,
};
use crate::placeholder::PlaceholderSyntax;

/// Resolve every handler of a definition
///
/// # Errors
///
/// Returns `MalformedPlaceholder` if any template has broken placeholder
/// syntax, or `MalformedInput` if a target resolves to something other than
/// a scalar or a sequence of scalars.
pub fn resolve_handlers(
    definition: &ConfigDefinition,
    partial: Option<&FlatMap>,
    full: &FlatMap,
    previous: &FlatMap,
    syntax: &PlaceholderSyntax,
) -> Result<Vec<ConfigHandler>> {
    let mut handlers = Vec::with_capacity(definition.handlers.len());

    for def in &definition.handlers {
        let handler = resolve_handler(def, partial, full, previous, syntax)?;
        match handler {
            Some(handler) => {
                tracing::debug!(
                    handler = %handler.name,
                    setters = handler.setters.len(),
                    targets = handler.targets.len(),
                    "resolved handler"
                );
                handlers.push(handler);
            }
            None => tracing::debug!(handler = %def.name, "handler unaffected by changes"),
        }
    }

    Ok(handlers)
}

fn resolve_handler(
    def: &HandlerDef,
    partial: Option<&FlatMap>,
    full: &FlatMap,
    previous: &FlatMap,
    syntax: &PlaceholderSyntax,
) -> Result<Option<ConfigHandler>> {
    let mut setters = Vec::with_capacity(def.setters.len());
    for setter_def in &def.setters {
        let references = setter_references(setter_def, syntax)?;
        let setter = resolve_setter(setter_def, full, previous, syntax)?;
        let keep = match partial {
            None => true,
            Some(partial) => is_affected(&references, partial, full, previous),
        };
        if keep {
            setters.push(setter);
        }
    }

    if partial.is_some() && setters.is_empty() {
        return Ok(None);
    }

    let extra = resolve_bags(&def.extra, full, previous, syntax)?;

    Ok(Some(ConfigHandler {
        name: def.name.clone(),
        object_type: def.object_type.clone(),
        setters,
        extra_current: extra.current,
        extra_previous: extra.previous,
        targets: resolve_targets(def, full, previous, syntax)?,
    }))
}

fn setter_references(def: &SetterDef, syntax: &PlaceholderSyntax) -> Result<Vec<String>> {
    let mut references = Vec::new();
    for (_, template) in &def.properties {
        references.extend(syntax.references(template)?);
    }
    Ok(references)
}

fn is_affected(references: &[String], partial: &FlatMap, full: &FlatMap, previous: &FlatMap) -> bool {
    references.is_empty()
        || references.iter().any(|name| {
            partial.contains_key(name) || (!full.contains_key(name) && previous.contains_key(name))
        })
}

fn resolve_setter(
    def: &SetterDef,
    full: &FlatMap,
    previous: &FlatMap,
    syntax: &PlaceholderSyntax,
) -> Result<PropertySetter> {
    let bags = resolve_bags(&def.properties, full, previous, syntax)?;
    Ok(PropertySetter {
        name: def.name.clone(),
        templates: def.properties.clone(),
        current: bags.current,
        previous: bags.previous,
        unresolved: bags.unresolved,
    })
}

struct ResolvedBags {
    current: PropertyBag,
    previous: Option<PropertyBag>,
    unresolved: Vec<String>,
}

fn resolve_bags(
    templates: &[(String, PropertyValue)],
    full: &FlatMap,
    previous: &FlatMap,
    syntax: &PlaceholderSyntax,
) -> Result<ResolvedBags> {
    let mut current = PropertyBag::new();
    let mut previous_bag = PropertyBag::new();
    let mut previous_resolved = false;
    let mut unresolved = Vec::new();

    for (name, template) in templates {
        let now = syntax.substitute(template, full)?;
        match now.value {
            Some(value) => current.insert(name.clone(), value),
            None => unresolved.extend(now.missing),
        }

        if !previous.is_empty() {
            let before = syntax.substitute(template, previous)?;
            if let Some(value) = before.value {
                previous_resolved |= before.resolved > 0;
                previous_bag.insert(name.clone(), value);
            }
        }
    }

    Ok(ResolvedBags {
        current,
        previous: previous_resolved.then_some(previous_bag),
        unresolved,
    })
}

fn resolve_targets(
    def: &HandlerDef,
    full: &FlatMap,
    previous: &FlatMap,
    syntax: &PlaceholderSyntax,
) -> Result<BTreeMap<String, ObjectState>> {
    let mut targets = BTreeMap::new();

    let mut record = |value: Option<PropertyValue>, state: ObjectState| -> Result<()> {
        let Some(value) = value else {
            return Ok(());
        };
        for name in target_names(&def.name, &value)? {
            let merged = match targets.get(&name) {
                Some(existing) => state.merge(*existing),
                None => state,
            };
            targets.insert(name, merged);
        }
        Ok(())
    };

    record(syntax.substitute(&def.target, full)?.value, ObjectState::Current)?;
    if !previous.is_empty() {
        record(
            syntax.substitute(&def.target, previous)?.value,
            ObjectState::Previous,
        )?;
    }

    Ok(targets)
}

fn target_names(handler: &str, value: &PropertyValue) -> Result<Vec<String>> {
    let invalid = || ConfigError::MalformedInput {
        reason: format!(
            "target of handler {} must be a scalar or a list of scalars, got {}",
            handler,
            value.type_name()
        ),
    };

    let scalars: Vec<&str> = match value {
        PropertyValue::Scalar(s) => vec![s.as_str()],
        PropertyValue::Sequence(items) => items
            .iter()
            .map(|item| item.as_scalar().ok_or_else(invalid))
            .collect::<Result<_>>()?,
        _ => return Err(invalid()),
    };

    Ok(scalars
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect())
}
