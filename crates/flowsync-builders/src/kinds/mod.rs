//! Per-kind builder implementations and their shared helpers.

pub mod agent;
pub mod agent_call;
pub mod branch;
pub mod call;
pub mod connection;
pub mod generic;

use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

use flowsync_catalog::ParamSpec;
use flowsync_core::{
    Codedata, ModelNode, Node, NodeKind, Property, PropertyValue, Span, SyncError,
};
use flowsync_workspace::{RawField, Symbol};

use crate::context::BuildContext;

/// Picks a binding name not already taken by a visible symbol: `base`,
/// then `base2`, `base3`, ...
pub(crate) fn unique_name(base: &str, symbols: &[Symbol]) -> String {
    let taken: HashSet<&str> = symbols.iter().map(|s| s.name.as_str()).collect();
    if !taken.contains(base) {
        return base.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}{}", base, n);
        if !taken.contains(candidate.as_str()) {
            return candidate;
        }
        n += 1;
    }
}

/// Suggests a variable base name from a type descriptor: the last dotted
/// segment, lowercased (`http.Client` -> `client`).
pub(crate) fn base_name_from_descriptor(descriptor: &str) -> String {
    descriptor
        .rsplit('.')
        .next()
        .unwrap_or(descriptor)
        .to_lowercase()
}

/// Builds an exclusion set from literal keys.
pub(crate) fn exclusion(keys: &[&str]) -> BTreeSet<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

/// The rendered value of a property that must be set before rendering.
pub(crate) fn required_rendered(model: &ModelNode, key: &str) -> Result<String, SyncError> {
    model
        .property(key)
        .and_then(|p| p.value.as_ref())
        .map(PropertyValue::render)
        .ok_or_else(|| {
            SyncError::invalid_state(format!("property '{}' has no value", key))
        })
}

/// The unrendered text of a string-like property value, if set.
pub(crate) fn raw_text(model: &ModelNode, key: &str) -> Option<String> {
    let value = model.property(key)?.value.as_ref()?;
    Some(match value {
        PropertyValue::Text(s)
        | PropertyValue::Expression(s)
        | PropertyValue::Identifier(s)
        | PropertyValue::TypeDescriptor(s) => s.clone(),
        other => other.render(),
    })
}

/// Infers a value from literal source text when no parameter spec declares
/// its type: boolean, then numeric, then quoted text, else expression.
pub(crate) fn infer_value(text: &str) -> PropertyValue {
    let text = text.trim();
    if let Some(v) = PropertyValue::parse(flowsync_core::ValueType::Boolean, text) {
        return v;
    }
    if let Some(v) = PropertyValue::parse(flowsync_core::ValueType::Numeric, text) {
        return v;
    }
    if let Some(v) = PropertyValue::parse(flowsync_core::ValueType::Text, text) {
        return v;
    }
    PropertyValue::Expression(text.to_string())
}

/// Maps one raw construct field to a property, typed by the matching
/// parameter spec when the catalog entry declares one.
pub(crate) fn field_property(
    ctx: &BuildContext,
    construct: NodeKind,
    key: &str,
    field: &RawField,
    spec: Option<&ParamSpec>,
) -> Result<Property, SyncError> {
    let value = match spec {
        Some(spec) => {
            PropertyValue::parse(spec.value_type, &field.text).ok_or_else(|| {
                SyncError::malformed(
                    ctx.file.clone(),
                    field.span.start,
                    format!("'{}' is not a valid {} for '{}'", field.text, spec.value_type, key),
                )
            })?
        }
        None => infer_value(&field.text),
    };
    let modified = spec.is_none_or(|s| s.default.as_ref() != Some(&value));

    let mut builder = Property::builder(key, value.value_type())
        .value(value)
        .modified(modified)
        .codedata(Codedata {
            construct,
            original_name: Some(key.to_string()),
            span: Some(field.span),
        });
    if let Some(spec) = spec {
        builder = builder.optional(spec.optional);
        if let Some(default) = &spec.default {
            builder = builder.default_value(default.clone());
        }
        if let Some(placeholder) = &spec.placeholder {
            builder = builder.placeholder(placeholder.clone());
        }
    }
    builder.build()
}

/// Templates one property from a catalog parameter spec.
pub(crate) fn templated_param(construct: NodeKind, spec: &ParamSpec) -> Result<Property, SyncError> {
    let mut builder = Property::builder(&spec.key, spec.value_type)
        .optional(spec.optional)
        .codedata(Codedata::templated(construct));
    if let Some(default) = &spec.default {
        builder = builder
            .default_value(default.clone())
            .value(default.clone());
    }
    if let Some(placeholder) = &spec.placeholder {
        builder = builder.placeholder(placeholder.clone());
    }
    if let Some(description) = &spec.description {
        builder = builder.description(description.clone());
    }
    builder.build()
}

/// The file and span an edit for `node` anchors to: the node's own location
/// when it is already materialized, then the span its provenance remembers,
/// then the request's insertion point.
pub(crate) fn anchor_of(node: &Node, ctx: &BuildContext) -> (PathBuf, Span) {
    match node.location() {
        Some(location) => (location.file.clone(), location.span),
        None => {
            let span = node
                .model()
                .codedata
                .as_ref()
                .and_then(|cd| cd.span)
                .unwrap_or_else(|| ctx.anchor_span());
            (ctx.file.clone(), span)
        }
    }
}
