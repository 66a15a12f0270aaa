//! Properties: the atomic unit of model state.
//!
//! A [`Property`] is a single typed, named value with display metadata,
//! behavioral flags, and provenance. Properties are immutable once built --
//! "updating" one means producing a new value through the copy contract
//! ([`Property::with_value`]) and replacing the map entry on the owning node.
//! This keeps provenance and template metadata intact across edits.
//!
//! [`PropertyBuilder`] accumulates attributes through fluent,
//! order-independent setters; `build()` checks the value-type invariant.

use serde::{Deserialize, Serialize};

use crate::codedata::Codedata;
use crate::error::SyncError;
use crate::value::{PropertyValue, ValueType};

/// A single typed, named value owned by a model node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Key, unique within the owning node.
    pub key: String,
    /// Declared value category. `value`, when present, must satisfy it.
    pub value_type: ValueType,
    /// The current value. `None` for a freshly templated property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<PropertyValue>,
    /// Optional semantic type constraint (e.g. `string`, `int|float`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_constraint: Option<String>,
    /// Default value a template starts from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<PropertyValue>,
    /// Placeholder shown by the editing surface while the value is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Short display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Longer display description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional properties may be omitted from rendered source entirely.
    #[serde(default)]
    pub optional: bool,
    /// Whether the editing surface allows changing this property.
    #[serde(default = "default_true")]
    pub editable: bool,
    /// Tucked behind an "advanced" disclosure in the editing surface.
    #[serde(default)]
    pub advanced: bool,
    /// Never rendered into source, but kept on the node for UI round-trips.
    #[serde(default)]
    pub hidden: bool,
    /// `true` once the value diverges from the templated default.
    #[serde(default)]
    pub modified: bool,
    /// Provenance. Required for any property that is echoed back into source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codedata: Option<Codedata>,
}

fn default_true() -> bool {
    true
}

impl Property {
    /// Starts a fluent builder for a property with the given key and type.
    pub fn builder(key: impl Into<String>, value_type: ValueType) -> PropertyBuilder {
        PropertyBuilder::new(key, value_type)
    }

    /// The copy contract: a new property with `new_value`, preserving value
    /// type, constraint, metadata, and provenance.
    ///
    /// Fails with [`SyncError::InvalidState`] when this property has no
    /// provenance (it could never be patched back into source) or when
    /// `new_value` does not satisfy the declared value type.
    pub fn with_value(&self, new_value: PropertyValue) -> Result<Property, SyncError> {
        if self.codedata.is_none() {
            return Err(SyncError::invalid_state(format!(
                "cannot copy property '{}' without provenance",
                self.key
            )));
        }
        if !self.value_type.admits(&new_value) {
            return Err(SyncError::invalid_state(format!(
                "value for property '{}' does not satisfy type {}",
                self.key, self.value_type
            )));
        }
        let modified = self.modified || Some(&new_value) != self.default_value.as_ref();
        Ok(Property {
            value: Some(new_value),
            modified,
            ..self.clone()
        })
    }

    /// Returns `true` if this property contributes tokens to rendered source:
    /// it has a value, is not hidden, and (if optional) has been modified.
    pub fn included_in_source(&self) -> bool {
        if self.hidden || self.value.is_none() {
            return false;
        }
        !self.optional || self.modified
    }
}

/// Fluent, order-independent accumulator for [`Property`] attributes.
#[derive(Debug, Clone)]
pub struct PropertyBuilder {
    key: String,
    value_type: ValueType,
    value: Option<PropertyValue>,
    type_constraint: Option<String>,
    default_value: Option<PropertyValue>,
    placeholder: Option<String>,
    label: Option<String>,
    description: Option<String>,
    optional: bool,
    editable: bool,
    advanced: bool,
    hidden: bool,
    modified: bool,
    codedata: Option<Codedata>,
}

impl PropertyBuilder {
    /// Creates a builder with required key and value type; all other
    /// attributes start at their defaults.
    pub fn new(key: impl Into<String>, value_type: ValueType) -> Self {
        PropertyBuilder {
            key: key.into(),
            value_type,
            value: None,
            type_constraint: None,
            default_value: None,
            placeholder: None,
            label: None,
            description: None,
            optional: false,
            editable: true,
            advanced: false,
            hidden: false,
            modified: false,
            codedata: None,
        }
    }

    /// Sets the current value.
    pub fn value(mut self, value: PropertyValue) -> Self {
        self.value = Some(value);
        self
    }

    /// Sets the semantic type constraint.
    pub fn type_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.type_constraint = Some(constraint.into());
        self
    }

    /// Sets the templated default value.
    pub fn default_value(mut self, value: PropertyValue) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Sets the placeholder shown while the value is unset.
    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }

    /// Sets the display label.
    pub fn label(mut self, text: impl Into<String>) -> Self {
        self.label = Some(text.into());
        self
    }

    /// Sets the display description.
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Marks the property optional in rendered source.
    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Controls whether the editing surface may change the property.
    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    /// Tucks the property behind the "advanced" disclosure.
    pub fn advanced(mut self, advanced: bool) -> Self {
        self.advanced = advanced;
        self
    }

    /// Hides the property from rendered source.
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Marks the value as diverged from the template default.
    pub fn modified(mut self, modified: bool) -> Self {
        self.modified = modified;
        self
    }

    /// Attaches provenance.
    pub fn codedata(mut self, codedata: Codedata) -> Self {
        self.codedata = Some(codedata);
        self
    }

    /// Freezes the accumulated attributes into an immutable [`Property`].
    ///
    /// Fails with [`SyncError::InvalidState`] when the value or the default
    /// value does not satisfy the declared value type.
    pub fn build(self) -> Result<Property, SyncError> {
        if let Some(value) = &self.value {
            if !self.value_type.admits(value) {
                return Err(SyncError::invalid_state(format!(
                    "value for property '{}' does not satisfy type {}",
                    self.key, self.value_type
                )));
            }
        }
        if let Some(default) = &self.default_value {
            if !self.value_type.admits(default) {
                return Err(SyncError::invalid_state(format!(
                    "default for property '{}' does not satisfy type {}",
                    self.key, self.value_type
                )));
            }
        }
        Ok(Property {
            key: self.key,
            value_type: self.value_type,
            value: self.value,
            type_constraint: self.type_constraint,
            default_value: self.default_value,
            placeholder: self.placeholder,
            label: self.label,
            description: self.description,
            optional: self.optional,
            editable: self.editable,
            advanced: self.advanced,
            hidden: self.hidden,
            modified: self.modified,
            codedata: self.codedata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    fn templated(key: &str) -> Property {
        Property::builder(key, ValueType::Text)
            .default_value(PropertyValue::text("default"))
            .codedata(Codedata::templated(NodeKind::Call))
            .build()
            .unwrap()
    }

    #[test]
    fn builder_is_order_independent() {
        let a = Property::builder("path", ValueType::Text)
            .optional(true)
            .label("Path")
            .codedata(Codedata::templated(NodeKind::Call))
            .build()
            .unwrap();
        let b = Property::builder("path", ValueType::Text)
            .codedata(Codedata::templated(NodeKind::Call))
            .label("Path")
            .optional(true)
            .build()
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn build_rejects_type_mismatch() {
        let err = Property::builder("count", ValueType::Numeric)
            .value(PropertyValue::text("three"))
            .build()
            .unwrap_err();
        assert!(matches!(err, SyncError::InvalidState { .. }));
    }

    #[test]
    fn copy_requires_provenance() {
        let orphan = Property::builder("x", ValueType::Text).build().unwrap();
        let err = orphan.with_value(PropertyValue::text("v")).unwrap_err();
        assert!(matches!(err, SyncError::InvalidState { .. }));
    }

    #[test]
    fn copy_preserves_metadata_and_provenance() {
        let template = Property::builder("url", ValueType::Text)
            .type_constraint("string")
            .label("URL")
            .placeholder("https://...")
            .codedata(Codedata::templated(NodeKind::Connection))
            .build()
            .unwrap();

        let copied = template
            .with_value(PropertyValue::text("https://api.example.com"))
            .unwrap();
        assert_eq!(copied.key, template.key);
        assert_eq!(copied.value_type, template.value_type);
        assert_eq!(copied.type_constraint, template.type_constraint);
        assert_eq!(copied.label, template.label);
        assert_eq!(copied.codedata, template.codedata);
        assert_eq!(
            copied.value,
            Some(PropertyValue::text("https://api.example.com"))
        );
        assert!(copied.modified);
    }

    #[test]
    fn copy_to_default_value_is_not_modified() {
        let copied = templated("p")
            .with_value(PropertyValue::text("default"))
            .unwrap();
        assert!(!copied.modified);
    }

    #[test]
    fn copy_to_same_value_differs_only_in_modified() {
        let original = templated("p")
            .with_value(PropertyValue::text("custom"))
            .unwrap();
        let copied = original.with_value(PropertyValue::text("custom")).unwrap();
        assert_eq!(original, copied);
        assert!(copied.modified);
    }

    #[test]
    fn copy_rejects_type_mismatch() {
        let err = templated("p")
            .with_value(PropertyValue::Boolean(true))
            .unwrap_err();
        assert!(matches!(err, SyncError::InvalidState { .. }));
    }

    #[test]
    fn inclusion_honors_flags() {
        let unset = templated("p");
        assert!(!unset.included_in_source());

        let required = templated("p")
            .with_value(PropertyValue::text("v"))
            .unwrap();
        assert!(required.included_in_source());

        let mut hidden = required.clone();
        hidden.hidden = true;
        assert!(!hidden.included_in_source());

        let optional_unmodified = Property::builder("opt", ValueType::Text)
            .optional(true)
            .value(PropertyValue::text("default"))
            .default_value(PropertyValue::text("default"))
            .codedata(Codedata::templated(NodeKind::Call))
            .build()
            .unwrap();
        assert!(!optional_unmodified.included_in_source());

        let optional_modified = optional_unmodified
            .with_value(PropertyValue::text("x"))
            .unwrap();
        assert!(optional_modified.included_in_source());
    }

    #[test]
    fn serde_roundtrip() {
        let prop = templated("p")
            .with_value(PropertyValue::text("v"))
            .unwrap();
        let json = serde_json::to_string(&prop).unwrap();
        let back: Property = serde_json::from_str(&json).unwrap();
        assert_eq!(prop, back);
    }
}
