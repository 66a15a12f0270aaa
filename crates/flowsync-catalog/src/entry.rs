//! Catalogued entries and their parameter specs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use flowsync_core::{NodeKind, PropertyValue, ValueType};

/// Template spec for one parameter of a catalogued construct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Property key the parameter templates into.
    pub key: String,
    pub value_type: ValueType,
    /// Value a freshly templated property starts with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<PropertyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ParamSpec {
    /// A required parameter with no default.
    pub fn required(key: impl Into<String>, value_type: ValueType) -> Self {
        ParamSpec {
            key: key.into(),
            value_type,
            default: None,
            placeholder: None,
            optional: false,
            description: None,
        }
    }

    /// An optional parameter starting from `default`.
    pub fn optional_with_default(
        key: impl Into<String>,
        value_type: ValueType,
        default: PropertyValue,
    ) -> Self {
        ParamSpec {
            key: key.into(),
            value_type,
            default: Some(default),
            placeholder: None,
            optional: true,
            description: None,
        }
    }

    /// Sets the placeholder text.
    pub fn with_placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }
}

/// One discoverable construct in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Display name, matched by search.
    pub name: String,
    /// Description, matched by search.
    pub description: String,
    /// Category tag (e.g. `CONNECTION`, `DATA_LOADER`).
    pub category: String,
    /// Node kind a template request for this entry produces.
    pub kind: NodeKind,
    /// The descriptor the entry materializes: a connection's module type
    /// (`http.Client`) or a call's action name (`get`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<String>,
    /// Parameter specs for the entry's template.
    #[serde(default)]
    pub params: Vec<ParamSpec>,
    /// Free-form labels matched by search filters.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl CatalogEntry {
    /// Creates an entry with no descriptor, params, or labels.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        kind: NodeKind,
    ) -> Self {
        CatalogEntry {
            name: name.into(),
            description: description.into(),
            category: category.into(),
            kind,
            descriptor: None,
            params: Vec::new(),
            labels: BTreeMap::new(),
        }
    }

    /// Sets the descriptor.
    pub fn with_descriptor(mut self, descriptor: impl Into<String>) -> Self {
        self.descriptor = Some(descriptor.into());
        self
    }

    /// Appends a parameter spec.
    pub fn with_param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Adds a search label.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Case-insensitive keyword match over name and description. An empty
    /// query matches everything.
    pub fn matches(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
    }
}
