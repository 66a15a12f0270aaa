//! The catalog container and keyword search.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use flowsync_core::{NodeKind, PropertyValue, ValueType};

use crate::entry::{CatalogEntry, ParamSpec};

/// Supplies catalogued entries beyond the statically registered ones
/// (e.g. discoverable connector actions from a package index).
pub trait CatalogSource {
    /// Entries in the source's own stable order.
    fn entries(&self) -> Vec<CatalogEntry>;
}

/// Insertion-ordered collection of catalog entries.
///
/// Search results preserve catalog order among equal-relevance matches, so
/// result ordering is stable across requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Catalog::default()
    }

    /// The built-in entries every engine starts with: an HTTP connection,
    /// its common actions, and the agent constructs.
    pub fn builtin() -> Self {
        let mut catalog = Catalog::new();
        catalog.push(
            CatalogEntry::new(
                "HTTP Client",
                "Connection to an HTTP service",
                "CONNECTION",
                NodeKind::Connection,
            )
            .with_descriptor("http.Client")
            .with_param(
                ParamSpec::required("url", ValueType::Text)
                    .with_placeholder("https://..."),
            )
            .with_param(ParamSpec::optional_with_default(
                "timeout",
                ValueType::Numeric,
                PropertyValue::Numeric(30.0),
            )),
        );
        catalog.push(
            CatalogEntry::new(
                "HTTP GET",
                "Fetch a resource over HTTP",
                "ACTION",
                NodeKind::Call,
            )
            .with_descriptor("get")
            .with_param(ParamSpec::required("path", ValueType::Text).with_placeholder("/")),
        );
        catalog.push(
            CatalogEntry::new(
                "HTTP POST",
                "Send a payload over HTTP",
                "ACTION",
                NodeKind::Call,
            )
            .with_descriptor("post")
            .with_param(ParamSpec::required("path", ValueType::Text).with_placeholder("/"))
            .with_param(ParamSpec::required("payload", ValueType::Expression)),
        );
        catalog.push(
            CatalogEntry::new(
                "Agent",
                "Declared agent binding with a composed prompt",
                "AGENT",
                NodeKind::Agent,
            )
            .with_descriptor("agent"),
        );
        catalog.push(
            CatalogEntry::new(
                "Agent Call",
                "Invoke an agent, materializing it on first use",
                "AGENT",
                NodeKind::AgentCall,
            )
            .with_descriptor("run"),
        );
        catalog
    }

    /// Appends one entry.
    pub fn push(&mut self, entry: CatalogEntry) {
        self.entries.push(entry);
    }

    /// Appends every entry of an external source, preserving its order.
    pub fn add_source(&mut self, source: &dyn CatalogSource) {
        self.entries.extend(source.entries());
    }

    /// All entries in catalog order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Exact-name lookup, used to resolve the entry named by a template
    /// request.
    pub fn find(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Keyword search.
    ///
    /// `category`, when given, must match exactly; `query` is matched
    /// case-insensitively against name and description; `filters`, when
    /// given, must all equal the entry's labels. No match yields an empty
    /// result, never an error.
    pub fn search(
        &self,
        category: Option<&str>,
        query: &str,
        filters: Option<&BTreeMap<String, String>>,
    ) -> Vec<&CatalogEntry> {
        self.entries
            .iter()
            .filter(|entry| category.is_none_or(|c| entry.category == c))
            .filter(|entry| entry.matches(query))
            .filter(|entry| {
                filters.is_none_or(|wanted| {
                    wanted
                        .iter()
                        .all(|(k, v)| entry.labels.get(k) == Some(v))
                })
            })
            .collect()
    }
}
