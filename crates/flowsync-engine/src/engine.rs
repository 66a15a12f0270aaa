//! The [`SyncEngine`] facade.

use std::collections::BTreeMap;

use flowsync_builders::{BuildContext, Registry};
use flowsync_catalog::{Catalog, CatalogEntry};
use flowsync_core::{EditSet, Node, NodeKind, SyncError};
use flowsync_workspace::{SemanticModel, WorkspaceResolver};

use crate::requests::NodeRequest;

/// The synchronization engine: registry + catalog + collaborators.
///
/// Kind dispatch happens here, exactly once per request, before any builder
/// runs. The engine holds no mutable state; it is `Send + Sync` whenever its
/// workspace is, and a single instance may serve concurrent requests.
pub struct SyncEngine<W> {
    registry: Registry,
    catalog: Catalog,
    workspace: W,
}

impl<W> SyncEngine<W>
where
    W: SemanticModel + WorkspaceResolver,
{
    /// Creates an engine with the default registry and built-in catalog.
    pub fn new(workspace: W) -> Self {
        SyncEngine {
            registry: Registry::with_defaults(),
            catalog: Catalog::builtin(),
            workspace,
        }
    }

    /// Replaces the catalog.
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replaces the registry.
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// The catalog serving search and template parameterization.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Builds a kind's default node from live context. No source is read or
    /// mutated.
    pub fn get_template(&self, kind: NodeKind, request: &NodeRequest) -> Result<Node, SyncError> {
        let _span = tracing::info_span!("get_template", kind = %kind).entered();
        let ctx = self.context(kind, request)?;
        self.registry.resolve(kind).template(&ctx)
    }

    /// Reconstructs a populated node from the construct at the request
    /// position.
    pub fn get_from_source(
        &self,
        kind: NodeKind,
        request: &NodeRequest,
    ) -> Result<Node, SyncError> {
        let _span = tracing::info_span!("get_from_source", kind = %kind).entered();
        let ctx = self.context(kind, request)?;
        self.registry.resolve(kind).from_source(&ctx)
    }

    /// Renders a populated node into the multi-file patch set that rewrites
    /// source to match it. Edits are expressed in original coordinates; no
    /// file is touched.
    pub fn to_source_edits(
        &self,
        node: &Node,
        request: &NodeRequest,
    ) -> Result<EditSet, SyncError> {
        let kind = node.kind();
        let _span = tracing::info_span!("to_source_edits", kind = %kind).entered();
        let ctx = self.context(kind, request)?;
        let edits = self.registry.resolve(kind).to_source_edits(node, &ctx)?;
        edits.validate()?;
        tracing::debug!(
            files = edits.files().len(),
            edits = edits.len(),
            "synthesized edits"
        );
        Ok(edits)
    }

    /// Searches the catalog. No match yields an empty result, never an
    /// error.
    pub fn search(
        &self,
        category: Option<&str>,
        query: &str,
        filters: Option<&BTreeMap<String, String>>,
    ) -> Vec<CatalogEntry> {
        let _span = tracing::info_span!("search", query).entered();
        self.catalog
            .search(category, query, filters)
            .into_iter()
            .cloned()
            .collect()
    }

    fn context<'a>(
        &'a self,
        kind: NodeKind,
        request: &NodeRequest,
    ) -> Result<BuildContext<'a>, SyncError> {
        let mut ctx = BuildContext::new(
            kind,
            request.file.clone(),
            request.position(),
            &self.workspace,
            &self.workspace,
            &self.registry,
        );
        if let Some(codedata) = &request.codedata {
            ctx = ctx.with_codedata(codedata.clone());
        }
        if let Some(name) = &request.entry {
            let entry = self.catalog.find(name).ok_or_else(|| {
                SyncError::invalid_state(format!("unknown catalog entry '{}'", name))
            })?;
            ctx = ctx.with_entry(entry);
        }
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowsync_workspace::InMemoryWorkspace;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn engine_is_send_sync_with_send_sync_workspace() {
        assert_send_sync::<SyncEngine<InMemoryWorkspace>>();
    }

    #[test]
    fn unknown_entry_name_fails_loudly() {
        let mut ws = InMemoryWorkspace::new("/proj");
        ws.add_file("main.fl");
        let engine = SyncEngine::new(ws);
        let request = NodeRequest::at("main.fl", 0, 0).with_entry("FTP Client");
        let err = engine
            .get_template(NodeKind::Connection, &request)
            .unwrap_err();
        assert!(matches!(err, SyncError::InvalidState { .. }));
    }

    #[test]
    fn unregistered_kind_templates_through_fallback() {
        let mut ws = InMemoryWorkspace::new("/proj");
        ws.add_file("main.fl");
        let engine = SyncEngine::new(ws);
        let node = engine
            .get_template(NodeKind::Return, &NodeRequest::at("main.fl", 0, 0))
            .unwrap();
        assert_eq!(node.kind(), NodeKind::Return);
        assert!(node.properties().contains_key("statement"));
    }
}
