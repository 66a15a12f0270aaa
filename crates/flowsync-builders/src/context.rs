//! Per-request context threaded through builder invocations.

use std::path::PathBuf;

use flowsync_catalog::CatalogEntry;
use flowsync_core::{Codedata, NodeKind, Position, Span, SyncError};
use flowsync_workspace::{SemanticModel, Symbol, WorkspaceResolver};

use crate::registry::Registry;

/// Everything a builder may consult while templating, extracting, or
/// rendering: the target file and position, optional pre-existing provenance
/// (edit-in-place vs insert-new), the catalog entry parameterizing the
/// template, and handles to the collaborators and the registry (for
/// companion recursion).
///
/// Contexts are cheap to re-derive per request and never outlive one.
pub struct BuildContext<'a> {
    /// Kind the request named. Builders for a single kind ignore this; the
    /// generic fallback templates whatever kind was asked of it.
    pub kind: NodeKind,
    /// Target file of the request.
    pub file: PathBuf,
    /// Insertion or extraction position within `file`.
    pub position: Position,
    /// Provenance of an existing construct, when editing in place.
    pub codedata: Option<Codedata>,
    /// Catalog entry the template request named, if any.
    pub entry: Option<&'a CatalogEntry>,
    /// The language analyzer.
    pub semantics: &'a dyn SemanticModel,
    /// The project layer.
    pub workspace: &'a dyn WorkspaceResolver,
    /// Builder dispatch, for companion-node recursion.
    pub registry: &'a Registry,
}

impl<'a> BuildContext<'a> {
    /// Creates a context with no pre-existing provenance or catalog entry.
    pub fn new(
        kind: NodeKind,
        file: impl Into<PathBuf>,
        position: Position,
        semantics: &'a dyn SemanticModel,
        workspace: &'a dyn WorkspaceResolver,
        registry: &'a Registry,
    ) -> Self {
        BuildContext {
            kind,
            file: file.into(),
            position,
            codedata: None,
            entry: None,
            semantics,
            workspace,
            registry,
        }
    }

    /// Attaches provenance of an existing construct.
    pub fn with_codedata(mut self, codedata: Codedata) -> Self {
        self.codedata = Some(codedata);
        self
    }

    /// Attaches the catalog entry parameterizing the template.
    pub fn with_entry(mut self, entry: &'a CatalogEntry) -> Self {
        self.entry = Some(entry);
        self
    }

    /// Derives a context for a companion invocation of another kind.
    /// Provenance and catalog entry do not carry over; they belong to the
    /// outer request.
    pub fn for_kind(&self, kind: NodeKind) -> BuildContext<'a> {
        BuildContext {
            kind,
            file: self.file.clone(),
            position: self.position,
            codedata: None,
            entry: None,
            semantics: self.semantics,
            workspace: self.workspace,
            registry: self.registry,
        }
    }

    /// The span edits should anchor to: the existing construct's span when
    /// editing in place, otherwise an insertion point at the request
    /// position.
    pub fn anchor_span(&self) -> Span {
        self.codedata
            .as_ref()
            .and_then(|cd| cd.span)
            .unwrap_or_else(|| Span::point(self.position))
    }

    /// Symbols visible at the request position.
    pub fn symbols(&self) -> Result<Vec<Symbol>, SyncError> {
        self.semantics.symbols_at(&self.file, self.position)
    }
}
