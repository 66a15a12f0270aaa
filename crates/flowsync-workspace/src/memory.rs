//! In-memory implementation of the collaborator traits.
//!
//! [`InMemoryWorkspace`] holds pre-resolved symbols, construct shapes, and
//! dependent records per file, the way a real analyzer would answer them. It
//! is serde-loadable so CLI invocations and integration tests can describe a
//! workspace as a JSON fixture instead of standing up a parser.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use flowsync_core::{Location, NodeKind, Position, Span, SyncError};

use crate::model::{
    Dependent, RawConstruct, SemanticModel, Symbol, WorkspaceResolver,
};

/// Pre-resolved analyzer answers for one file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileFixture {
    /// Symbols visible anywhere in the file.
    #[serde(default)]
    pub symbols: Vec<Symbol>,
    /// Parsed constructs, in source order.
    #[serde(default)]
    pub constructs: Vec<RawConstruct>,
    /// Binding name -> constructs referencing it.
    #[serde(default)]
    pub dependents: BTreeMap<String, Vec<Dependent>>,
}

/// A complete in-memory workspace: one project root, a set of files, and the
/// location where companion declarations are inserted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InMemoryWorkspace {
    root: PathBuf,
    #[serde(default)]
    files: IndexMap<PathBuf, FileFixture>,
    /// Override for where companion declarations go. Defaults to the top of
    /// `<root>/connections.fl`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    declarations: Option<Location>,
}

impl InMemoryWorkspace {
    /// Creates an empty workspace rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        InMemoryWorkspace {
            root: root.into(),
            files: IndexMap::new(),
            declarations: None,
        }
    }

    /// Sets the companion-declaration insertion location.
    pub fn set_declarations(&mut self, location: Location) {
        self.declarations = Some(location);
    }

    /// Registers `file` as part of the workspace, with no symbols or
    /// constructs yet.
    pub fn add_file(&mut self, file: impl Into<PathBuf>) {
        self.files.entry(file.into()).or_default();
    }

    /// Registers a symbol as visible in `file`.
    pub fn add_symbol(&mut self, file: impl Into<PathBuf>, symbol: Symbol) {
        self.files.entry(file.into()).or_default().symbols.push(symbol);
    }

    /// Registers a parsed construct in `file`.
    pub fn add_construct(&mut self, file: impl Into<PathBuf>, construct: RawConstruct) {
        self.files
            .entry(file.into())
            .or_default()
            .constructs
            .push(construct);
    }

    /// Records that `dependent` references the binding `name` in `file`.
    pub fn add_dependent(
        &mut self,
        file: impl Into<PathBuf>,
        name: impl Into<String>,
        dependent: Dependent,
    ) {
        self.files
            .entry(file.into())
            .or_default()
            .dependents
            .entry(name.into())
            .or_default()
            .push(dependent);
    }

    fn fixture(&self, file: &Path) -> Option<&FileFixture> {
        self.files.get(file)
    }

    fn construct_covering(&self, file: &Path, position: Position) -> Option<&RawConstruct> {
        self.fixture(file)?
            .constructs
            .iter()
            .find(|c| c.span.contains(position) || c.span.start == position)
    }
}

impl SemanticModel for InMemoryWorkspace {
    fn symbols_at(&self, file: &Path, position: Position) -> Result<Vec<Symbol>, SyncError> {
        let fixture = self.fixture(file).ok_or_else(|| {
            SyncError::malformed(file, position, "file not in workspace")
        })?;
        Ok(fixture.symbols.clone())
    }

    fn construct_at(&self, file: &Path, position: Position) -> Result<RawConstruct, SyncError> {
        self.construct_covering(file, position).cloned().ok_or_else(|| {
            SyncError::malformed(file, position, "no construct at position")
        })
    }

    fn within_construct(&self, file: &Path, position: Position, kind: NodeKind) -> bool {
        self.construct_covering(file, position)
            .is_some_and(|c| c.kind == kind)
    }

    fn dependents_of(&self, file: &Path, name: &str) -> Vec<Dependent> {
        self.fixture(file)
            .and_then(|f| f.dependents.get(name))
            .cloned()
            .unwrap_or_default()
    }
}

impl WorkspaceResolver for InMemoryWorkspace {
    fn project_root(&self, _file: &Path) -> Result<PathBuf, SyncError> {
        Ok(self.root.clone())
    }

    fn declarations_location(&self, file: &Path) -> Result<Location, SyncError> {
        if let Some(location) = &self.declarations {
            return Ok(location.clone());
        }
        let root = self.project_root(file)?;
        Ok(Location::new(
            root.join("connections.fl"),
            Span::point(Position::new(0, 0)),
        ))
    }
}
