//! The [`SemanticModel`] and [`WorkspaceResolver`] collaborator traits.
//!
//! These traits mark the boundary to the language's parser/semantic analyzer
//! and the project layer. The core consumes them; it never implements them
//! against real source. Failures to resolve a file or position propagate as
//! [`SyncError::MalformedSource`].

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use flowsync_core::{Location, NodeKind, Position, Span, SyncError};

/// A symbol visible at some position: a variable, binding, or function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Declared or inferred type, when the analyzer knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

impl Symbol {
    /// Creates a symbol without type information.
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        Symbol {
            name: name.into(),
            kind,
            type_name: None,
        }
    }
}

/// Categories of symbols the analyzer reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolKind {
    Variable,
    Connection,
    Agent,
    Function,
}

/// One field of a parsed construct: the literal sub-expression text and the
/// exact span it occupies. Builders map fields to property values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawField {
    pub text: String,
    pub span: Span,
}

impl RawField {
    /// Creates a raw field.
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        RawField {
            text: text.into(),
            span,
        }
    }
}

/// The parsed shape of one construct, as the analyzer reports it.
///
/// Field order follows source order; builders rely on it when reassembling
/// parameter lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawConstruct {
    /// Construct kind as classified by the analyzer.
    pub kind: NodeKind,
    /// Declared name, for named constructs (bindings, declarations).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Full span of the construct.
    pub span: Span,
    /// Sub-expression fields keyed by role (e.g. `variable`, `condition`).
    pub fields: IndexMap<String, RawField>,
}

impl RawConstruct {
    /// Looks up a field by key.
    pub fn field(&self, key: &str) -> Option<&RawField> {
        self.fields.get(key)
    }
}

/// What kind of construct references a dependency node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DependentKind {
    Function,
    Connection,
}

/// One recorded reference to a dependency node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependent {
    pub name: String,
    pub kind: DependentKind,
}

impl Dependent {
    /// Creates a dependent record.
    pub fn new(name: impl Into<String>, kind: DependentKind) -> Self {
        Dependent {
            name: name.into(),
            kind,
        }
    }
}

/// Symbol and construct resolution supplied by the language analyzer.
pub trait SemanticModel {
    /// Symbols visible at the given position.
    fn symbols_at(&self, file: &Path, position: Position) -> Result<Vec<Symbol>, SyncError>;

    /// The parsed construct covering the given position.
    ///
    /// Fails with [`SyncError::MalformedSource`] when no construct is there
    /// or the file is unknown.
    fn construct_at(&self, file: &Path, position: Position) -> Result<RawConstruct, SyncError>;

    /// Whether `position` lies within a construct of the given kind.
    fn within_construct(&self, file: &Path, position: Position, kind: NodeKind) -> bool;

    /// Constructs currently referencing the named binding in this file's
    /// project. Empty when nothing references it.
    fn dependents_of(&self, file: &Path, name: &str) -> Vec<Dependent>;
}

/// Project layout resolution supplied by the workspace layer.
pub trait WorkspaceResolver {
    /// The project root owning `file`.
    fn project_root(&self, file: &Path) -> Result<PathBuf, SyncError>;

    /// Where companion declarations for constructs in `file` belong:
    /// a concrete file plus the insertion point inside it.
    fn declarations_location(&self, file: &Path) -> Result<Location, SyncError>;
}
