//! Collaborator contracts at the engine's interface boundary.
//!
//! The synchronization core never parses source itself; an external semantic
//! analyzer supplies symbols, construct shapes, and dependents through the
//! [`SemanticModel`] trait, and project layout questions go through
//! [`WorkspaceResolver`]. [`InMemoryWorkspace`] is a serde-loadable
//! implementation of both, used by tests and the CLI.

pub mod memory;
pub mod model;

pub use memory::{FileFixture, InMemoryWorkspace};
pub use model::{
    Dependent, DependentKind, RawConstruct, RawField, SemanticModel, Symbol, SymbolKind,
    WorkspaceResolver,
};
