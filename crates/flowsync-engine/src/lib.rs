//! The request-facing synchronization engine.
//!
//! [`SyncEngine`] wires the builder registry, the catalog, and the
//! collaborator handles into the four operations a client drives:
//! template fetch, source extraction, edit synthesis, and catalog search.
//! Every operation is a stateless unit of work -- nothing is cached or
//! shared across requests, so engines can serve requests concurrently
//! without internal locking.

pub mod engine;
pub mod requests;

pub use engine::SyncEngine;
pub use requests::NodeRequest;

// Re-exports so embedders depend on one crate.
pub use flowsync_builders::Registry;
pub use flowsync_catalog::{Catalog, CatalogEntry};
pub use flowsync_core::{EditSet, Node, NodeKind, SyncError, TextEdit};
pub use flowsync_workspace::{InMemoryWorkspace, SemanticModel, WorkspaceResolver};
