//! The shared builder interface implemented once per node kind.

use flowsync_core::{EditSet, Node, NodeKind, SyncError};

use crate::context::BuildContext;

/// Strategy interface for one construct kind.
///
/// Dispatch happens exactly once per request, in the registry, before any
/// builder runs. A builder handed a node of a kind it does not own fails
/// fast with [`SyncError::UnsupportedKind`] instead of delegating.
pub trait NodeBuilder: Send + Sync {
    /// The construct kind this builder handles.
    fn kind(&self) -> NodeKind;

    /// Builds the kind's canonical default node from live context.
    /// Performs no source mutation.
    fn template(&self, ctx: &BuildContext) -> Result<Node, SyncError>;

    /// Reconstructs a populated node from the construct at the context
    /// position. Fails with [`SyncError::MalformedSource`] when the expected
    /// shape is absent.
    fn from_source(&self, ctx: &BuildContext) -> Result<Node, SyncError>;

    /// Renders a populated node into the multi-file patch set that rewrites
    /// source to match it.
    fn to_source_edits(&self, node: &Node, ctx: &BuildContext) -> Result<EditSet, SyncError>;
}

/// Rejects nodes the builder does not own.
pub fn ensure_kind(owned: NodeKind, node: &Node) -> Result<(), SyncError> {
    if node.kind() != owned {
        return Err(SyncError::UnsupportedKind {
            kind: node.kind().as_str().to_string(),
        });
    }
    Ok(())
}
