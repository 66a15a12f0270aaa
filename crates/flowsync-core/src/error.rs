//! The shared error taxonomy for synchronization requests.
//!
//! Uses `thiserror` for structured, matchable variants. Every error is local
//! to a single request; the engine never retries internally and never
//! produces partial external state (edits are descriptions, not mutations).

use std::path::PathBuf;

use thiserror::Error;

use crate::position::{Position, Span};

/// Errors produced while templating, extracting, or rendering model nodes.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The requested node kind has no template and no generic fallback path
    /// applies, or a builder was handed a node of a kind it does not own.
    #[error("unsupported node kind: '{kind}'")]
    UnsupportedKind { kind: String },

    /// The expected construct is absent or ill-shaped at the given location.
    /// The caller typically re-requests after the user fixes the source.
    #[error("malformed source at {file}:{position}: {reason}", file = file.display())]
    MalformedSource {
        file: PathBuf,
        position: Position,
        reason: String,
    },

    /// An internal precondition was violated (property copy without
    /// provenance, type-mismatched value, missing companion node). A
    /// programming/contract error, not user-recoverable.
    #[error("invalid state: {reason}")]
    InvalidState { reason: String },

    /// Two edits computed within one request overlap in range on the same
    /// file. Fatal for the request.
    #[error("conflicting edits in {file}: {first} overlaps {second}", file = file.display())]
    ConflictingEdit {
        file: PathBuf,
        first: Span,
        second: Span,
    },
}

impl SyncError {
    /// Shorthand for an [`SyncError::InvalidState`] with a formatted reason.
    pub fn invalid_state(reason: impl Into<String>) -> Self {
        SyncError::InvalidState {
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`SyncError::MalformedSource`] at a file/position.
    pub fn malformed(
        file: impl Into<PathBuf>,
        position: Position,
        reason: impl Into<String>,
    ) -> Self {
        SyncError::MalformedSource {
            file: file.into(),
            position,
            reason: reason.into(),
        }
    }
}
