//! Serde request types for engine operations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use flowsync_core::{Codedata, Position};

/// Context for one template / extraction / synthesis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRequest {
    /// Target file.
    pub file: PathBuf,
    /// Zero-based line of the insertion or extraction position.
    pub line: u32,
    /// Zero-based column of the insertion or extraction position.
    pub column: u32,
    /// Provenance of an existing construct when editing in place; absent
    /// when inserting new code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codedata: Option<Codedata>,
    /// Name of the catalog entry parameterizing a template request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
}

impl NodeRequest {
    /// A request at the given file position, with no provenance or entry.
    pub fn at(file: impl Into<PathBuf>, line: u32, column: u32) -> Self {
        NodeRequest {
            file: file.into(),
            line,
            column,
            codedata: None,
            entry: None,
        }
    }

    /// Names the catalog entry the template should start from.
    pub fn with_entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = Some(entry.into());
        self
    }

    /// Attaches provenance for edit-in-place requests.
    pub fn with_codedata(mut self, codedata: Codedata) -> Self {
        self.codedata = Some(codedata);
        self
    }

    /// The request position.
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}
