//! Source coordinates: positions, spans, and file locations.
//!
//! All coordinates are zero-based. Edits are expressed against the *original*
//! text of a file, so positions never cascade: every span in one response is
//! resolved before any edit is applied.
//!
//! [`Span::overlaps`] is the single source of truth for edit-conflict
//! detection. Zero-width spans are insertion points.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A zero-based line/column coordinate in a source file.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    /// Creates a position from zero-based line and column.
    pub fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A half-open range `[start, end)` of source text.
///
/// A span with `start == end` is a pure insertion point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    /// Creates a span from start and end positions.
    pub fn new(start: Position, end: Position) -> Self {
        Span { start, end }
    }

    /// Creates a zero-width span (insertion point) at `at`.
    pub fn point(at: Position) -> Self {
        Span { start: at, end: at }
    }

    /// Returns `true` if this span is a zero-width insertion point.
    pub fn is_point(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if `pos` lies within `[start, end)`.
    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos < self.end
    }

    /// Returns `true` if two spans intersect.
    ///
    /// Ranges intersect when they share at least one position. Two insertion
    /// points conflict only when they target the same position (their
    /// application order would be ambiguous); an insertion point at the
    /// boundary of a range does not conflict with it.
    pub fn overlaps(&self, other: &Span) -> bool {
        if self.is_point() && other.is_point() {
            return self.start == other.start;
        }
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A span within a concrete file.
///
/// Model nodes that have not yet been materialized in source carry no
/// location at all (`Option<Location>` on the node).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file: PathBuf,
    pub span: Span,
}

impl Location {
    /// Creates a location from a file path and span.
    pub fn new(file: impl Into<PathBuf>, span: Span) -> Self {
        Location {
            file: file.into(),
            span,
        }
    }
}
