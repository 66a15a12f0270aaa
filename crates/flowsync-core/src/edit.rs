//! Text edits and the multi-file edit accumulator.
//!
//! A [`TextEdit`] replaces one span of a file with new text. [`EditSet`] is
//! the atomic patch set a synchronization request returns: an ordered list of
//! edits per file, all expressed in *original* coordinates, to be applied
//! together or not at all.
//!
//! The no-overlap invariant is enforced at insertion time: edits for the same
//! file never intersect within one response. The one sanctioned exception is
//! companion-node recursion, where the outer builder's edits take precedence
//! over the inner node's on overlap ([`EditSet::merge_preferring`]).

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::SyncError;
use crate::position::{Position, Span};

/// A single span replacement in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    /// Replacement range in original coordinates.
    pub span: Span,
    /// Replacement text.
    pub new_text: String,
}

impl TextEdit {
    /// Creates a replacement edit.
    pub fn new(span: Span, new_text: impl Into<String>) -> Self {
        TextEdit {
            span,
            new_text: new_text.into(),
        }
    }

    /// Creates a pure insertion at `at`.
    pub fn insert(at: Position, new_text: impl Into<String>) -> Self {
        TextEdit::new(Span::point(at), new_text)
    }
}

/// Ordered edits for one file. Most responses touch a file once or twice.
pub type FileEdits = SmallVec<[TextEdit; 2]>;

/// The multi-file patch set produced by one synchronization request.
///
/// File order is the order files were first touched; edit order within a
/// file is the order the builder emitted them. Callers apply every list in
/// full or not at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditSet {
    files: IndexMap<PathBuf, FileEdits>,
}

impl EditSet {
    /// Creates an empty edit set.
    pub fn new() -> Self {
        EditSet::default()
    }

    /// Creates an edit set holding a single edit.
    pub fn single(file: impl Into<PathBuf>, edit: TextEdit) -> Self {
        let mut set = EditSet::new();
        let mut edits = FileEdits::new();
        edits.push(edit);
        set.files.insert(file.into(), edits);
        set
    }

    /// Returns `true` when no edits have been accumulated.
    pub fn is_empty(&self) -> bool {
        self.files.values().all(|e| e.is_empty())
    }

    /// Total number of edits across all files.
    pub fn len(&self) -> usize {
        self.files.values().map(|edits| edits.len()).sum()
    }

    /// The per-file edit lists, in first-touched order.
    pub fn files(&self) -> &IndexMap<PathBuf, FileEdits> {
        &self.files
    }

    /// The edits for one file, if any.
    pub fn for_file(&self, file: &Path) -> Option<&FileEdits> {
        self.files.get(file)
    }

    /// Appends an edit to `file`'s list.
    ///
    /// Fails with [`SyncError::ConflictingEdit`] when the edit's span
    /// intersects an edit already recorded for the same file.
    pub fn push(&mut self, file: impl Into<PathBuf>, edit: TextEdit) -> Result<(), SyncError> {
        let file = file.into();
        let edits = self.files.entry(file.clone()).or_default();
        if let Some(existing) = edits.iter().find(|e| e.span.overlaps(&edit.span)) {
            return Err(SyncError::ConflictingEdit {
                file,
                first: existing.span,
                second: edit.span,
            });
        }
        edits.push(edit);
        Ok(())
    }

    /// Merges another edit set into this one, preserving both orders.
    ///
    /// Overlap between the two sets is an implementation error and fails with
    /// [`SyncError::ConflictingEdit`]; it is never silently resolved.
    pub fn merge(&mut self, other: EditSet) -> Result<(), SyncError> {
        for (file, edits) in other.files {
            for edit in edits {
                self.push(file.clone(), edit)?;
            }
        }
        Ok(())
    }

    /// Companion-recursion merge: edits from `winner` replace any edits
    /// already recorded here that they overlap.
    ///
    /// `winner` must itself satisfy the no-overlap invariant (guaranteed when
    /// it was accumulated through [`EditSet::push`]); overlaps between its
    /// edits and this set's are resolved in `winner`'s favor.
    pub fn merge_preferring(&mut self, winner: EditSet) {
        for (file, edits) in winner.files {
            for edit in edits {
                let existing = self.files.entry(file.clone()).or_default();
                existing.retain(|e| !e.span.overlaps(&edit.span));
                existing.push(edit);
            }
        }
    }

    /// Re-checks the no-overlap invariant across the whole set.
    pub fn validate(&self) -> Result<(), SyncError> {
        for (file, edits) in &self.files {
            for (i, a) in edits.iter().enumerate() {
                for b in edits.iter().skip(i + 1) {
                    if a.span.overlaps(&b.span) {
                        return Err(SyncError::ConflictingEdit {
                            file: file.clone(),
                            first: a.span,
                            second: b.span,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sp(sl: u32, sc: u32, el: u32, ec: u32) -> Span {
        Span::new(Position::new(sl, sc), Position::new(el, ec))
    }

    #[test]
    fn push_keeps_emission_order() {
        let mut set = EditSet::new();
        set.push("main.fl", TextEdit::new(sp(5, 0, 5, 10), "b"))
            .unwrap();
        set.push("main.fl", TextEdit::new(sp(1, 0, 1, 10), "a"))
            .unwrap();
        let edits = set.for_file(Path::new("main.fl")).unwrap();
        assert_eq!(edits[0].new_text, "b");
        assert_eq!(edits[1].new_text, "a");
    }

    #[test]
    fn push_rejects_overlap_within_file() {
        let mut set = EditSet::new();
        set.push("main.fl", TextEdit::new(sp(1, 0, 1, 10), "a"))
            .unwrap();
        let err = set
            .push("main.fl", TextEdit::new(sp(1, 5, 1, 15), "b"))
            .unwrap_err();
        assert!(matches!(err, SyncError::ConflictingEdit { .. }));
    }

    #[test]
    fn same_span_in_different_files_is_fine() {
        let mut set = EditSet::new();
        set.push("a.fl", TextEdit::new(sp(1, 0, 1, 10), "x"))
            .unwrap();
        set.push("b.fl", TextEdit::new(sp(1, 0, 1, 10), "y"))
            .unwrap();
        assert_eq!(set.len(), 2);
        set.validate().unwrap();
    }

    #[test]
    fn merge_rejects_cross_set_overlap() {
        let mut outer = EditSet::single("main.fl", TextEdit::new(sp(1, 0, 1, 10), "a"));
        let inner = EditSet::single("main.fl", TextEdit::new(sp(1, 5, 1, 15), "b"));
        let err = outer.merge(inner).unwrap_err();
        assert!(matches!(err, SyncError::ConflictingEdit { .. }));
    }

    #[test]
    fn merge_disjoint_sets() {
        let mut outer = EditSet::single("main.fl", TextEdit::new(sp(1, 0, 1, 10), "a"));
        let mut inner = EditSet::single("main.fl", TextEdit::new(sp(2, 0, 2, 10), "b"));
        inner
            .push("agents.fl", TextEdit::insert(Position::new(0, 0), "c"))
            .unwrap();
        outer.merge(inner).unwrap();
        assert_eq!(outer.len(), 3);
        assert_eq!(outer.files().len(), 2);
        outer.validate().unwrap();
    }

    #[test]
    fn merge_preferring_lets_winner_replace_overlaps() {
        let mut set = EditSet::single("main.fl", TextEdit::new(sp(1, 0, 1, 10), "inner"));
        let winner = EditSet::single("main.fl", TextEdit::new(sp(1, 5, 1, 15), "outer"));
        set.merge_preferring(winner);

        let edits = set.for_file(Path::new("main.fl")).unwrap();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].new_text, "outer");
        set.validate().unwrap();
    }

    #[test]
    fn merge_preferring_keeps_disjoint_edits() {
        let mut set = EditSet::single("main.fl", TextEdit::new(sp(1, 0, 1, 10), "inner"));
        let winner = EditSet::single("main.fl", TextEdit::new(sp(3, 0, 3, 5), "outer"));
        set.merge_preferring(winner);
        assert_eq!(set.len(), 2);
        set.validate().unwrap();
    }

    #[test]
    fn serde_roundtrip() {
        let mut set = EditSet::new();
        set.push("main.fl", TextEdit::new(sp(1, 0, 1, 10), "x"))
            .unwrap();
        set.push("agents.fl", TextEdit::insert(Position::new(0, 0), "y"))
            .unwrap();
        let json = serde_json::to_string(&set).unwrap();
        let back: EditSet = serde_json::from_str(&json).unwrap();
        assert_eq!(set, back);
    }

    proptest! {
        /// Whatever sequence of pushes succeeds, the accumulated set always
        /// satisfies the no-overlap invariant.
        #[test]
        fn pushed_sets_always_validate(
            spans in proptest::collection::vec((0u32..20, 0u32..40, 0u32..8), 0..24)
        ) {
            let mut set = EditSet::new();
            for (line, col, width) in spans {
                let span = Span::new(
                    Position::new(line, col),
                    Position::new(line, col + width),
                );
                // Conflicting pushes are rejected; accepted ones must keep
                // the invariant.
                let _ = set.push("main.fl", TextEdit::new(span, "t"));
            }
            prop_assert!(set.validate().is_ok());
        }

        /// merge_preferring never leaves an overlapping pair behind.
        #[test]
        fn merge_preferring_preserves_invariant(
            base in proptest::collection::vec((0u32..12, 0u32..6), 0..8),
            winner in proptest::collection::vec((0u32..12, 0u32..6), 0..8),
        ) {
            let mut set = EditSet::new();
            for (line, width) in base {
                let span = Span::new(Position::new(line, 0), Position::new(line, width));
                let _ = set.push("main.fl", TextEdit::new(span, "base"));
            }
            let mut win = EditSet::new();
            for (line, width) in winner {
                let span = Span::new(Position::new(line, 0), Position::new(line, width));
                let _ = win.push("main.fl", TextEdit::new(span, "win"));
            }
            set.merge_preferring(win);
            prop_assert!(set.validate().is_ok());
        }
    }
}
