//! The source edit builder: a single-use token accumulator.
//!
//! A [`SourceEditBuilder`] is bound to one file and one anchor span; token
//! operations append to an internal buffer, and `build()` freezes the buffer
//! into a [`TextEdit`] replacing the anchor. A point anchor is a pure
//! insertion.
//!
//! Steps push/pop a cursor so a qualifier can be inserted *before* tokens
//! that were already appended -- the `try` prefix on a call is emitted after
//! the call expression itself has been laid down. Child builders target a
//! different file; their results are returned separately and merged by the
//! caller, keeping ordering and precedence an explicit decision.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use flowsync_core::{ModelNode, Span, SyncError, TextEdit};

/// Sequential accumulator for one edit's text.
#[derive(Debug)]
pub struct SourceEditBuilder {
    file: PathBuf,
    anchor: Span,
    text: String,
    steps: Vec<usize>,
}

impl SourceEditBuilder {
    /// Creates a builder bound to `file`, replacing `anchor` (or inserting
    /// at it, when zero-width).
    pub fn new(file: impl Into<PathBuf>, anchor: Span) -> Self {
        SourceEditBuilder {
            file: file.into(),
            anchor,
            text: String::new(),
            steps: Vec::new(),
        }
    }

    /// The file this builder targets.
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Appends a keyword followed by a space.
    pub fn keyword(&mut self, kw: &str) -> &mut Self {
        self.text.push_str(kw);
        self.text.push(' ');
        self
    }

    /// Appends an identifier verbatim.
    pub fn name(&mut self, ident: &str) -> &mut Self {
        self.text.push_str(ident);
        self
    }

    /// Appends arbitrary token text verbatim.
    pub fn token(&mut self, tok: &str) -> &mut Self {
        self.text.push_str(tok);
        self
    }

    /// Appends a single space.
    pub fn space(&mut self) -> &mut Self {
        self.text.push(' ');
        self
    }

    /// Appends a newline.
    pub fn newline(&mut self) -> &mut Self {
        self.text.push('\n');
        self
    }

    /// Opens a step: saves the current cursor so a qualifier can later be
    /// inserted here.
    pub fn begin_step(&mut self) -> &mut Self {
        self.steps.push(self.text.len());
        self
    }

    /// Inserts `tok` plus a space at the innermost open step's cursor.
    ///
    /// Fails with [`SyncError::InvalidState`] when no step is open.
    pub fn qualifier(&mut self, tok: &str) -> Result<&mut Self, SyncError> {
        let at = *self
            .steps
            .last()
            .ok_or_else(|| SyncError::invalid_state("qualifier outside any step"))?;
        self.text.insert_str(at, &format!("{} ", tok));
        Ok(self)
    }

    /// Closes the innermost step.
    ///
    /// Fails with [`SyncError::InvalidState`] when no step is open.
    pub fn end_step(&mut self) -> Result<&mut Self, SyncError> {
        self.steps
            .pop()
            .ok_or_else(|| SyncError::invalid_state("end_step without begin_step"))?;
        Ok(self)
    }

    /// Appends a parenthesized parameter list from the node's properties, in
    /// insertion order, as `key = value` pairs.
    ///
    /// Keys in `exclude` are metadata-only (identity, connection, type
    /// discriminants) and are never rendered. Hidden properties and
    /// unmodified optionals are skipped per the property's own policy.
    pub fn parameters(&mut self, node: &ModelNode, exclude: &BTreeSet<String>) -> &mut Self {
        self.text.push('(');
        let mut first = true;
        for property in node.properties.values() {
            if exclude.contains(&property.key) || !property.included_in_source() {
                continue;
            }
            let value = match &property.value {
                Some(v) => v.render(),
                None => continue,
            };
            if !first {
                self.text.push_str(", ");
            }
            first = false;
            self.text.push_str(&property.key);
            self.text.push_str(" = ");
            self.text.push_str(&value);
        }
        self.text.push(')');
        self
    }

    /// Spawns an independent builder for another file. The child's result is
    /// not auto-merged; the caller decides ordering and precedence.
    pub fn child(&self, file: impl Into<PathBuf>, anchor: Span) -> SourceEditBuilder {
        SourceEditBuilder::new(file, anchor)
    }

    /// Freezes the accumulated text into an edit anchored at the original
    /// span.
    ///
    /// Fails with [`SyncError::InvalidState`] when a step was left open.
    pub fn build(self) -> Result<TextEdit, SyncError> {
        if !self.steps.is_empty() {
            return Err(SyncError::invalid_state(format!(
                "{} step(s) left open",
                self.steps.len()
            )));
        }
        Ok(TextEdit::new(self.anchor, self.text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowsync_core::{
        Codedata, NodeKind, Position, Property, PropertyValue, ValueType,
    };

    fn prop(key: &str, value: PropertyValue) -> Property {
        let value_type = value.value_type();
        Property::builder(key, value_type)
            .value(value)
            .modified(true)
            .codedata(Codedata::templated(NodeKind::Call))
            .build()
            .unwrap()
    }

    fn anchor() -> Span {
        Span::point(Position::new(3, 0))
    }

    #[test]
    fn token_sequence_freezes_into_anchored_edit() {
        let mut b = SourceEditBuilder::new("main.fl", anchor());
        b.keyword("let").name("users").token(" = ").name("fetch").token("()").token(";");
        let edit = b.build().unwrap();
        assert_eq!(edit.new_text, "let users = fetch();");
        assert_eq!(edit.span, anchor());
    }

    #[test]
    fn qualifier_inserts_at_step_cursor() {
        let mut b = SourceEditBuilder::new("main.fl", anchor());
        b.keyword("let").name("users").token(" = ");
        b.begin_step();
        b.name("backend").token(".").name("get").token("()");
        b.qualifier("try").unwrap();
        b.end_step().unwrap();
        b.token(";");
        let edit = b.build().unwrap();
        assert_eq!(edit.new_text, "let users = try backend.get();");
    }

    #[test]
    fn qualifier_outside_step_is_invalid() {
        let mut b = SourceEditBuilder::new("main.fl", anchor());
        b.name("x");
        assert!(matches!(
            b.qualifier("try").unwrap_err(),
            SyncError::InvalidState { .. }
        ));
    }

    #[test]
    fn unbalanced_steps_fail_build() {
        let mut b = SourceEditBuilder::new("main.fl", anchor());
        b.begin_step();
        let err = b.build().unwrap_err();
        assert!(matches!(err, SyncError::InvalidState { .. }));

        let mut b = SourceEditBuilder::new("main.fl", anchor());
        assert!(b.end_step().is_err());
    }

    #[test]
    fn parameters_render_in_insertion_order_with_exclusions() {
        let mut node = ModelNode::new(NodeKind::Call);
        node.insert_property(prop("variable", PropertyValue::identifier("users")));
        node.insert_property(prop("connection", PropertyValue::identifier("backend")));
        node.insert_property(prop("path", PropertyValue::text("/users")));
        node.insert_property(prop("limit", PropertyValue::Numeric(10.0)));

        let exclude: BTreeSet<String> =
            ["variable".to_string(), "connection".to_string()].into();
        let mut b = SourceEditBuilder::new("main.fl", anchor());
        b.parameters(&node, &exclude);
        let edit = b.build().unwrap();
        assert_eq!(edit.new_text, "(path = \"/users\", limit = 10)");
    }

    #[test]
    fn parameters_skip_hidden_and_unmodified_optionals() {
        let mut node = ModelNode::new(NodeKind::Call);
        node.insert_property(prop("path", PropertyValue::text("/users")));
        node.insert_property(
            Property::builder("secret", ValueType::Text)
                .value(PropertyValue::text("s3cr3t"))
                .hidden(true)
                .modified(true)
                .codedata(Codedata::templated(NodeKind::Call))
                .build()
                .unwrap(),
        );
        node.insert_property(
            Property::builder("timeout", ValueType::Numeric)
                .value(PropertyValue::Numeric(30.0))
                .default_value(PropertyValue::Numeric(30.0))
                .optional(true)
                .codedata(Codedata::templated(NodeKind::Call))
                .build()
                .unwrap(),
        );

        let mut b = SourceEditBuilder::new("main.fl", anchor());
        b.parameters(&node, &BTreeSet::new());
        let edit = b.build().unwrap();
        assert_eq!(edit.new_text, "(path = \"/users\")");
    }

    #[test]
    fn empty_parameter_list_renders_bare_parens() {
        let node = ModelNode::new(NodeKind::Call);
        let mut b = SourceEditBuilder::new("main.fl", anchor());
        b.parameters(&node, &BTreeSet::new());
        assert_eq!(b.build().unwrap().new_text, "()");
    }

    proptest::proptest! {
        /// For any combination of present and excluded keys, excluded keys
        /// never render, and every present, non-excluded key renders exactly
        /// once at its insertion position.
        #[test]
        fn exclusion_set_fidelity(
            present in proptest::collection::vec(proptest::prelude::any::<bool>(), 5),
            excluded in proptest::collection::vec(proptest::prelude::any::<bool>(), 5),
        ) {
            const KEYS: [&str; 5] = ["alpha", "beta", "gamma", "delta", "epsilon"];

            let mut node = ModelNode::new(NodeKind::Call);
            for (i, key) in KEYS.iter().enumerate() {
                if present[i] {
                    node.insert_property(prop(key, PropertyValue::text("v")));
                }
            }
            let exclude: BTreeSet<String> = KEYS
                .iter()
                .zip(&excluded)
                .filter(|(_, e)| **e)
                .map(|(k, _)| k.to_string())
                .collect();

            let mut b = SourceEditBuilder::new("main.fl", anchor());
            b.parameters(&node, &exclude);
            let text = b.build().unwrap().new_text;
            let inner = &text[1..text.len() - 1];
            let rendered: Vec<&str> = inner
                .split(", ")
                .filter(|s| !s.is_empty())
                .map(|s| s.split(" = ").next().unwrap())
                .collect();

            for (i, key) in KEYS.iter().enumerate() {
                let expect = present[i] && !excluded[i];
                proptest::prop_assert_eq!(rendered.contains(key), expect, "key '{}'", key);
            }
        }
    }

    #[test]
    fn child_targets_another_file_independently() {
        let b = SourceEditBuilder::new("main.fl", anchor());
        let mut child = b.child("connections.fl", Span::point(Position::new(0, 0)));
        child.keyword("let").name("backend").token(";");
        let edit = child.build().unwrap();
        assert_eq!(edit.new_text, "let backend;");
    }
}
