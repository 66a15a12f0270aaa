//! The generic fallback builder.
//!
//! Kinds without a specialized builder still round-trip: the whole construct
//! is modeled as a single `statement` expression property. Extraction wraps
//! the construct's statement text; rendering emits it back verbatim.

use flowsync_core::{
    Codedata, DependencyNode, EditSet, Location, ModelNode, Node, NodeKind, Property,
    PropertyValue, SyncError, ValueType,
};

use crate::builder::{ensure_kind, NodeBuilder};
use crate::context::BuildContext;
use crate::kinds::{anchor_of, required_rendered};
use crate::source::SourceEditBuilder;

/// Fallback builder for one kind. The registry keeps one per kind so
/// resolution never fails.
pub struct GenericBuilder {
    kind: NodeKind,
}

impl GenericBuilder {
    /// Creates the fallback builder for `kind`.
    pub fn new(kind: NodeKind) -> Self {
        GenericBuilder { kind }
    }

    fn wrap(&self, model: ModelNode) -> Result<Node, SyncError> {
        if self.kind.is_dependency() {
            Ok(Node::Dependency(DependencyNode::new(model)?))
        } else {
            Ok(Node::Model(model))
        }
    }
}

impl NodeBuilder for GenericBuilder {
    fn kind(&self) -> NodeKind {
        self.kind
    }

    fn template(&self, ctx: &BuildContext) -> Result<Node, SyncError> {
        let mut model = ModelNode::new(self.kind);
        model.codedata = Some(
            ctx.codedata
                .clone()
                .unwrap_or_else(|| Codedata::templated(self.kind)),
        );
        model.insert_property(
            Property::builder("statement", ValueType::Expression)
                .label("Statement")
                .placeholder("statement")
                .codedata(Codedata::templated(self.kind))
                .build()?,
        );
        self.wrap(model)
    }

    fn from_source(&self, ctx: &BuildContext) -> Result<Node, SyncError> {
        let construct = ctx.semantics.construct_at(&ctx.file, ctx.position)?;
        if construct.kind != self.kind {
            return Err(SyncError::malformed(
                ctx.file.clone(),
                ctx.position,
                format!("expected {}, found {}", self.kind, construct.kind),
            ));
        }
        let statement = construct.field("statement").ok_or_else(|| {
            SyncError::malformed(
                ctx.file.clone(),
                ctx.position,
                "construct has no statement text",
            )
        })?;

        let mut model = ModelNode::new(self.kind);
        model.location = Some(Location::new(ctx.file.clone(), construct.span));
        model.codedata = Some(Codedata {
            construct: self.kind,
            original_name: construct.name.clone(),
            span: Some(construct.span),
        });
        model.insert_property(
            Property::builder("statement", ValueType::Expression)
                .value(PropertyValue::expression(statement.text.trim()))
                .modified(true)
                .label("Statement")
                .codedata(Codedata {
                    construct: self.kind,
                    original_name: Some("statement".to_string()),
                    span: Some(statement.span),
                })
                .build()?,
        );
        self.wrap(model)
    }

    fn to_source_edits(&self, node: &Node, ctx: &BuildContext) -> Result<EditSet, SyncError> {
        ensure_kind(self.kind, node)?;
        let statement = required_rendered(node.model(), "statement")?;

        let (file, anchor) = anchor_of(node, ctx);
        let mut b = SourceEditBuilder::new(&file, anchor);
        b.token(&statement);
        if anchor.is_point() {
            b.newline();
        }
        Ok(EditSet::single(file, b.build()?))
    }
}
