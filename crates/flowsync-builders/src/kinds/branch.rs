//! Builder for conditional clauses: `if <condition> {\n}`

use flowsync_core::{
    Codedata, EditSet, Location, ModelNode, Node, NodeKind, Property, PropertyValue, SyncError,
    ValueType,
};

use crate::builder::{ensure_kind, NodeBuilder};
use crate::context::BuildContext;
use crate::kinds::{anchor_of, required_rendered};
use crate::source::SourceEditBuilder;

pub struct IfBuilder;

impl NodeBuilder for IfBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::If
    }

    fn template(&self, ctx: &BuildContext) -> Result<Node, SyncError> {
        let mut model = ModelNode::new(NodeKind::If);
        model.codedata = Some(
            ctx.codedata
                .clone()
                .unwrap_or_else(|| Codedata::templated(NodeKind::If)),
        );
        model.insert_property(
            Property::builder("condition", ValueType::Expression)
                .value(PropertyValue::expression("true"))
                .default_value(PropertyValue::expression("true"))
                .label("Condition")
                .codedata(Codedata::templated(NodeKind::If))
                .build()?,
        );
        Ok(Node::Model(model))
    }

    fn from_source(&self, ctx: &BuildContext) -> Result<Node, SyncError> {
        let construct = ctx.semantics.construct_at(&ctx.file, ctx.position)?;
        if construct.kind != NodeKind::If {
            return Err(SyncError::malformed(
                ctx.file.clone(),
                ctx.position,
                format!("expected a branch, found {}", construct.kind),
            ));
        }
        let condition = construct.field("condition").ok_or_else(|| {
            SyncError::malformed(ctx.file.clone(), ctx.position, "branch has no condition")
        })?;

        let mut model = ModelNode::new(NodeKind::If);
        model.location = Some(Location::new(ctx.file.clone(), construct.span));
        model.codedata = Some(Codedata {
            construct: NodeKind::If,
            original_name: None,
            span: Some(construct.span),
        });
        model.insert_property(
            Property::builder("condition", ValueType::Expression)
                .value(PropertyValue::expression(condition.text.trim()))
                .default_value(PropertyValue::expression("true"))
                .modified(condition.text.trim() != "true")
                .label("Condition")
                .codedata(Codedata {
                    construct: NodeKind::If,
                    original_name: Some("condition".to_string()),
                    span: Some(condition.span),
                })
                .build()?,
        );
        Ok(Node::Model(model))
    }

    fn to_source_edits(&self, node: &Node, ctx: &BuildContext) -> Result<EditSet, SyncError> {
        ensure_kind(NodeKind::If, node)?;
        let model = node.model();
        let condition = required_rendered(model, "condition")?;

        let (file, anchor) = anchor_of(node, ctx);
        let mut b = SourceEditBuilder::new(&file, anchor);
        b.keyword("if").name(&condition).token(" {").newline().token("}");
        if anchor.is_point() {
            b.newline();
        }
        Ok(EditSet::single(file, b.build()?))
    }
}
