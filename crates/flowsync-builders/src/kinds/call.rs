//! Builder for action calls: `let <var> = try <connection>.<method>(<params>);`
//!
//! The `try` error-propagation qualifier is emitted through the step
//! mechanism: the call expression is laid down first, then the qualifier is
//! inserted at the step's saved cursor.

use flowsync_core::{
    Codedata, EditSet, Location, ModelNode, Node, NodeKind, Property, PropertyValue, SyncError,
    ValueType,
};
use flowsync_workspace::SymbolKind;

use crate::builder::{ensure_kind, NodeBuilder};
use crate::context::BuildContext;
use crate::kinds::{
    anchor_of, exclusion, field_property, required_rendered, templated_param, unique_name,
};
use crate::source::SourceEditBuilder;

fn metadata_keys() -> std::collections::BTreeSet<String> {
    exclusion(&["variable", "connection", "method"])
}

pub struct CallBuilder;

impl NodeBuilder for CallBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::Call
    }

    fn template(&self, ctx: &BuildContext) -> Result<Node, SyncError> {
        let symbols = ctx.symbols()?;
        let variable = unique_name("result", &symbols);
        let connection = symbols
            .iter()
            .find(|s| s.kind == SymbolKind::Connection)
            .map(|s| s.name.clone());

        let mut model = ModelNode::new(NodeKind::Call);
        model.codedata = Some(
            ctx.codedata
                .clone()
                .unwrap_or_else(|| Codedata::templated(NodeKind::Call)),
        );

        let var_value = PropertyValue::identifier(variable);
        model.insert_property(
            Property::builder("variable", ValueType::Identifier)
                .value(var_value.clone())
                .default_value(var_value)
                .label("Result")
                .codedata(Codedata::templated(NodeKind::Call))
                .build()?,
        );

        let mut conn = Property::builder("connection", ValueType::Identifier)
            .label("Connection")
            .codedata(Codedata::templated(NodeKind::Call));
        match connection {
            Some(name) => {
                conn = conn.value(PropertyValue::identifier(name));
            }
            None => {
                conn = conn.placeholder("select a connection");
            }
        }
        model.insert_property(conn.build()?);

        let mut method = Property::builder("method", ValueType::Identifier)
            .label("Action")
            .editable(false)
            .codedata(Codedata::templated(NodeKind::Call));
        match ctx.entry.and_then(|e| e.descriptor.clone()) {
            Some(action) => {
                method = method
                    .value(PropertyValue::identifier(action.clone()))
                    .default_value(PropertyValue::identifier(action));
            }
            None => {
                method = method.placeholder("action");
            }
        }
        model.insert_property(method.build()?);

        if let Some(entry) = ctx.entry {
            for spec in &entry.params {
                model.insert_property(templated_param(NodeKind::Call, spec)?);
            }
        }

        Ok(Node::Model(model))
    }

    fn from_source(&self, ctx: &BuildContext) -> Result<Node, SyncError> {
        let construct = ctx.semantics.construct_at(&ctx.file, ctx.position)?;
        if construct.kind != NodeKind::Call {
            return Err(SyncError::malformed(
                ctx.file.clone(),
                ctx.position,
                format!("expected a call, found {}", construct.kind),
            ));
        }

        let mut model = ModelNode::new(NodeKind::Call);
        model.location = Some(Location::new(ctx.file.clone(), construct.span));
        model.codedata = Some(Codedata::extracted(
            NodeKind::Call,
            construct.name.clone().unwrap_or_default(),
            construct.span,
        ));

        for key in ["variable", "connection", "method"] {
            let field = construct.field(key).ok_or_else(|| {
                SyncError::malformed(
                    ctx.file.clone(),
                    ctx.position,
                    format!("call has no {}", key),
                )
            })?;
            model.insert_property(
                Property::builder(key, ValueType::Identifier)
                    .value(PropertyValue::identifier(field.text.trim()))
                    .editable(key != "method")
                    .codedata(Codedata {
                        construct: NodeKind::Call,
                        original_name: Some(field.text.trim().to_string()),
                        span: Some(field.span),
                    })
                    .build()?,
            );
        }
        for (key, field) in &construct.fields {
            if key == "variable" || key == "connection" || key == "method" {
                continue;
            }
            let spec = ctx
                .entry
                .and_then(|e| e.params.iter().find(|p| &p.key == key));
            model.insert_property(field_property(ctx, NodeKind::Call, key, field, spec)?);
        }

        Ok(Node::Model(model))
    }

    fn to_source_edits(&self, node: &Node, ctx: &BuildContext) -> Result<EditSet, SyncError> {
        ensure_kind(NodeKind::Call, node)?;
        let model = node.model();
        let variable = required_rendered(model, "variable")?;
        let connection = required_rendered(model, "connection")?;
        let method = required_rendered(model, "method")?;

        let (file, anchor) = anchor_of(node, ctx);
        let mut b = SourceEditBuilder::new(&file, anchor);
        b.keyword("let").name(&variable).token(" = ");
        b.begin_step();
        b.name(&connection).token(".").name(&method);
        b.parameters(model, &metadata_keys());
        b.qualifier("try")?;
        b.end_step()?;
        b.token(";");
        if anchor.is_point() {
            b.newline();
        }
        Ok(EditSet::single(file, b.build()?))
    }
}
