//! Builder for connection declarations: `let <name> = <module>(<params>);`
//!
//! Connections are dependency nodes -- call sites reference them by name, so
//! extraction populates the dependent sets from the semantic model.

use flowsync_core::{
    Codedata, DependencyNode, EditSet, Location, ModelNode, Node, NodeKind, Property,
    PropertyValue, SyncError, ValueType,
};
use flowsync_workspace::DependentKind;

use crate::builder::{ensure_kind, NodeBuilder};
use crate::context::BuildContext;
use crate::kinds::{
    anchor_of, base_name_from_descriptor, exclusion, field_property, required_rendered,
    templated_param, unique_name,
};
use crate::source::SourceEditBuilder;

/// Keys that identify the construct rather than parameterize it.
fn metadata_keys() -> std::collections::BTreeSet<String> {
    exclusion(&["variable", "module"])
}

pub struct ConnectionBuilder;

impl ConnectionBuilder {
    /// Provenance for a fresh template. Explicit codedata from the request
    /// wins; otherwise, templating while positioned inside an existing
    /// connection adopts that construct's identity, so the render replaces
    /// it in place instead of inserting a second declaration.
    fn template_codedata(&self, ctx: &BuildContext) -> Codedata {
        if let Some(codedata) = &ctx.codedata {
            return codedata.clone();
        }
        if ctx
            .semantics
            .within_construct(&ctx.file, ctx.position, NodeKind::Connection)
        {
            if let Ok(construct) = ctx.semantics.construct_at(&ctx.file, ctx.position) {
                return Codedata::extracted(
                    NodeKind::Connection,
                    construct.name.unwrap_or_default(),
                    construct.span,
                );
            }
        }
        Codedata::templated(NodeKind::Connection)
    }
}

impl NodeBuilder for ConnectionBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::Connection
    }

    fn template(&self, ctx: &BuildContext) -> Result<Node, SyncError> {
        let symbols = ctx.symbols()?;
        let descriptor = ctx.entry.and_then(|e| e.descriptor.clone());
        let base = descriptor
            .as_deref()
            .map(base_name_from_descriptor)
            .unwrap_or_else(|| "connection".to_string());
        let variable = unique_name(&base, &symbols);

        let mut model = ModelNode::new(NodeKind::Connection);
        model.codedata = Some(self.template_codedata(ctx));

        let var_value = PropertyValue::identifier(variable);
        model.insert_property(
            Property::builder("variable", ValueType::Identifier)
                .value(var_value.clone())
                .default_value(var_value)
                .label("Name")
                .codedata(Codedata::templated(NodeKind::Connection))
                .build()?,
        );

        let mut module = Property::builder("module", ValueType::TypeDescriptor)
            .label("Module")
            .editable(false)
            .codedata(Codedata::templated(NodeKind::Connection));
        match descriptor {
            Some(d) => {
                module = module
                    .value(PropertyValue::TypeDescriptor(d.clone()))
                    .default_value(PropertyValue::TypeDescriptor(d));
            }
            None => {
                module = module.placeholder("module type");
            }
        }
        model.insert_property(module.build()?);

        if let Some(entry) = ctx.entry {
            for spec in &entry.params {
                model.insert_property(templated_param(NodeKind::Connection, spec)?);
            }
        }

        Ok(Node::Dependency(DependencyNode::new(model)?))
    }

    fn from_source(&self, ctx: &BuildContext) -> Result<Node, SyncError> {
        let construct = ctx.semantics.construct_at(&ctx.file, ctx.position)?;
        if construct.kind != NodeKind::Connection {
            return Err(SyncError::malformed(
                ctx.file.clone(),
                ctx.position,
                format!("expected a connection, found {}", construct.kind),
            ));
        }
        let variable = construct.field("variable").ok_or_else(|| {
            SyncError::malformed(ctx.file.clone(), ctx.position, "connection has no name")
        })?;
        let module = construct.field("module").ok_or_else(|| {
            SyncError::malformed(ctx.file.clone(), ctx.position, "connection has no module")
        })?;
        let name = variable.text.trim().to_string();

        let mut model = ModelNode::new(NodeKind::Connection);
        model.location = Some(Location::new(ctx.file.clone(), construct.span));
        model.codedata = Some(Codedata::extracted(
            NodeKind::Connection,
            name.clone(),
            construct.span,
        ));

        model.insert_property(
            Property::builder("variable", ValueType::Identifier)
                .value(PropertyValue::identifier(name.clone()))
                .label("Name")
                .codedata(Codedata::extracted(
                    NodeKind::Connection,
                    name.clone(),
                    variable.span,
                ))
                .build()?,
        );
        model.insert_property(
            Property::builder("module", ValueType::TypeDescriptor)
                .value(PropertyValue::TypeDescriptor(module.text.trim().to_string()))
                .editable(false)
                .codedata(Codedata {
                    construct: NodeKind::Connection,
                    original_name: Some("module".to_string()),
                    span: Some(module.span),
                })
                .build()?,
        );
        for (key, field) in &construct.fields {
            if key == "variable" || key == "module" {
                continue;
            }
            let spec = ctx
                .entry
                .and_then(|e| e.params.iter().find(|p| &p.key == key));
            model.insert_property(field_property(ctx, NodeKind::Connection, key, field, spec)?);
        }

        let mut dependency = DependencyNode::new(model)?;
        for dependent in ctx.semantics.dependents_of(&ctx.file, &name) {
            match dependent.kind {
                DependentKind::Function => dependency.add_dependent_function(dependent.name),
                DependentKind::Connection => dependency.add_dependent_connection(dependent.name),
            }
        }
        Ok(Node::Dependency(dependency))
    }

    fn to_source_edits(&self, node: &Node, ctx: &BuildContext) -> Result<EditSet, SyncError> {
        ensure_kind(NodeKind::Connection, node)?;
        let model = node.model();
        let variable = required_rendered(model, "variable")?;
        let module = required_rendered(model, "module")?;

        let (file, anchor) = anchor_of(node, ctx);
        let mut b = SourceEditBuilder::new(&file, anchor);
        b.keyword("let").name(&variable).token(" = ").name(&module);
        b.parameters(model, &metadata_keys());
        b.token(";");
        if anchor.is_point() {
            b.newline();
        }
        Ok(EditSet::single(file, b.build()?))
    }
}
