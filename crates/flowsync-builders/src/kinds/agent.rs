//! Builder for agent declarations: `let <name> = agent(prompt = <expr>);`
//!
//! Agents are dependency nodes, usually materialized as companions of an
//! agent call rather than templated directly.

use flowsync_core::{
    Codedata, DependencyNode, EditSet, Location, ModelNode, Node, NodeKind, Property,
    PropertyValue, SyncError, ValueType,
};
use flowsync_workspace::DependentKind;

use crate::builder::{ensure_kind, NodeBuilder};
use crate::context::BuildContext;
use crate::kinds::{anchor_of, exclusion, required_rendered, unique_name};
use crate::source::SourceEditBuilder;

fn metadata_keys() -> std::collections::BTreeSet<String> {
    exclusion(&["variable"])
}

pub struct AgentBuilder;

impl AgentBuilder {
    /// The hidden, unset model-provider property. Rendering never emits it;
    /// the editing surface keeps it for the day the mapping exists.
    // TODO: populate once the semantic model exposes provider bindings.
    fn model_property() -> Result<Property, SyncError> {
        Property::builder("model", ValueType::TypeDescriptor)
            .hidden(true)
            .label("Model provider")
            .codedata(Codedata::templated(NodeKind::Agent))
            .build()
    }
}

impl NodeBuilder for AgentBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::Agent
    }

    fn template(&self, ctx: &BuildContext) -> Result<Node, SyncError> {
        let symbols = ctx.symbols()?;
        let variable = unique_name("assistant", &symbols);

        let mut model = ModelNode::new(NodeKind::Agent);
        model.codedata = Some(
            ctx.codedata
                .clone()
                .unwrap_or_else(|| Codedata::templated(NodeKind::Agent)),
        );

        let var_value = PropertyValue::identifier(variable);
        model.insert_property(
            Property::builder("variable", ValueType::Identifier)
                .value(var_value.clone())
                .default_value(var_value)
                .label("Name")
                .codedata(Codedata::templated(NodeKind::Agent))
                .build()?,
        );
        model.insert_property(
            Property::builder("prompt", ValueType::Expression)
                .label("System prompt")
                .placeholder("composed from role and instructions")
                .codedata(Codedata::templated(NodeKind::Agent))
                .build()?,
        );
        model.insert_property(Self::model_property()?);

        Ok(Node::Dependency(DependencyNode::new(model)?))
    }

    fn from_source(&self, ctx: &BuildContext) -> Result<Node, SyncError> {
        let construct = ctx.semantics.construct_at(&ctx.file, ctx.position)?;
        if construct.kind != NodeKind::Agent {
            return Err(SyncError::malformed(
                ctx.file.clone(),
                ctx.position,
                format!("expected an agent, found {}", construct.kind),
            ));
        }
        let variable = construct.field("variable").ok_or_else(|| {
            SyncError::malformed(ctx.file.clone(), ctx.position, "agent has no name")
        })?;
        let name = variable.text.trim().to_string();

        let mut model = ModelNode::new(NodeKind::Agent);
        model.location = Some(Location::new(ctx.file.clone(), construct.span));
        model.codedata = Some(Codedata::extracted(
            NodeKind::Agent,
            name.clone(),
            construct.span,
        ));
        model.insert_property(
            Property::builder("variable", ValueType::Identifier)
                .value(PropertyValue::identifier(name.clone()))
                .label("Name")
                .codedata(Codedata::extracted(NodeKind::Agent, name.clone(), variable.span))
                .build()?,
        );
        let mut prompt = Property::builder("prompt", ValueType::Expression)
            .label("System prompt")
            .codedata(Codedata {
                construct: NodeKind::Agent,
                original_name: Some("prompt".to_string()),
                span: construct.field("prompt").map(|f| f.span),
            });
        if let Some(field) = construct.field("prompt") {
            prompt = prompt
                .value(PropertyValue::expression(field.text.trim()))
                .modified(true);
        }
        model.insert_property(prompt.build()?);
        model.insert_property(Self::model_property()?);

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
        ensure_kind(NodeKind::Agent, node)?;
        let model = node.model();
        let variable = required_rendered(model, "variable")?;

        let (file, anchor) = anchor_of(node, ctx);
        let mut b = SourceEditBuilder::new(&file, anchor);
        b.keyword("let").name(&variable).token(" = ").name("agent");
        b.parameters(model, &metadata_keys());
        b.token(";");
        if anchor.is_point() {
            b.newline();
        }
        Ok(EditSet::single(file, b.build()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowsync_core::Position;
    use flowsync_workspace::InMemoryWorkspace;

    use crate::registry::Registry;

    fn ctx_on<'a>(
        ws: &'a InMemoryWorkspace,
        registry: &'a Registry,
    ) -> BuildContext<'a> {
        BuildContext::new(
            NodeKind::Agent,
            "main.fl",
            Position::new(0, 0),
            ws,
            ws,
            registry,
        )
    }

    #[test]
    fn template_leaves_model_provider_hidden_and_unset() {
        let mut ws = InMemoryWorkspace::new("/proj");
        ws.add_file("main.fl");
        let registry = Registry::with_defaults();
        let node = AgentBuilder.template(&ctx_on(&ws, &registry)).unwrap();

        let provider = node.model().property("model").unwrap();
        assert!(provider.hidden);
        assert!(provider.value.is_none());
        assert!(provider.default_value.is_none());
    }

    #[test]
    fn render_never_emits_hidden_provider() {
        let mut ws = InMemoryWorkspace::new("/proj");
        ws.add_file("main.fl");
        let registry = Registry::with_defaults();
        let ctx = ctx_on(&ws, &registry);
        let mut node = AgentBuilder.template(&ctx).unwrap();
        node.model_mut()
            .update_value(
                "prompt",
                PropertyValue::expression("\"travel planner: be terse\""),
            )
            .unwrap();

        let edits = AgentBuilder.to_source_edits(&node, &ctx).unwrap();
        let text = &edits.for_file(std::path::Path::new("main.fl")).unwrap()[0].new_text;
        assert_eq!(
            text,
            "let assistant = agent(prompt = \"travel planner: be terse\");\n"
        );
        assert!(!text.contains("model"));
    }
}
