//! Builder for agent invocations: `let <var> = try <agent>.run(query = <expr>);`
//!
//! The composite case of the builder protocol. When the referenced agent
//! binding does not exist yet, rendering follows the two-phase companion
//! protocol: build the agent template through the registry, fold this node's
//! `role` and `instructions` into the companion's `prompt` via the property
//! copy contract, render the companion into the project's declarations file,
//! render the call site, and merge with the call site's edits taking
//! precedence. Any overlap outside that precedence rule is a
//! [`SyncError::ConflictingEdit`].

use flowsync_core::{
    Codedata, EditSet, Location, ModelNode, Node, NodeKind, Property, PropertyValue, SyncError,
    ValueType,
};
use flowsync_workspace::SymbolKind;

use crate::builder::{ensure_kind, NodeBuilder};
use crate::context::BuildContext;
use crate::kinds::{anchor_of, exclusion, field_property, raw_text, required_rendered, unique_name};
use crate::source::SourceEditBuilder;

fn metadata_keys() -> std::collections::BTreeSet<String> {
    // role/instructions are also hidden; listing them keeps the exclusion
    // set the single authority on what never renders positionally.
    exclusion(&["variable", "agent", "role", "instructions"])
}

pub struct AgentCallBuilder;

impl AgentCallBuilder {
    /// Builds and renders the companion agent declaration for a call whose
    /// target binding does not exist yet.
    fn materialize_companion(
        &self,
        node: &ModelNode,
        agent_name: &str,
        ctx: &BuildContext,
    ) -> Result<EditSet, SyncError> {
        let companion_ctx = ctx.for_kind(NodeKind::Agent);
        let builder = ctx.registry.resolve(NodeKind::Agent);
        let mut companion = builder.template(&companion_ctx)?;

        {
            let model = companion.model_mut();
            model.update_value("variable", PropertyValue::identifier(agent_name))?;

            let role = raw_text(node, "role");
            let instructions = raw_text(node, "instructions");
            let composed = match (role, instructions) {
                (Some(r), Some(i)) => Some(format!("{}: {}", r, i)),
                (Some(r), None) => Some(r),
                (None, Some(i)) => Some(i),
                (None, None) => None,
            };
            if let Some(text) = composed {
                let quoted = PropertyValue::text(text).render();
                model.update_value("prompt", PropertyValue::expression(quoted))?;
            }
            // The companion belongs next to the other declarations, not at
            // the call site.
            model.location = Some(ctx.workspace.declarations_location(&ctx.file)?);
        }

        builder.to_source_edits(&companion, &companion_ctx)
    }
}

impl NodeBuilder for AgentCallBuilder {
    fn kind(&self) -> NodeKind {
        NodeKind::AgentCall
    }

    fn template(&self, ctx: &BuildContext) -> Result<Node, SyncError> {
        let symbols = ctx.symbols()?;
        let variable = unique_name("reply", &symbols);
        let agent = symbols
            .iter()
            .find(|s| s.kind == SymbolKind::Agent)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| unique_name("assistant", &symbols));

        let mut model = ModelNode::new(NodeKind::AgentCall);
        model.codedata = Some(
            ctx.codedata
                .clone()
                .unwrap_or_else(|| Codedata::templated(NodeKind::AgentCall)),
        );

        let var_value = PropertyValue::identifier(variable);
        model.insert_property(
            Property::builder("variable", ValueType::Identifier)
                .value(var_value.clone())
                .default_value(var_value)
                .label("Result")
                .codedata(Codedata::templated(NodeKind::AgentCall))
                .build()?,
        );
        model.insert_property(
            Property::builder("agent", ValueType::Identifier)
                .value(PropertyValue::identifier(agent))
                .label("Agent")
                .codedata(Codedata::templated(NodeKind::AgentCall))
                .build()?,
        );
        model.insert_property(
            Property::builder("query", ValueType::Expression)
                .label("Query")
                .placeholder("what to ask the agent")
                .codedata(Codedata::templated(NodeKind::AgentCall))
                .build()?,
        );
        model.insert_property(
            Property::builder("role", ValueType::Text)
                .hidden(true)
                .label("Role")
                .codedata(Codedata::templated(NodeKind::AgentCall))
                .build()?,
        );
        model.insert_property(
            Property::builder("instructions", ValueType::Text)
                .hidden(true)
                .label("Instructions")
                .codedata(Codedata::templated(NodeKind::AgentCall))
                .build()?,
        );

        Ok(Node::Model(model))
    }

    fn from_source(&self, ctx: &BuildContext) -> Result<Node, SyncError> {
        let construct = ctx.semantics.construct_at(&ctx.file, ctx.position)?;
        if construct.kind != NodeKind::AgentCall {
            return Err(SyncError::malformed(
                ctx.file.clone(),
                ctx.position,
                format!("expected an agent call, found {}", construct.kind),
            ));
        }

        let mut model = ModelNode::new(NodeKind::AgentCall);
        model.location = Some(Location::new(ctx.file.clone(), construct.span));
        model.codedata = Some(Codedata::extracted(
            NodeKind::AgentCall,
            construct.name.clone().unwrap_or_default(),
            construct.span,
        ));

        for key in ["variable", "agent"] {
            let field = construct.field(key).ok_or_else(|| {
                SyncError::malformed(
                    ctx.file.clone(),
                    ctx.position,
                    format!("agent call has no {}", key),
                )
            })?;
            model.insert_property(
                Property::builder(key, ValueType::Identifier)
                    .value(PropertyValue::identifier(field.text.trim()))
                    .codedata(Codedata {
                        construct: NodeKind::AgentCall,
                        original_name: Some(field.text.trim().to_string()),
                        span: Some(field.span),
                    })
                    .build()?,
            );
        }
        if let Some(field) = construct.field("query") {
            model.insert_property(field_property(ctx, NodeKind::AgentCall, "query", field, None)?);
        }

        Ok(Node::Model(model))
    }

    fn to_source_edits(&self, node: &Node, ctx: &BuildContext) -> Result<EditSet, SyncError> {
        ensure_kind(NodeKind::AgentCall, node)?;
        let model = node.model();
        let variable = required_rendered(model, "variable")?;
        let agent = required_rendered(model, "agent")?;

        let symbols = ctx.symbols()?;
        let agent_exists = symbols
            .iter()
            .any(|s| s.kind == SymbolKind::Agent && s.name == agent);

        let mut edits = if agent_exists {
            EditSet::new()
        } else {
            self.materialize_companion(model, &agent, ctx)?
        };

        let (file, anchor) = anchor_of(node, ctx);
        let mut b = SourceEditBuilder::new(&file, anchor);
        b.keyword("let").name(&variable).token(" = ");
        b.begin_step();
        b.name(&agent).token(".").name("run");
        b.parameters(model, &metadata_keys());
        b.qualifier("try")?;
        b.end_step()?;
        b.token(";");
        if anchor.is_point() {
            b.newline();
        }

        edits.merge_preferring(EditSet::single(file, b.build()?));
        edits.validate()?;
        Ok(edits)
    }
}
