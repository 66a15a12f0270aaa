//! Kind -> builder dispatch.

use std::collections::HashMap;

use flowsync_core::NodeKind;

use crate::builder::NodeBuilder;
use crate::kinds::agent::AgentBuilder;
use crate::kinds::agent_call::AgentCallBuilder;
use crate::kinds::branch::IfBuilder;
use crate::kinds::call::CallBuilder;
use crate::kinds::connection::ConnectionBuilder;
use crate::kinds::generic::GenericBuilder;

/// Maps construct kinds to their builders.
///
/// Resolution never fails: kinds without a specialized builder fall back to
/// a generic builder for that kind, so unregistered kinds still round-trip
/// through generic property templating.
pub struct Registry {
    builders: HashMap<NodeKind, Box<dyn NodeBuilder>>,
    fallbacks: HashMap<NodeKind, GenericBuilder>,
}

impl Registry {
    /// A registry with no specialized builders; everything resolves to the
    /// generic fallback.
    pub fn empty() -> Self {
        let fallbacks = NodeKind::ALL
            .into_iter()
            .map(|kind| (kind, GenericBuilder::new(kind)))
            .collect();
        Registry {
            builders: HashMap::new(),
            fallbacks,
        }
    }

    /// The default registry: specialized builders for connection, call,
    /// branch, agent, and agent-call constructs.
    pub fn with_defaults() -> Self {
        let mut registry = Registry::empty();
        registry.register(Box::new(ConnectionBuilder));
        registry.register(Box::new(CallBuilder));
        registry.register(Box::new(IfBuilder));
        registry.register(Box::new(AgentBuilder));
        registry.register(Box::new(AgentCallBuilder));
        registry
    }

    /// Registers a builder under its own kind, replacing any previous one.
    pub fn register(&mut self, builder: Box<dyn NodeBuilder>) {
        self.builders.insert(builder.kind(), builder);
    }

    /// Resolves the builder responsible for `kind`.
    pub fn resolve(&self, kind: NodeKind) -> &dyn NodeBuilder {
        match self.builders.get(&kind) {
            Some(builder) => builder.as_ref(),
            None => &self.fallbacks[&kind],
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::with_defaults()
    }
}
