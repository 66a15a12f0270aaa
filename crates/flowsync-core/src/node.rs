//! Model nodes: the editable units of the synchronized graph.
//!
//! A [`ModelNode`] represents one source construct (a call, a declaration, a
//! clause) as a kind tag plus an insertion-ordered property map. Dependency
//! kinds -- constructs other nodes reference by name -- are wrapped in
//! [`DependencyNode`], which additionally tracks the names of its dependents.
//! [`Node`] is the tagged variant over both.
//!
//! Identity is the generated `uuid`, assigned once: two nodes are equal iff
//! their uuids are equal, independent of any property mutation. The model is
//! ephemeral -- every request reconstructs the subgraph it needs from source,
//! so reference identity would be meaningless across requests.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::codedata::Codedata;
use crate::error::SyncError;
use crate::position::Location;
use crate::property::Property;
use crate::value::PropertyValue;

/// The closed set of construct kinds the engine understands.
///
/// Kinds are data, not types: dispatch to a builder happens through the
/// registry, and kinds without a specialized builder still round-trip through
/// the generic fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// An action invocation on a declared connection.
    Call,
    /// A declared external resource binding (dependency kind).
    Connection,
    /// A conditional clause.
    If,
    /// A declared agent binding (dependency kind).
    Agent,
    /// An agent invocation that may materialize its companion declaration.
    AgentCall,
    /// A return statement. No specialized builder; generic fallback.
    Return,
    /// A bare expression statement. No specialized builder; generic fallback.
    ExpressionStatement,
}

impl NodeKind {
    /// Every kind, in declaration order.
    pub const ALL: [NodeKind; 7] = [
        NodeKind::Call,
        NodeKind::Connection,
        NodeKind::If,
        NodeKind::Agent,
        NodeKind::AgentCall,
        NodeKind::Return,
        NodeKind::ExpressionStatement,
    ];

    /// Stable string identifier for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Call => "call",
            NodeKind::Connection => "connection",
            NodeKind::If => "if",
            NodeKind::Agent => "agent",
            NodeKind::AgentCall => "agentCall",
            NodeKind::Return => "return",
            NodeKind::ExpressionStatement => "expressionStatement",
        }
    }

    /// Returns `true` for kinds other nodes can reference by name.
    pub fn is_dependency(&self) -> bool {
        matches!(self, NodeKind::Connection | NodeKind::Agent)
    }

    /// Default free-form type tag for nodes of this kind.
    pub fn default_type_tag(&self) -> &'static str {
        match self {
            NodeKind::Call => "Action",
            NodeKind::Connection => "Connection",
            NodeKind::If => "Branch",
            NodeKind::Agent => "Agent",
            NodeKind::AgentCall => "Action",
            NodeKind::Return | NodeKind::ExpressionStatement => "Statement",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "call" => Ok(NodeKind::Call),
            "connection" => Ok(NodeKind::Connection),
            "if" => Ok(NodeKind::If),
            "agent" => Ok(NodeKind::Agent),
            "agentCall" => Ok(NodeKind::AgentCall),
            "return" => Ok(NodeKind::Return),
            "expressionStatement" => Ok(NodeKind::ExpressionStatement),
            other => Err(SyncError::UnsupportedKind {
                kind: other.to_string(),
            }),
        }
    }
}

/// One editable unit corresponding to a source construct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelNode {
    /// Construct kind.
    pub kind: NodeKind,
    /// Opaque stable identity, generated once. Sole basis of equality.
    pub uuid: Uuid,
    /// Source location. `None` until the node is materialized in source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Properties, keyed by name. Insertion order is significant for display
    /// and for parameter rendering.
    pub properties: IndexMap<String, Property>,
    /// Ordering hint among sibling nodes.
    #[serde(default)]
    pub sort_key: i32,
    /// Visibility flag for the diagram surface.
    #[serde(default = "default_true")]
    pub enabled_in_diagram: bool,
    /// Free-form tag, defaulted per kind.
    pub type_tag: String,
    /// Node-level provenance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codedata: Option<Codedata>,
}

fn default_true() -> bool {
    true
}

impl ModelNode {
    /// Creates an empty node of the given kind with a fresh uuid.
    pub fn new(kind: NodeKind) -> Self {
        ModelNode {
            kind,
            uuid: Uuid::new_v4(),
            location: None,
            properties: IndexMap::new(),
            sort_key: 0,
            enabled_in_diagram: true,
            type_tag: kind.default_type_tag().to_string(),
            codedata: None,
        }
    }

    /// Inserts a property, keyed by its own key. Replaces any previous entry
    /// under the same key while keeping its position in the order.
    pub fn insert_property(&mut self, property: Property) {
        self.properties.insert(property.key.clone(), property);
    }

    /// Looks up a property by key.
    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties.get(key)
    }

    /// Replaces the property under `key` with a copy holding `value`,
    /// via the property copy contract.
    ///
    /// Fails with [`SyncError::InvalidState`] when no property exists under
    /// `key` or when the copy contract rejects the value.
    pub fn update_value(&mut self, key: &str, value: PropertyValue) -> Result<(), SyncError> {
        let current = self.properties.get(key).ok_or_else(|| {
            SyncError::invalid_state(format!("node has no property '{}'", key))
        })?;
        let updated = current.with_value(value)?;
        self.properties.insert(key.to_string(), updated);
        Ok(())
    }

    /// Returns the rendered value of a property, if set.
    pub fn rendered_value(&self, key: &str) -> Option<String> {
        self.property(key)?.value.as_ref().map(PropertyValue::render)
    }
}

impl PartialEq for ModelNode {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}

impl Eq for ModelNode {}

impl Hash for ModelNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uuid.hash(state);
    }
}

/// A model node that other nodes reference by name.
///
/// Tracks its dependents as two name sets: functions (call sites) and other
/// dependency nodes. The sets are a derived fact about the current source --
/// there is no removal API; stale entries disappear when the node is rebuilt
/// from a fresh source scan. Deletion/rename flows consult the sets before
/// removing the underlying declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyNode {
    /// The underlying model node.
    pub model: ModelNode,
    dependent_functions: BTreeSet<String>,
    dependent_connections: BTreeSet<String>,
}

impl DependencyNode {
    /// Wraps a model node of a dependency kind.
    ///
    /// Fails with [`SyncError::InvalidState`] for non-dependency kinds.
    pub fn new(model: ModelNode) -> Result<Self, SyncError> {
        if !model.kind.is_dependency() {
            return Err(SyncError::invalid_state(format!(
                "kind '{}' is not a dependency kind",
                model.kind
            )));
        }
        Ok(DependencyNode {
            model,
            dependent_functions: BTreeSet::new(),
            dependent_connections: BTreeSet::new(),
        })
    }

    /// Records a function/call-site dependent. Idempotent.
    pub fn add_dependent_function(&mut self, name: impl Into<String>) {
        self.dependent_functions.insert(name.into());
    }

    /// Records a dependent dependency node. Idempotent.
    pub fn add_dependent_connection(&mut self, name: impl Into<String>) {
        self.dependent_connections.insert(name.into());
    }

    /// Names of functions referencing this node.
    pub fn dependent_functions(&self) -> &BTreeSet<String> {
        &self.dependent_functions
    }

    /// Names of dependency nodes referencing this node.
    pub fn dependent_connections(&self) -> &BTreeSet<String> {
        &self.dependent_connections
    }

    /// Returns `true` when nothing references this node.
    pub fn is_unreferenced(&self) -> bool {
        self.dependent_functions.is_empty() && self.dependent_connections.is_empty()
    }
}

impl PartialEq for DependencyNode {
    fn eq(&self, other: &Self) -> bool {
        self.model.uuid == other.model.uuid
    }
}

impl Eq for DependencyNode {}

/// The tagged variant over plain and dependency nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    /// A plain model node.
    Model(ModelNode),
    /// A dependency node with dependent tracking.
    Dependency(DependencyNode),
}

impl Node {
    /// Returns the construct kind.
    pub fn kind(&self) -> NodeKind {
        self.model().kind
    }

    /// Returns the stable identity.
    pub fn uuid(&self) -> Uuid {
        self.model().uuid
    }

    /// Returns the underlying model node.
    pub fn model(&self) -> &ModelNode {
        match self {
            Node::Model(n) => n,
            Node::Dependency(n) => &n.model,
        }
    }

    /// Returns the underlying model node mutably.
    pub fn model_mut(&mut self) -> &mut ModelNode {
        match self {
            Node::Model(n) => n,
            Node::Dependency(n) => &mut n.model,
        }
    }

    /// Returns the property map.
    pub fn properties(&self) -> &IndexMap<String, Property> {
        &self.model().properties
    }

    /// Returns the source location, if materialized.
    pub fn location(&self) -> Option<&Location> {
        self.model().location.as_ref()
    }

    /// Returns the dependency wrapper, when this is a dependency node.
    pub fn as_dependency(&self) -> Option<&DependencyNode> {
        match self {
            Node::Dependency(n) => Some(n),
            Node::Model(_) => None,
        }
    }

    /// Returns the dependency wrapper mutably, when this is a dependency node.
    pub fn as_dependency_mut(&mut self) -> Option<&mut DependencyNode> {
        match self {
            Node::Dependency(n) => Some(n),
            Node::Model(_) => None,
        }
    }
}
