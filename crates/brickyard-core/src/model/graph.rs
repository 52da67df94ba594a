//! Graph implementation: a DAG of child nodes.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use super::Component;
use crate::error::{Error, Result};
use crate::id::{ComponentId, NodeId};
use crate::lookup::ComponentRequest;

/// A port of a specific child node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct PortRef {
    /// Child node identifier.
    pub node: NodeId,
    /// Port name on the child's component.
    pub port: String,
}

impl PortRef {
    /// Creates a new port reference.
    pub fn new(node: impl Into<NodeId>, port: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            port: port.into(),
        }
    }
}

/// A directed connection from an output port of one child to an input port
/// of a sibling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Edge {
    /// Output port of the producing node.
    pub source: PortRef,
    /// Input port of the consuming node.
    pub target: PortRef,
}

impl Edge {
    /// Creates a new edge.
    pub fn new(source: PortRef, target: PortRef) -> Self {
        Self { source, target }
    }
}

/// Connects an input port of the enclosing component to a child input port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct InputMapping {
    /// Input port of the enclosing component.
    pub source: String,
    /// Child input port receiving the value.
    pub target: PortRef,
}

impl InputMapping {
    /// Creates a new input mapping.
    pub fn new(source: impl Into<String>, target: PortRef) -> Self {
        Self {
            source: source.into(),
            target,
        }
    }
}

/// Connects a child output port to an output port of the enclosing component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct OutputMapping {
    /// Child output port producing the value.
    pub source: PortRef,
    /// Output port of the enclosing component.
    pub target: String,
}

impl OutputMapping {
    /// Creates a new output mapping.
    pub fn new(source: PortRef, target: impl Into<String>) -> Self {
        Self {
            source,
            target: target.into(),
        }
    }
}

/// Reference to the component a node executes.
///
/// Only [`NodeRef::Component`] can be transpiled; the reference variants must
/// be resolved by the dereferencer first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum NodeRef {
    /// An inline component.
    Component(Box<Component>),
    /// The latest version of a stored component.
    Reference {
        /// Referenced component.
        id: ComponentId,
    },
    /// An explicit version of a stored component.
    ReferenceVersion {
        /// Referenced component.
        id: ComponentId,
        /// Requested version.
        version: u64,
    },
}

impl NodeRef {
    /// Returns the inline component, if dereferenced.
    pub fn as_component(&self) -> Option<&Component> {
        match self {
            Self::Component(component) => Some(component),
            Self::Reference { .. } | Self::ReferenceVersion { .. } => None,
        }
    }

    /// Returns the lookup request for reference variants.
    pub fn request(&self) -> Option<ComponentRequest> {
        match self {
            Self::Component(_) => None,
            Self::Reference { id } => Some(ComponentRequest::Latest(*id)),
            Self::ReferenceVersion { id, version } => {
                Some(ComponentRequest::Version(*id, *version))
            }
        }
    }

    /// Returns the name of the variant, for diagnostics.
    pub const fn variant_name(&self) -> &'static str {
        match self {
            Self::Component(_) => "component",
            Self::Reference { .. } => "reference",
            Self::ReferenceVersion { .. } => "reference_version",
        }
    }
}

impl From<Component> for NodeRef {
    fn from(component: Component) -> Self {
        Self::Component(Box::new(component))
    }
}

/// A child of a graph, map or conditional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Node {
    /// Node identifier, unique within the enclosing graph.
    pub id: NodeId,
    /// The component executed by this node.
    pub node: NodeRef,
}

impl Node {
    /// Creates a node wrapping the given reference.
    pub fn new(id: impl Into<NodeId>, node: impl Into<NodeRef>) -> Self {
        Self {
            id: id.into(),
            node: node.into(),
        }
    }

    /// Returns the inline component, if dereferenced.
    pub fn component(&self) -> Option<&Component> {
        self.node.as_component()
    }
}

/// A DAG of child nodes wired by edges and scope-crossing mappings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Graph {
    /// Child nodes.
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Sibling-to-sibling connections.
    #[serde(default)]
    pub edges: Vec<Edge>,
    /// Own input ports to child input ports.
    #[serde(default)]
    pub input_mappings: Vec<InputMapping>,
    /// Child output ports to own output ports.
    #[serde(default)]
    pub output_mappings: Vec<OutputMapping>,
}

impl Graph {
    /// Returns the child node with the given identifier.
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Returns the edges whose target is the given node.
    pub fn incoming<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| &e.target.node == id)
    }

    /// Returns the distinct source nodes of edges targeting the given node,
    /// in order of first appearance.
    pub fn dependencies(&self, id: &NodeId) -> Vec<NodeId> {
        let mut deps: Vec<NodeId> = Vec::new();
        for edge in self.incoming(id) {
            if !deps.contains(&edge.source.node) {
                deps.push(edge.source.node.clone());
            }
        }
        deps
    }

    /// Checks that node identifiers are unique, that every edge and mapping
    /// names a child node and that the edges form a DAG.
    pub fn validate_structure(&self, component_id: ComponentId) -> Result<()> {
        let mut graph = DiGraph::<&NodeId, ()>::new();
        let mut indices: HashMap<&NodeId, NodeIndex> = HashMap::new();

        for node in &self.nodes {
            if indices.contains_key(&node.id) {
                return Err(Error::DuplicateNode {
                    component_id,
                    node_id: node.id.clone(),
                });
            }
            indices.insert(&node.id, graph.add_node(&node.id));
        }

        let unknown = |node_id: &NodeId| Error::UnknownNode {
            component_id,
            node_id: node_id.clone(),
        };

        for edge in &self.edges {
            let from = indices
                .get(&edge.source.node)
                .ok_or_else(|| unknown(&edge.source.node))?;
            let to = indices
                .get(&edge.target.node)
                .ok_or_else(|| unknown(&edge.target.node))?;
            graph.add_edge(*from, *to, ());
        }

        for mapping in &self.input_mappings {
            if !indices.contains_key(&mapping.target.node) {
                return Err(unknown(&mapping.target.node));
            }
        }
        for mapping in &self.output_mappings {
            if !indices.contains_key(&mapping.source.node) {
                return Err(unknown(&mapping.source.node));
            }
        }

        if petgraph::algo::is_cyclic_directed(&graph) {
            return Err(Error::CycleDetected { component_id });
        }

        Ok(())
    }
}
