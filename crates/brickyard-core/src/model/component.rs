//! Components and their implementations.

use std::collections::HashSet;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, IntoStaticStr};

use super::brick::Brick;
use super::control::{Conditional, Map};
use super::graph::{Graph, Node};
use super::port::{Data, find_port};
use crate::error::{Error, Result};
use crate::id::ComponentId;

/// The implementation of a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[derive(AsRefStr, IntoStaticStr)]
#[serde(tag = "type", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum Implementation {
    /// A single container execution.
    Brick(Brick),
    /// A DAG of child nodes.
    Graph(Graph),
    /// Repeated execution of one child.
    Map(Map),
    /// Guarded execution of one of two children.
    Conditional(Conditional),
    /// Placeholder without executable semantics.
    Any,
}

impl Implementation {
    /// Returns the variant name, for diagnostics.
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// Returns the direct children of this implementation.
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Self::Graph(graph) => graph.nodes.iter().collect(),
            Self::Map(map) => vec![&map.node],
            Self::Conditional(cond) => cond.branches().collect(),
            Self::Brick(_) | Self::Any => Vec::new(),
        }
    }
}

/// The unit of computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Component {
    /// Unique identifier, also the emitted template name.
    pub id: ComponentId,
    /// Human-readable name.
    pub name: String,
    /// What the component does.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Last modifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<String>,
    /// Last modification time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
    /// Stored version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    /// Input ports.
    #[serde(default)]
    pub inputs: Vec<Data>,
    /// Output ports.
    #[serde(default)]
    pub outputs: Vec<Data>,
    /// The implementation.
    pub implementation: Implementation,
}

impl Component {
    /// Creates a component with no ports.
    pub fn new(id: ComponentId, name: impl Into<String>, implementation: Implementation) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            modifier: None,
            timestamp: None,
            version: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            implementation,
        }
    }

    /// Adds an input port.
    pub fn with_input(mut self, port: Data) -> Self {
        self.inputs.push(port);
        self
    }

    /// Adds an output port.
    pub fn with_output(mut self, port: Data) -> Self {
        self.outputs.push(port);
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the input port with the given name.
    pub fn input(&self, name: &str) -> Option<&Data> {
        find_port(&self.inputs, name)
    }

    /// Returns the output port with the given name.
    pub fn output(&self, name: &str) -> Option<&Data> {
        find_port(&self.outputs, name)
    }

    /// Returns whether every node of the tree is an inline component.
    pub fn is_dereferenced(&self) -> bool {
        self.implementation
            .children()
            .into_iter()
            .all(|n| n.component().is_some_and(Component::is_dereferenced))
    }

    /// Validates the structural invariants of this component and of every
    /// inline descendant.
    ///
    /// Reference nodes are skipped; they are validated once dereferenced.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_nil() {
            return Err(Error::NilIdentifier {
                name: self.name.clone(),
            });
        }
        check_unique(self.id, "input", &self.inputs)?;
        check_unique(self.id, "output", &self.outputs)?;

        match &self.implementation {
            Implementation::Graph(graph) => graph.validate_structure(self.id)?,
            Implementation::Conditional(cond) => {
                let mapped = cond
                    .input_mappings
                    .iter()
                    .map(|m| &m.target.node)
                    .chain(cond.output_mappings.iter().map(|m| &m.source.node));
                for node_id in mapped {
                    if !cond.is_branch(node_id) {
                        return Err(Error::UnknownNode {
                            component_id: self.id,
                            node_id: node_id.clone(),
                        });
                    }
                }
            }
            Implementation::Map(map) => {
                let mapped = map
                    .input_mappings
                    .iter()
                    .map(|m| &m.target.node)
                    .chain(map.output_mappings.iter().map(|m| &m.source.node));
                for node_id in mapped {
                    if *node_id != map.node.id {
                        return Err(Error::UnknownNode {
                            component_id: self.id,
                            node_id: node_id.clone(),
                        });
                    }
                }
            }
            Implementation::Brick(_) | Implementation::Any => {}
        }

        for node in self.implementation.children() {
            if let Some(child) = node.component() {
                child.validate().map_err(|e| e.in_node(&node.id))?;
            }
        }

        Ok(())
    }
}

fn check_unique(component_id: ComponentId, direction: &'static str, ports: &[Data]) -> Result<()> {
    let mut seen = HashSet::new();
    for port in ports {
        if !seen.insert(port.name.as_str()) {
            return Err(Error::DuplicatePort {
                component_id,
                direction,
                port: port.name.clone(),
            });
        }
    }
    Ok(())
}
