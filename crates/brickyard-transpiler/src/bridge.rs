//! Volume claim resolution across node boundaries.
//!
//! A claim is an input port of a child node that needs a concrete volume.
//! It is answered by an input mapping of the enclosing component, or by
//! following the incoming edge to the producing node and asking that node
//! which of its own inputs backs the output: a brick answers through a
//! volume result, a composite through its output mappings.

use brickyard_core::NodeId;
use brickyard_core::model::{
    Component, Conditional, Edge, Graph, Implementation, InputMapping, Map, Node, NodeRef,
    OutputMapping, PortType, ResultSource,
};

use crate::TRACING_TARGET;
use crate::error::{Error, Result, ResultExt};
use crate::scope::VolumeScope;

/// The nodes and connections of a composite implementation.
#[derive(Debug, Clone)]
pub(crate) struct Wiring<'a> {
    nodes: Vec<&'a Node>,
    edges: &'a [Edge],
    input_mappings: &'a [InputMapping],
    output_mappings: &'a [OutputMapping],
}

impl<'a> Wiring<'a> {
    /// Returns the wiring of a graph.
    pub fn graph(graph: &'a Graph) -> Self {
        Self {
            nodes: graph.nodes.iter().collect(),
            edges: &graph.edges,
            input_mappings: &graph.input_mappings,
            output_mappings: &graph.output_mappings,
        }
    }

    /// Returns the wiring of a map.
    pub fn map(map: &'a Map) -> Self {
        Self {
            nodes: vec![&map.node],
            edges: &[],
            input_mappings: &map.input_mappings,
            output_mappings: &map.output_mappings,
        }
    }

    /// Returns the wiring of a conditional.
    pub fn conditional(cond: &'a Conditional) -> Self {
        Self {
            nodes: cond.branches().collect(),
            edges: &[],
            input_mappings: &cond.input_mappings,
            output_mappings: &cond.output_mappings,
        }
    }

    /// Returns the wiring of a composite implementation.
    pub fn of(implementation: &'a Implementation) -> Option<Self> {
        match implementation {
            Implementation::Graph(graph) => Some(Self::graph(graph)),
            Implementation::Map(map) => Some(Self::map(map)),
            Implementation::Conditional(cond) => Some(Self::conditional(cond)),
            Implementation::Brick(_) | Implementation::Any => None,
        }
    }

    /// Returns the inline component of a node of this scope.
    pub fn component(&self, node_id: &NodeId) -> Result<&'a Component> {
        let node = self
            .nodes
            .iter()
            .find(|n| &n.id == node_id)
            .ok_or_else(|| Error::UnknownNode {
                node_id: node_id.clone(),
            })?;
        inline(node)
    }

    /// Returns the `(outer, inner)` port pairs of the input mappings
    /// targeting `node_id`.
    pub fn bindings<'b>(
        &'b self,
        node_id: &'b NodeId,
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'b {
        self.input_mappings
            .iter()
            .filter(move |m| &m.target.node == node_id)
            .map(|m| (m.source.as_str(), m.target.port.as_str()))
    }

    /// Resolves a claim on `port` of `node_id` to an input port of the
    /// enclosing component.
    ///
    /// The walk follows at most as many edges as there are nodes in scope.
    pub fn trace_input(&self, node_id: &NodeId, port: &str) -> Result<String> {
        let bound = self.nodes.len();
        let mut node_id = node_id.clone();
        let mut port = port.to_owned();

        for _ in 0..=bound {
            if let Some(mapping) = self
                .input_mappings
                .iter()
                .find(|m| m.target.node == node_id && m.target.port == port)
            {
                return Ok(mapping.source.clone());
            }

            let Some(edge) = self
                .edges
                .iter()
                .find(|e| e.target.node == node_id && e.target.port == port)
            else {
                return Err(Error::UnresolvedClaim { node_id, port });
            };

            let source = self.component(&edge.source.node)?;
            let Some(bridged) = bridge_output(source, &edge.source.port).in_component(source.id)?
            else {
                return Err(Error::UnresolvedClaim {
                    node_id: edge.source.node.clone(),
                    port: edge.source.port.clone(),
                });
            };

            tracing::trace!(
                target: TRACING_TARGET,
                from = %node_id,
                to = %edge.source.node,
                port = %bridged,
                "Bridged volume claim"
            );
            node_id = edge.source.node.clone();
            port = bridged;
        }

        Err(Error::ClaimCycle {
            node_id,
            port,
            bound,
        })
    }

    /// Computes the volume scope of a child from the scope of this
    /// component.
    ///
    /// Claims are traced from `claimant`, which differs from the child only
    /// for the false branch of a conditional: it shares the bindings of the
    /// true branch.
    pub fn narrow_volumes(
        &self,
        claimant: &NodeId,
        child: &Component,
        volumes: &VolumeScope,
    ) -> Result<VolumeScope> {
        let mut scope = VolumeScope::new();
        for port in child.inputs.iter().filter(|p| p.kind == PortType::Volume) {
            let outer = self.trace_input(claimant, &port.name)?;
            let volume = volumes
                .get(&outer)
                .ok_or_else(|| Error::UnboundVolume {
                    port: outer.clone(),
                })?;
            scope = scope.with(port.name.clone(), volume.clone());
        }
        Ok(scope)
    }
}

/// Returns the inline component of a node.
pub(crate) fn inline(node: &Node) -> Result<&Component> {
    match &node.node {
        NodeRef::Component(component) => Ok(component),
        other => Err(Error::NotDereferenced {
            node_id: node.id.clone(),
            found: other.variant_name(),
        }),
    }
}

/// Returns the input port of `component` that backs its volume output
/// `port`, if any.
pub(crate) fn bridge_output(component: &Component, port: &str) -> Result<Option<String>> {
    let Some(wiring) = Wiring::of(&component.implementation) else {
        return Ok(match &component.implementation {
            Implementation::Brick(brick) => brick.result(port).and_then(|r| match &r.source {
                ResultSource::Volume { name } => Some(name.clone()),
                ResultSource::File { .. } => None,
            }),
            _ => None,
        });
    };

    let Some(mapping) = wiring.output_mappings.iter().find(|m| m.target == port) else {
        return Ok(None);
    };
    let child = wiring.component(&mapping.source.node)?;
    let Some(inner) = bridge_output(child, &mapping.source.port).in_component(child.id)? else {
        return Ok(None);
    };

    wiring.trace_input(&mapping.source.node, &inner).map(Some)
}

#[cfg(test)]
mod tests {
    use brickyard_core::ComponentId;
    use brickyard_core::model::{Brick, BrickResult, Container, Data, PortRef};

    use super::*;

    fn volume_brick(input: &str, output: &str) -> Component {
        Component::new(
            ComponentId::new(),
            "vol",
            Implementation::Brick(
                Brick::new(Container::new("alpine"))
                    .with_result(BrickResult::volume(output, input)),
            ),
        )
        .with_input(Data::volume(input))
        .with_output(Data::volume(output))
    }

    fn chain() -> Implementation {
        // outer "vol" -> A.in ; A.out -> B.in ; B.out -> C.in
        Implementation::Graph(Graph {
            nodes: vec![
                Node::new("A", volume_brick("in", "out")),
                Node::new("B", volume_brick("in", "out")),
                Node::new("C", volume_brick("in", "out")),
            ],
            edges: vec![
                Edge::new(PortRef::new("A", "out"), PortRef::new("B", "in")),
                Edge::new(PortRef::new("B", "out"), PortRef::new("C", "in")),
            ],
            input_mappings: vec![InputMapping::new("vol", PortRef::new("A", "in"))],
            output_mappings: vec![OutputMapping::new(PortRef::new("C", "out"), "vol-out")],
        })
    }

    #[test]
    fn claim_follows_edges_to_mapping() {
        let implementation = chain();
        let wiring = Wiring::of(&implementation).unwrap();
        assert_eq!(wiring.trace_input(&NodeId::from("C"), "in").unwrap(), "vol");
    }

    #[test]
    fn composite_bridges_through_output_mapping() {
        let graph = Component::new(ComponentId::new(), "graph", chain())
            .with_input(Data::volume("vol"))
            .with_output(Data::volume("vol-out"));
        assert_eq!(bridge_output(&graph, "vol-out").unwrap().as_deref(), Some("vol"));

        let map = Component::new(
            ComponentId::new(),
            "map",
            Implementation::Map(Map {
                node: Node::new("body", graph),
                input_mappings: vec![InputMapping::new("shared", PortRef::new("body", "vol"))],
                output_mappings: vec![OutputMapping::new(PortRef::new("body", "vol-out"), "out")],
            }),
        );
        assert_eq!(bridge_output(&map, "out").unwrap().as_deref(), Some("shared"));
    }

    #[test]
    fn file_result_does_not_bridge() {
        let brick = Component::new(
            ComponentId::new(),
            "file",
            Implementation::Brick(
                Brick::new(Container::new("alpine"))
                    .with_result(BrickResult::file("out", "/tmp/out")),
            ),
        );
        assert!(bridge_output(&brick, "out").unwrap().is_none());
        assert!(bridge_output(&brick, "missing").unwrap().is_none());
    }

    #[test]
    fn dead_end_is_unresolved() {
        let implementation = chain();
        let wiring = Wiring::of(&implementation).unwrap();
        let err = wiring.trace_input(&NodeId::from("B"), "other").unwrap_err();
        assert!(matches!(
            err,
            Error::UnresolvedClaim { node_id, port } if node_id.as_str() == "B" && port == "other"
        ));
    }

    #[test]
    fn cyclic_claim_is_bounded() {
        let implementation = Implementation::Graph(Graph {
            nodes: vec![
                Node::new("A", volume_brick("in", "out")),
                Node::new("B", volume_brick("in", "out")),
            ],
            edges: vec![
                Edge::new(PortRef::new("A", "out"), PortRef::new("B", "in")),
                Edge::new(PortRef::new("B", "out"), PortRef::new("A", "in")),
            ],
            ..Graph::default()
        });
        let wiring = Wiring::of(&implementation).unwrap();
        let err = wiring.trace_input(&NodeId::from("A"), "in").unwrap_err();
        assert!(matches!(err, Error::ClaimCycle { bound: 2, .. }));
    }

    #[test]
    fn reference_node_is_not_inline() {
        let node = Node::new("ref", NodeRef::Reference { id: ComponentId::new() });
        let err = inline(&node).unwrap_err();
        assert!(matches!(
            err,
            Error::NotDereferenced { node_id, found: "reference" } if node_id.as_str() == "ref"
        ));
    }

    #[test]
    fn narrowing_resolves_each_volume_input() {
        let implementation = chain();
        let wiring = Wiring::of(&implementation).unwrap();
        let child = volume_brick("in", "out");
        let volumes = VolumeScope::new().with("vol", "workdir".to_owned());

        let scope = wiring
            .narrow_volumes(&NodeId::from("C"), &child, &volumes)
            .unwrap();
        assert_eq!(scope.get("in").map(String::as_str), Some("workdir"));

        let err = wiring
            .narrow_volumes(&NodeId::from("C"), &child, &VolumeScope::new())
            .unwrap_err();
        assert!(matches!(err, Error::UnboundVolume { port } if port == "vol"));
    }
}
