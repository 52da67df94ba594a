//! Component model error types.

use thiserror::Error;

use crate::id::{ComponentId, NodeId};
use crate::lookup::ComponentRequest;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for component model operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while validating or dereferencing component trees.
#[derive(Debug, Error)]
pub enum Error {
    /// The component carries the nil identifier.
    #[error("component '{name}' has a nil identifier")]
    NilIdentifier {
        /// Human name of the offending component.
        name: String,
    },

    /// A port name is declared more than once.
    #[error("component {component_id} declares {direction} port '{port}' more than once")]
    DuplicatePort {
        /// Component declaring the port.
        component_id: ComponentId,
        /// `input` or `output`.
        direction: &'static str,
        /// Duplicated port name.
        port: String,
    },

    /// A node identifier is used more than once within a graph.
    #[error("graph {component_id} contains node '{node_id}' more than once")]
    DuplicateNode {
        /// Graph component.
        component_id: ComponentId,
        /// Duplicated node identifier.
        node_id: NodeId,
    },

    /// An edge or mapping names a node that is not part of the graph.
    #[error("graph {component_id} references unknown node '{node_id}'")]
    UnknownNode {
        /// Graph component.
        component_id: ComponentId,
        /// Missing node identifier.
        node_id: NodeId,
    },

    /// The internal edges of a graph contain a cycle.
    #[error("graph {component_id} contains a cycle")]
    CycleDetected {
        /// Graph component.
        component_id: ComponentId,
    },

    /// The component lookup collaborator failed.
    #[error("failed to look up {request} for node '{node_id}'")]
    Lookup {
        /// Node whose reference was being resolved.
        node_id: NodeId,
        /// The request sent to the lookup.
        request: ComponentRequest,
        /// Underlying lookup error.
        #[source]
        source: BoxedError,
    },

    /// A referenced component (transitively) references itself.
    #[error("node '{node_id}' requests {request}, which is already being resolved")]
    ReferenceCycle {
        /// Node whose reference closes the cycle.
        node_id: NodeId,
        /// The repeated request.
        request: ComponentRequest,
    },

    /// A component was not found by the in-memory lookup.
    #[error("{0} not found")]
    NotFound(ComponentRequest),

    /// Error raised while processing a nested node.
    #[error("in node '{node_id}'")]
    Node {
        /// Node being processed when the error occurred.
        node_id: NodeId,
        /// The nested error.
        #[source]
        source: Box<Error>,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Wraps this error with the identifier of the node being processed.
    pub fn in_node(self, node_id: &NodeId) -> Self {
        Self::Node {
            node_id: node_id.clone(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping node context wrappers.
    pub fn root(&self) -> &Self {
        match self {
            Self::Node { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_context_is_unwrapped_by_root() {
        let err = Error::NilIdentifier {
            name: "leaf".into(),
        }
        .in_node(&NodeId::from("inner"))
        .in_node(&NodeId::from("outer"));

        assert_eq!(err.to_string(), "in node 'outer'");
        assert!(matches!(err.root(), Error::NilIdentifier { .. }));
    }
}
