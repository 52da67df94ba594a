//! Transpilation error types.

use brickyard_core::ComponentId;
use brickyard_core::NodeId;
use brickyard_core::model::PortType;
use thiserror::Error;

/// Result type for transpilation.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while lowering a component tree.
///
/// Structural errors describe a malformed tree, resolution errors a port or
/// claim that cannot be bound, expression errors an operand that cannot be
/// rendered. None of them are recoverable.
#[derive(Debug, Error)]
pub enum Error {
    /// The tree failed structural validation.
    #[error(transparent)]
    Model(#[from] brickyard_core::Error),

    /// A node still holds a reference instead of an inline component.
    #[error("node '{node_id}' holds a {found}, expected an inline component")]
    NotDereferenced {
        /// Offending node.
        node_id: NodeId,
        /// Variant found instead.
        found: &'static str,
    },

    /// The implementation has no emission rule.
    #[error("implementation '{kind}' cannot be transpiled")]
    UnsupportedImplementation {
        /// Implementation variant.
        kind: &'static str,
    },

    /// A mapping, edge or argument names an undeclared port.
    #[error("no {direction} port named '{port}'")]
    UnknownPort {
        /// `input` or `output`.
        direction: &'static str,
        /// Missing port name.
        port: String,
    },

    /// An edge names a node that is not part of the enclosing scope.
    #[error("node '{node_id}' is not part of the enclosing scope")]
    UnknownNode {
        /// Missing node.
        node_id: NodeId,
    },

    /// A port type cannot be used as a container argument.
    #[error("{port_type} port '{port}' cannot be rendered as an argument")]
    UnsupportedArgument {
        /// Port bound to the argument.
        port: String,
        /// Its declared type.
        port_type: PortType,
    },

    /// An edge carries a port type that cannot cross node boundaries.
    #[error("edge into port '{port}' of node '{node_id}' carries unsupported type {port_type}")]
    UnsupportedEdge {
        /// Target node.
        node_id: NodeId,
        /// Target port.
        port: String,
        /// Type of the source port.
        port_type: PortType,
    },

    /// An output mapping targets a port type that cannot be exported.
    #[error("{port_type} output '{port}' cannot be exported")]
    UnsupportedOutput {
        /// Output port.
        port: String,
        /// Its declared type.
        port_type: PortType,
    },

    /// A parameter or artifact output has no file result.
    #[error("output '{port}' has no file result")]
    MissingResult {
        /// Output port.
        port: String,
    },

    /// Two parameter arrays fan out the same task.
    #[error("task '{task}' fans out over more than one parameter array")]
    ConflictingFanOut {
        /// Task name.
        task: String,
    },

    /// The branches of a conditional declare different ports.
    #[error("conditional branches '{node_true}' and '{node_false}' declare different {direction} ports")]
    ConditionalMismatch {
        /// The true branch.
        node_true: NodeId,
        /// The false branch.
        node_false: NodeId,
        /// `input` or `output`.
        direction: &'static str,
    },

    /// A conditional mapping is bound to the false branch alone.
    ///
    /// Both branches share the input bindings of the true branch, and every
    /// output needs a value when the true branch runs.
    #[error("conditional {direction} mapping of port '{port}' must go through true branch '{node_true}'")]
    FalseBranchMapping {
        /// The true branch.
        node_true: NodeId,
        /// Port of the conditional named by the mapping.
        port: String,
        /// `input` or `output`.
        direction: &'static str,
    },

    /// A conditional operand refers to a port that cannot be compared.
    #[error("operand '{name}' of type {port_type} cannot be compared")]
    InvalidOperand {
        /// Operand port.
        name: String,
        /// Its declared type.
        port_type: PortType,
    },

    /// A job value targets a port the root component does not declare.
    #[error("job value targets unknown root input '{target}'")]
    UnknownInput {
        /// Target port.
        target: String,
    },

    /// A job value does not fit its target port.
    #[error("invalid value for root input '{target}': {reason}")]
    InvalidValue {
        /// Target port.
        target: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A brick mounts a volume port with no volume in scope.
    #[error("no volume is bound to input '{port}'")]
    UnboundVolume {
        /// Volume port.
        port: String,
    },

    /// A brick declares a secret port with no secret in scope.
    #[error("no secret is bound to input '{port}'")]
    UnboundSecret {
        /// Secret port.
        port: String,
    },

    /// A volume claim reached a port with no incoming mapping or edge.
    #[error("volume claim on port '{port}' of node '{node_id}' cannot be resolved")]
    UnresolvedClaim {
        /// Node where the walk stopped.
        node_id: NodeId,
        /// Port where the walk stopped.
        port: String,
    },

    /// A volume claim walk exceeded the node count of its scope.
    #[error("volume claim on port '{port}' of node '{node_id}' loops after {bound} steps")]
    ClaimCycle {
        /// Node where the walk stopped.
        node_id: NodeId,
        /// Port where the walk stopped.
        port: String,
        /// Step bound.
        bound: usize,
    },

    /// Error raised while transpiling a nested component.
    #[error("in component {id}")]
    Component {
        /// Component being transpiled.
        id: ComponentId,
        /// The nested error.
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Returns the innermost error, skipping component context wrappers.
    pub fn root(&self) -> &Self {
        match self {
            Self::Component { source, .. } => source.root(),
            other => other,
        }
    }

    /// Returns the identifiers of the components enclosing the error,
    /// outermost first.
    pub fn component_path(&self) -> Vec<ComponentId> {
        let mut path = Vec::new();
        let mut current = self;
        while let Self::Component { id, source } = current {
            path.push(*id);
            current = source;
        }
        path
    }
}

/// Adds component context to results.
pub(crate) trait ResultExt<T> {
    /// Wraps an error with the component being transpiled.
    fn in_component(self, id: ComponentId) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn in_component(self, id: ComponentId) -> Result<T> {
        self.map_err(|e| Error::Component {
            id,
            source: Box::new(e.into()),
        })
    }
}
