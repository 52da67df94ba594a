//! Control-flow implementations: map and conditional.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use super::graph::{InputMapping, Node, OutputMapping};
use super::port::Data;
use crate::id::NodeId;

/// Repeated execution of a single child over an array-valued input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Map {
    /// The child executed for each item.
    pub node: Node,
    /// Own input ports to child input ports.
    #[serde(default)]
    pub input_mappings: Vec<InputMapping>,
    /// Child output ports to own output ports.
    #[serde(default)]
    pub output_mappings: Vec<OutputMapping>,
}

impl Map {
    /// Creates a map over the given child.
    pub fn new(node: Node) -> Self {
        Self {
            node,
            input_mappings: Vec::new(),
            output_mappings: Vec::new(),
        }
    }
}

/// Comparison operator of a conditional expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(AsRefStr, Display)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum Operator {
    #[serde(rename = "==")]
    #[strum(serialize = "==")]
    Eq,
    #[serde(rename = "!=")]
    #[strum(serialize = "!=")]
    Ne,
    #[serde(rename = "<")]
    #[strum(serialize = "<")]
    Lt,
    #[serde(rename = "<=")]
    #[strum(serialize = "<=")]
    Le,
    #[serde(rename = ">")]
    #[strum(serialize = ">")]
    Gt,
    #[serde(rename = ">=")]
    #[strum(serialize = ">=")]
    Ge,
}

/// One side of a conditional expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum Operand {
    /// A literal string.
    Literal {
        /// The literal value.
        value: String,
    },
    /// An input port of the conditional.
    Data(Data),
}

impl Operand {
    /// Creates a literal operand.
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
        }
    }
}

/// A boolean comparison guarding the branches of a conditional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Expression {
    /// Left operand.
    pub left: Operand,
    /// Comparison operator.
    pub operator: Operator,
    /// Right operand.
    pub right: Operand,
}

impl Expression {
    /// Creates a new expression.
    pub fn new(left: Operand, operator: Operator, right: Operand) -> Self {
        Self {
            left,
            operator,
            right,
        }
    }
}

/// Executes `node_true` when the expression holds and `node_false`, if
/// present, otherwise.
///
/// Both branches must expose identical port sets. Mappings are applied to
/// whichever branch runs, so their child side names a port of either branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Conditional {
    /// Branch executed when the expression holds.
    pub node_true: Node,
    /// Branch executed otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_false: Option<Node>,
    /// Guard expression.
    pub expression: Expression,
    /// Own input ports to branch input ports.
    #[serde(default)]
    pub input_mappings: Vec<InputMapping>,
    /// Branch output ports to own output ports.
    #[serde(default)]
    pub output_mappings: Vec<OutputMapping>,
}

impl Conditional {
    /// Returns whether the given node identifier names one of the branches.
    pub fn is_branch(&self, id: &NodeId) -> bool {
        &self.node_true.id == id || self.node_false.as_ref().is_some_and(|n| &n.id == id)
    }

    /// Returns the branches, true branch first.
    pub fn branches(&self) -> impl Iterator<Item = &Node> {
        std::iter::once(&self.node_true).chain(self.node_false.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::port::PortType;

    #[test]
    fn operator_uses_symbols() {
        assert_eq!(serde_json::to_string(&Operator::Ge).unwrap(), "\">=\"");
        assert_eq!(Operator::Ne.to_string(), "!=");
        let parsed: Operator = serde_json::from_str("\"<\"").unwrap();
        assert_eq!(parsed, Operator::Lt);
    }

    #[test]
    fn data_operand_keeps_port_type() {
        let operand: Operand =
            serde_json::from_str(r#"{ "kind": "data", "name": "count", "type": "parameter" }"#)
                .unwrap();
        assert_eq!(
            operand,
            Operand::Data(Data::new("count", PortType::Parameter))
        );
    }
}
