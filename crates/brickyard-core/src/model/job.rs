//! Workflows and job submissions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::graph::NodeRef;

/// A stored workflow: a root component bound to a workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Workflow {
    /// Workflow identifier.
    pub id: Uuid,
    /// Human-readable name.
    pub name: String,
    /// Workspace the workflow belongs to, used as the target namespace.
    pub workspace: String,
    /// The root component.
    pub component: NodeRef,
}

/// A concrete value bound to a root input port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum ValueData {
    /// A single string.
    String(String),
    /// An array of strings.
    Array(Vec<String>),
}

/// Binds a value to an input port of the root component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Value {
    /// Root input port name.
    pub target: String,
    /// The value.
    pub value: ValueData,
}

impl Value {
    /// Binds a string value.
    pub fn string(target: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            value: ValueData::String(value.into()),
        }
    }

    /// Binds an array value.
    pub fn array<I, S>(target: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            target: target.into(),
            value: ValueData::Array(values.into_iter().map(Into::into).collect()),
        }
    }
}

/// A submission: a workflow plus the values seeding its root inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Job {
    /// The workflow to run.
    pub workflow: Workflow,
    /// Root input values.
    #[serde(default)]
    pub inputs: Vec<Value>,
}
