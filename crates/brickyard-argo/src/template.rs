//! Templates and their input/output declarations.

use serde::{Deserialize, Serialize};

use crate::container::Container;
use crate::dag::DagTemplate;

/// A named parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Literal or interpolated value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Where the value is read from, for outputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_from: Option<ValueFrom>,
}

impl Parameter {
    /// Declares a parameter without a value.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Creates a parameter with a value.
    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            value_from: None,
        }
    }
}

/// Source of an output parameter value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueFrom {
    /// File inside the container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Interpolated reference to another parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
    /// Expression evaluated by the orchestrator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

impl ValueFrom {
    /// Reads the value from a file.
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Reads the value from another parameter.
    pub fn parameter(parameter: impl Into<String>) -> Self {
        Self {
            parameter: Some(parameter.into()),
            ..Self::default()
        }
    }

    /// Computes the value from an expression.
    pub fn expression(expression: impl Into<String>) -> Self {
        Self {
            expression: Some(expression.into()),
            ..Self::default()
        }
    }
}

/// A named artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Artifact name.
    pub name: String,
    /// Location inside the container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Interpolated reference to another artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Expression selecting another artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_expression: Option<String>,
}

impl Artifact {
    /// Declares an artifact without a source.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Creates an artifact at the given path.
    pub fn at_path(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Creates an artifact sourced from another one.
    pub fn from_ref(name: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            from: Some(from.into()),
            ..Self::default()
        }
    }
}

/// Parameters and artifacts passed to a template or a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arguments {
    /// Parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Artifacts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<Artifact>,
}

impl Arguments {
    /// Returns whether no argument is set.
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty() && self.artifacts.is_empty()
    }

    /// Returns the parameter with the given name.
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Returns a mutable reference to the parameter with the given name.
    pub fn parameter_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.parameters.iter_mut().find(|p| p.name == name)
    }

    /// Returns the artifact with the given name.
    pub fn artifact(&self, name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.name == name)
    }

    /// Returns a mutable reference to the artifact with the given name.
    pub fn artifact_mut(&mut self, name: &str) -> Option<&mut Artifact> {
        self.artifacts.iter_mut().find(|a| a.name == name)
    }
}

/// Declared inputs of a template.
pub type Inputs = Arguments;

/// Declared outputs of a template.
pub type Outputs = Arguments;

/// A unit of work: either a container or a DAG of tasks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Template name, referenced by tasks and the entrypoint.
    pub name: String,
    /// Declared inputs.
    #[serde(default, skip_serializing_if = "Arguments::is_empty")]
    pub inputs: Inputs,
    /// Declared outputs.
    #[serde(default, skip_serializing_if = "Arguments::is_empty")]
    pub outputs: Outputs,
    /// Container to run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<Container>,
    /// DAG of tasks to run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dag: Option<DagTemplate>,
}

impl Template {
    /// Creates a container template.
    pub fn container(name: impl Into<String>, inputs: Inputs, outputs: Outputs, container: Container) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
            container: Some(container),
            dag: None,
        }
    }

    /// Creates a DAG template.
    pub fn dag(name: impl Into<String>, inputs: Inputs, outputs: Outputs, dag: DagTemplate) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
            container: None,
            dag: Some(dag),
        }
    }
}
