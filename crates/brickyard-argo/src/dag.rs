//! DAG templates and tasks.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::template::Arguments;

/// A DAG of tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DagTemplate {
    /// Tasks, in emission order.
    pub tasks: Vec<DagTask>,
}

impl DagTemplate {
    /// Returns the task with the given name.
    pub fn task(&self, name: &str) -> Option<&DagTask> {
        self.tasks.iter().find(|t| t.name == name)
    }
}

/// A call of a template inside a DAG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(
    name = "DagTaskBuilder",
    pattern = "owned",
    setter(into, strip_option, prefix = "with")
)]
#[serde(rename_all = "camelCase")]
pub struct DagTask {
    /// Task name, unique within the DAG.
    pub name: String,
    /// Name of the called template.
    pub template: String,
    /// Names of the tasks this one waits for.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub dependencies: Vec<String>,
    /// Arguments passed to the template.
    #[serde(default, skip_serializing_if = "Arguments::is_empty")]
    #[builder(default)]
    pub arguments: Arguments,
    /// Guard expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub when: Option<String>,
    /// JSON array to fan out over, bound to `{{item}}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub with_param: Option<String>,
}

impl DagTask {
    /// Creates a task calling the given template.
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            dependencies: Vec::new(),
            arguments: Arguments::default(),
            when: None,
            with_param: None,
        }
    }

    /// Returns a builder for creating a task.
    pub fn builder() -> DagTaskBuilder {
        DagTaskBuilder::default()
    }
}
