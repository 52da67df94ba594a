//! The `Workflow` envelope.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET;
use crate::container::Volume;
use crate::template::{Arguments, Template};

/// API version of the emitted resource.
pub const API_VERSION: &str = "argoproj.io/v1alpha1";

/// Kind of the emitted resource.
pub const KIND: &str = "Workflow";

/// Longest prefix accepted for `generateName`; Argo appends a random suffix.
const GENERATE_NAME_MAX: usize = 58;

/// An Argo `Workflow` resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    /// Always [`API_VERSION`].
    pub api_version: String,
    /// Always [`KIND`].
    pub kind: String,
    /// Resource metadata.
    pub metadata: ObjectMeta,
    /// Workflow specification.
    pub spec: WorkflowSpec,
}

impl Workflow {
    /// Wraps a specification with metadata.
    pub fn new(metadata: ObjectMeta, spec: WorkflowSpec) -> Self {
        Self {
            api_version: API_VERSION.to_owned(),
            kind: KIND.to_owned(),
            metadata,
            spec,
        }
    }

    /// Returns the template with the given name.
    pub fn template(&self, name: &str) -> Option<&Template> {
        self.spec.templates.iter().find(|t| t.name == name)
    }

    /// Returns the entrypoint template.
    pub fn entrypoint(&self) -> Option<&Template> {
        self.template(&self.spec.entrypoint)
    }
}

/// Kubernetes object metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// Fixed name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Name prefix completed by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_name: Option<String>,
    /// Target namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Labels.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Annotations.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

/// Workflow specification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSpec {
    /// Name of the template run first.
    pub entrypoint: String,
    /// Workflow-level arguments.
    #[serde(default, skip_serializing_if = "Arguments::is_empty")]
    pub arguments: Arguments,
    /// All templates.
    pub templates: Vec<Template>,
    /// Workflow-level volumes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,
    /// Service account the pods run as.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,
}

/// Assembles a [`Workflow`] from transpiled parts.
///
/// Templates are de-duplicated by name when the workflow is built.
#[derive(Debug, Clone, Default)]
pub struct WorkflowBuilder {
    metadata: ObjectMeta,
    spec: WorkflowSpec,
}

impl WorkflowBuilder {
    /// Starts a workflow running the given entrypoint template.
    pub fn new(entrypoint: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta::default(),
            spec: WorkflowSpec {
                entrypoint: entrypoint.into(),
                ..WorkflowSpec::default()
            },
        }
    }

    /// Sets the target namespace.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.metadata.namespace = Some(namespace.into());
        self
    }

    /// Derives `generateName` from a human-readable name.
    pub fn generate_name(mut self, name: &str) -> Self {
        self.metadata.generate_name = Some(format!("{}-", dns_label(name, GENERATE_NAME_MAX)));
        self
    }

    /// Adds a label.
    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.labels.insert(key.into(), value.into());
        self
    }

    /// Adds labels.
    pub fn labels<I, K, V>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.metadata
            .labels
            .extend(labels.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Adds an annotation.
    pub fn annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.annotations.insert(key.into(), value.into());
        self
    }

    /// Adds annotations.
    pub fn annotations<I, K, V>(mut self, annotations: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.metadata
            .annotations
            .extend(annotations.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Sets the service account.
    pub fn service_account(mut self, name: impl Into<String>) -> Self {
        self.spec.service_account_name = Some(name.into());
        self
    }

    /// Sets the workflow-level arguments.
    pub fn arguments(mut self, arguments: Arguments) -> Self {
        self.spec.arguments = arguments;
        self
    }

    /// Sets the workflow-level volumes.
    pub fn volumes(mut self, volumes: Vec<Volume>) -> Self {
        self.spec.volumes = volumes;
        self
    }

    /// Sets the templates.
    pub fn templates(mut self, templates: Vec<Template>) -> Self {
        self.spec.templates = templates;
        self
    }

    /// Builds the workflow.
    pub fn build(self) -> Workflow {
        let mut spec = self.spec;
        spec.templates = remove_duplicated_templates(spec.templates);
        Workflow::new(self.metadata, spec)
    }
}

/// Keeps the first template of every name, preserving order.
pub fn remove_duplicated_templates(templates: Vec<Template>) -> Vec<Template> {
    let total = templates.len();
    let mut seen = HashSet::with_capacity(total);
    let unique: Vec<Template> = templates
        .into_iter()
        .filter(|t| seen.insert(t.name.clone()))
        .collect();

    if unique.len() < total {
        tracing::debug!(
            target: TRACING_TARGET,
            removed = total - unique.len(),
            kept = unique.len(),
            "Removed duplicated templates"
        );
    }

    unique
}

/// Lowercases `name` into a DNS label of at most `max` characters.
fn dns_label(name: &str, max: usize) -> String {
    let mut label = String::with_capacity(name.len());
    for c in name.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            label.push(c);
        } else if !label.ends_with('-') {
            label.push('-');
        }
    }
    label.truncate(max);
    let label = label.trim_matches('-');
    if label.is_empty() {
        "workflow".to_owned()
    } else {
        label.to_owned()
    }
}
