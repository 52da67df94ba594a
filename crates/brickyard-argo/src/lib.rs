#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod container;
mod dag;
mod template;
mod workflow;

pub use container::{Container, EnvVar, EnvVarSource, SecretKeySelector, Volume, VolumeMount};
pub use dag::{DagTask, DagTaskBuilder, DagTaskBuilderError, DagTemplate};
pub use template::{Arguments, Artifact, Inputs, Outputs, Parameter, Template, ValueFrom};
pub use workflow::{
    API_VERSION, KIND, ObjectMeta, Workflow, WorkflowBuilder, WorkflowSpec,
    remove_duplicated_templates,
};

/// Tracing target for workflow assembly.
pub const TRACING_TARGET: &str = "brickyard_argo";
