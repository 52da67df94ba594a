//! Template input and output declarations.

use brickyard_argo::{Artifact, Inputs, Outputs, Parameter};
use brickyard_core::model::{Component, PortType};

use crate::TRACING_TARGET;
use crate::interpolate::{self, ITEM};

/// Declares the inputs of the template of `component`.
///
/// Container templates pass `artifact_root` so input artifacts are placed
/// at `<artifact_root>/<port>`. Secrets and volumes are bound through scopes
/// and produce no declaration.
pub(crate) fn declare_inputs(component: &Component, artifact_root: Option<&str>) -> Inputs {
    let mut inputs = Inputs::default();
    for port in &component.inputs {
        match port.kind {
            PortType::Parameter => inputs.parameters.push(Parameter::named(&port.name)),
            PortType::ParameterArray => {
                inputs.parameters.push(Parameter::with_value(&port.name, ITEM));
            }
            PortType::Artifact => inputs.artifacts.push(match artifact_root {
                Some(root) => {
                    let path = interpolate::join_path([root, port.name.as_str()]);
                    Artifact::at_path(&port.name, path)
                }
                None => Artifact::named(&port.name),
            }),
            PortType::Volume | PortType::EnvSecret => {
                tracing::trace!(
                    target: TRACING_TARGET,
                    component_id = %component.id,
                    port = %port.name,
                    port_type = %port.kind,
                    "Input bound through scope"
                );
            }
        }
    }
    inputs
}

/// Declares the outputs of a composite template, without sources.
pub(crate) fn declare_outputs(component: &Component) -> Outputs {
    let mut outputs = Outputs::default();
    for port in &component.outputs {
        match port.kind {
            PortType::Parameter | PortType::ParameterArray => {
                outputs.parameters.push(Parameter::named(&port.name));
            }
            PortType::Artifact => outputs.artifacts.push(Artifact::named(&port.name)),
            PortType::Volume | PortType::EnvSecret => {}
        }
    }
    outputs
}
