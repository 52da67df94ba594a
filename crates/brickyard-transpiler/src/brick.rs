//! Container templates for bricks.

use brickyard_argo::{
    Artifact, Container, EnvVar, Outputs, Parameter, Template, ValueFrom, VolumeMount,
};
use brickyard_core::model::{
    Argument, ArgumentKind, ArgumentSource, Brick, Component, PortType, ResultSource,
};

use crate::TRACING_TARGET;
use crate::error::{Error, Result};
use crate::interpolate;
use crate::ports;
use crate::scope::{SecretScope, VolumeScope};

/// A rendered brick argument.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Rendered {
    /// A command-line argument.
    Arg(String),
    /// A volume mount, kept off the command line.
    Mount(VolumeMount),
}

/// Emits the container template of a brick.
pub(crate) fn emit(
    component: &Component,
    brick: &Brick,
    secrets: &SecretScope,
    volumes: &VolumeScope,
    artifact_root: &str,
) -> Result<Template> {
    let spec = &brick.container;
    let mut container = Container::new(&spec.image);
    container.command = spec.command.clone();
    container.working_dir = spec.working_dir.clone();
    container.env = spec.env.iter().map(|(k, v)| EnvVar::value(k, v)).collect();

    for arg in &brick.args {
        match render(component, arg, volumes)? {
            Rendered::Arg(arg) => container.args.push(arg),
            Rendered::Mount(mount) => container.volume_mounts.push(mount),
        }
    }
    container.env.extend(secrets.env_vars(&component.inputs)?);

    let inputs = ports::declare_inputs(component, Some(artifact_root));
    let outputs = outputs(component, brick)?;

    tracing::debug!(
        target: TRACING_TARGET,
        component_id = %component.id,
        args = container.args.len(),
        mounts = container.volume_mounts.len(),
        "Emitted container template"
    );

    Ok(Template::container(
        component.id.to_string(),
        inputs,
        outputs,
        container,
    ))
}

fn render(component: &Component, arg: &Argument, volumes: &VolumeScope) -> Result<Rendered> {
    let (name, kind) = match &arg.source {
        ArgumentSource::Literal { value } => {
            return Ok(Rendered::Arg(decorate(arg, value)));
        }
        ArgumentSource::Port { name, kind } => (name, kind),
    };

    let port = component.input(name).ok_or_else(|| Error::UnknownPort {
        direction: "input",
        port: name.clone(),
    })?;
    let kind = match (kind, port.kind) {
        (Some(kind), _) => *kind,
        (None, PortType::Parameter | PortType::ParameterArray) => ArgumentKind::Parameter,
        (None, PortType::Artifact) => ArgumentKind::Artifact,
        (None, PortType::Volume) => ArgumentKind::Volume,
        (None, port_type @ PortType::EnvSecret) => {
            return Err(Error::UnsupportedArgument {
                port: name.clone(),
                port_type,
            });
        }
    };

    let rendered = match kind {
        ArgumentKind::Parameter => {
            Rendered::Arg(decorate(arg, &interpolate::input_parameter(name)))
        }
        ArgumentKind::Artifact => {
            Rendered::Arg(decorate(arg, &interpolate::input_artifact_path(name)))
        }
        ArgumentKind::Volume => {
            let volume = volumes.get(name).ok_or_else(|| Error::UnboundVolume {
                port: name.clone(),
            })?;
            let path = interpolate::join_path([arg.prefix(), name.as_str(), arg.suffix()]);
            Rendered::Mount(VolumeMount::new(volume, path))
        }
    };
    Ok(rendered)
}

fn decorate(arg: &Argument, value: &str) -> String {
    format!("{}{value}{}", arg.prefix(), arg.suffix())
}

/// Declares the outputs of a brick from its file results.
fn outputs(component: &Component, brick: &Brick) -> Result<Outputs> {
    let mut outputs = Outputs::default();
    for port in &component.outputs {
        if matches!(port.kind, PortType::Volume | PortType::EnvSecret) {
            continue;
        }

        let path = match brick.result(&port.name).map(|r| &r.source) {
            Some(ResultSource::File { path }) => path,
            Some(ResultSource::Volume { .. }) | None => {
                return Err(Error::MissingResult {
                    port: port.name.clone(),
                });
            }
        };

        if port.kind == PortType::Artifact {
            outputs.artifacts.push(Artifact::at_path(&port.name, path));
        } else {
            outputs.parameters.push(Parameter {
                name: port.name.clone(),
                value: None,
                value_from: Some(ValueFrom::path(path)),
            });
        }
    }
    Ok(outputs)
}
