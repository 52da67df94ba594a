//! Task arguments and composite outputs.

use brickyard_argo::{Artifact, DagTask, Outputs, Parameter, ValueFrom};
use brickyard_core::NodeId;
use brickyard_core::model::{
    Component, Conditional, Data, Edge, Implementation, InputMapping, OutputMapping, PortType,
};

use crate::TRACING_TARGET;
use crate::bridge::Wiring;
use crate::error::{Error, Result, ResultExt};
use crate::expression;
use crate::interpolate::{self, ITEM};
use crate::ports;

/// Binds the inputs of `parent` to the arguments of a task calling `child`.
///
/// Volumes and secrets are bound through scopes instead.
pub(crate) fn wire_input_mappings<'a, I>(
    task: &mut DagTask,
    parent: &Component,
    child: &Component,
    mappings: I,
) -> Result<()>
where
    I: IntoIterator<Item = &'a InputMapping>,
{
    for mapping in mappings {
        let outer = input_port(parent, &mapping.source)?;
        let inner = input_port(child, &mapping.target.port).in_component(child.id)?;
        let target = inner.name.as_str();

        match outer.kind {
            PortType::Parameter => push_parameter(task, target, interpolate::input_parameter(&outer.name)),
            PortType::ParameterArray => {
                fan_out(task, target, interpolate::input_parameter(&outer.name))?;
            }
            PortType::Artifact => task.arguments.artifacts.push(Artifact::from_ref(
                target,
                interpolate::input_artifact(&outer.name),
            )),
            PortType::Volume | PortType::EnvSecret => {}
        }
    }
    Ok(())
}

/// Binds the output of a sibling task to an argument of `task`.
///
/// The type of the source output decides the binding. Volume edges only
/// order the tasks; the claim is bound through the volume scope.
pub(crate) fn wire_edge(
    task: &mut DagTask,
    wiring: &Wiring<'_>,
    child: &Component,
    edge: &Edge,
) -> Result<()> {
    let source = wiring.component(&edge.source.node)?;
    let output = output_port(source, &edge.source.port).in_component(source.id)?;
    let inner = input_port(child, &edge.target.port).in_component(child.id)?;
    let task_name = edge.source.node.as_str();
    let target = inner.name.as_str();

    match output.kind {
        PortType::Parameter => {
            push_parameter(task, target, interpolate::task_parameter(task_name, &output.name));
        }
        PortType::ParameterArray if matches!(source.implementation, Implementation::Brick(_)) => {
            fan_out(task, target, interpolate::task_parameter(task_name, &output.name))?;
        }
        PortType::ParameterArray => {
            push_parameter(task, target, interpolate::task_parameter(task_name, &output.name));
        }
        PortType::Artifact => task.arguments.artifacts.push(Artifact::from_ref(
            target,
            interpolate::task_artifact(task_name, &output.name),
        )),
        PortType::Volume => {
            tracing::debug!(
                target: TRACING_TARGET,
                source = %edge.source.node,
                target = %edge.target.node,
                port = %edge.target.port,
                "Volume edge bound through scope"
            );
        }
        port_type @ PortType::EnvSecret => {
            return Err(Error::UnsupportedEdge {
                node_id: edge.target.node.clone(),
                port: edge.target.port.clone(),
                port_type,
            });
        }
    }
    Ok(())
}

/// Declares the outputs of a graph or map, sourced from its tasks.
pub(crate) fn mapped_outputs<F>(
    component: &Component,
    mappings: &[OutputMapping],
    task_name: F,
) -> Result<Outputs>
where
    F: Fn(&NodeId) -> String,
{
    let mut outputs = ports::declare_outputs(component);
    for mapping in mappings {
        let port = output_port(component, &mapping.target)?;
        let task = task_name(&mapping.source.node);

        match port.kind {
            PortType::Parameter | PortType::ParameterArray => {
                if let Some(param) = outputs.parameter_mut(&port.name) {
                    let reference = interpolate::task_parameter(&task, &mapping.source.port);
                    param.value_from = Some(ValueFrom::parameter(reference));
                }
            }
            PortType::Artifact => {
                if let Some(artifact) = outputs.artifact_mut(&port.name) {
                    artifact.from = Some(interpolate::task_artifact(&task, &mapping.source.port));
                }
            }
            PortType::Volume => {}
            port_type @ PortType::EnvSecret => {
                return Err(Error::UnsupportedOutput {
                    port: port.name.clone(),
                    port_type,
                });
            }
        }
    }
    Ok(outputs)
}

/// Declares the outputs of a conditional, each selecting the output of the
/// branch that ran.
pub(crate) fn conditional_outputs(
    component: &Component,
    cond: &Conditional,
    true_task: &str,
    false_task: &str,
) -> Result<Outputs> {
    let mut outputs = ports::declare_outputs(component);
    if cond.output_mappings.is_empty() {
        return Ok(outputs);
    }
    let condition = expression::render_condition(&cond.expression, &component.inputs)?;

    let primary = cond
        .output_mappings
        .iter()
        .filter(|m| m.source.node == cond.node_true.id);
    for mapping in primary {
        let port = output_port(component, &mapping.target)?;
        let false_port = cond.node_false.as_ref().map(|node| {
            cond.output_mappings
                .iter()
                .find(|m| m.source.node == node.id && m.target == mapping.target)
                .map_or(mapping.source.port.as_str(), |m| m.source.port.as_str())
        });

        match port.kind {
            PortType::Parameter | PortType::ParameterArray => {
                let when_true = interpolate::task_parameter_expr(true_task, &mapping.source.port);
                let when_false = false_port.map(|p| interpolate::task_parameter_expr(false_task, p));
                let value = expression::ternary(&condition, &when_true, when_false.as_deref());
                if let Some(param) = outputs.parameter_mut(&port.name) {
                    param.value_from = Some(ValueFrom::expression(value));
                }
            }
            PortType::Artifact => {
                let when_true = interpolate::task_artifact_expr(true_task, &mapping.source.port);
                let when_false = false_port.map(|p| interpolate::task_artifact_expr(false_task, p));
                let value = expression::ternary(&condition, &when_true, when_false.as_deref());
                if let Some(artifact) = outputs.artifact_mut(&port.name) {
                    artifact.from_expression = Some(value);
                }
            }
            PortType::Volume => {}
            port_type @ PortType::EnvSecret => {
                return Err(Error::UnsupportedOutput {
                    port: port.name.clone(),
                    port_type,
                });
            }
        }
    }
    Ok(outputs)
}

fn push_parameter(task: &mut DagTask, name: &str, value: String) {
    task.arguments.parameters.push(Parameter::with_value(name, value));
}

/// Fans `task` out over a JSON array, binding each element to `target`.
fn fan_out(task: &mut DagTask, target: &str, items: String) -> Result<()> {
    if task.with_param.as_ref().is_some_and(|existing| *existing != items) {
        return Err(Error::ConflictingFanOut {
            task: task.name.clone(),
        });
    }

    tracing::debug!(
        target: TRACING_TARGET,
        task = %task.name,
        items = %items,
        port = %target,
        "Fanning out task"
    );
    task.with_param = Some(items);
    push_parameter(task, target, ITEM.to_owned());
    Ok(())
}

fn input_port<'a>(component: &'a Component, name: &str) -> Result<&'a Data> {
    component.input(name).ok_or_else(|| Error::UnknownPort {
        direction: "input",
        port: name.to_owned(),
    })
}

fn output_port<'a>(component: &'a Component, name: &str) -> Result<&'a Data> {
    component.output(name).ok_or_else(|| Error::UnknownPort {
        direction: "output",
        port: name.to_owned(),
    })
}
