//! Workflow arguments, volumes and root scopes seeded from job values.

use std::collections::HashSet;

use brickyard_argo::{Arguments, Parameter, SecretKeySelector, Volume};
use brickyard_core::model::{Component, PortType, Value, ValueData};

use crate::TRACING_TARGET;
use crate::error::{Error, Result};
use crate::scope::{SecretScope, VolumeScope};

/// Everything a job contributes before traversal.
#[derive(Debug, Clone, Default)]
pub(crate) struct Seed {
    /// Workflow-level arguments.
    pub arguments: Arguments,
    /// Workflow-level volumes, distinct by name.
    pub volumes: Vec<Volume>,
    /// Secret scope of the root component.
    pub secrets: SecretScope,
    /// Volume scope of the root component.
    pub volume_scope: VolumeScope,
}

/// Binds job values to the inputs of the root component.
pub(crate) fn seed(root: &Component, values: &[Value]) -> Result<Seed> {
    let mut seed = Seed::default();
    let mut bound = HashSet::with_capacity(values.len());

    for value in values {
        let port = root.input(&value.target).ok_or_else(|| Error::UnknownInput {
            target: value.target.clone(),
        })?;
        if !bound.insert(port.name.as_str()) {
            return Err(invalid(value, "bound more than once"));
        }

        match (port.kind, &value.value) {
            (PortType::Parameter, ValueData::String(s)) => {
                seed.arguments
                    .parameters
                    .push(Parameter::with_value(&port.name, s));
            }
            (PortType::ParameterArray, ValueData::Array(items)) => {
                let json = serde_json::to_string(items).map_err(|e| invalid(value, e))?;
                seed.arguments
                    .parameters
                    .push(Parameter::with_value(&port.name, json));
            }
            (PortType::ParameterArray, ValueData::String(s)) => {
                seed.arguments
                    .parameters
                    .push(Parameter::with_value(&port.name, s));
            }
            (PortType::Artifact, _) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    port = %port.name,
                    "Skipping artifact value, artifacts are not bound from job inputs"
                );
            }
            (PortType::Volume, ValueData::String(s)) => {
                let volume: Volume = serde_json::from_str(s).map_err(|e| invalid(value, e))?;
                seed.volume_scope = seed.volume_scope.with(&port.name, volume.name.clone());
                if seed.volumes.iter().all(|v| v.name != volume.name) {
                    seed.volumes.push(volume);
                }
            }
            (PortType::EnvSecret, ValueData::String(s)) => {
                let secret: SecretKeySelector =
                    serde_json::from_str(s).map_err(|e| invalid(value, e))?;
                seed.secrets = seed.secrets.with(&port.name, secret);
            }
            (port_type, ValueData::Array(_)) => {
                return Err(invalid(
                    value,
                    format!("array value for a {port_type} port"),
                ));
            }
        }
    }

    tracing::debug!(
        target: TRACING_TARGET,
        parameters = seed.arguments.parameters.len(),
        volumes = seed.volumes.len(),
        secrets = seed.secrets.len(),
        "Seeded job inputs"
    );
    Ok(seed)
}

fn invalid(value: &Value, reason: impl ToString) -> Error {
    Error::InvalidValue {
        target: value.target.clone(),
        reason: reason.to_string(),
    }
}
