//! Typed ports.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

/// The type of a component port.
///
/// Every port-wiring site of the transpiler branches on this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum PortType {
    /// A scalar string parameter.
    Parameter,
    /// An array of string parameters, iterated over by the consumer.
    ParameterArray,
    /// A file artifact.
    Artifact,
    /// A volume shared between steps.
    Volume,
    /// A secret exposed to containers as an environment variable.
    EnvSecret,
}

impl PortType {
    /// Returns whether values of this type are carried as parameters.
    pub const fn is_parameter(&self) -> bool {
        matches!(self, Self::Parameter | Self::ParameterArray)
    }
}

/// A named, typed port of a component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Data {
    /// Port name, unique within its direction on a component.
    pub name: String,
    /// Port type.
    #[serde(rename = "type")]
    pub kind: PortType,
}

impl Data {
    /// Creates a new port.
    pub fn new(name: impl Into<String>, kind: PortType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Creates a scalar parameter port.
    pub fn parameter(name: impl Into<String>) -> Self {
        Self::new(name, PortType::Parameter)
    }

    /// Creates a parameter array port.
    pub fn parameter_array(name: impl Into<String>) -> Self {
        Self::new(name, PortType::ParameterArray)
    }

    /// Creates an artifact port.
    pub fn artifact(name: impl Into<String>) -> Self {
        Self::new(name, PortType::Artifact)
    }

    /// Creates a volume port.
    pub fn volume(name: impl Into<String>) -> Self {
        Self::new(name, PortType::Volume)
    }

    /// Creates a secret port.
    pub fn env_secret(name: impl Into<String>) -> Self {
        Self::new(name, PortType::EnvSecret)
    }
}

/// Finds a port by name.
pub fn find_port<'a>(ports: &'a [Data], name: &str) -> Option<&'a Data> {
    ports.iter().find(|p| p.name == name)
}
