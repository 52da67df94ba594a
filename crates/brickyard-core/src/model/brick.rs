//! Brick implementation: a single container execution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// Container execution spec wrapped by a brick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Container {
    /// Container image reference.
    pub image: String,
    /// Entrypoint command.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
    /// Working directory inside the container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
    /// Literal environment variables.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl Container {
    /// Creates a container spec for the given image.
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            ..Self::default()
        }
    }

    /// Sets the entrypoint command.
    pub fn with_command<I, S>(mut self, command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command = command.into_iter().map(Into::into).collect();
        self
    }
}

/// How an argument bound to a port is rendered, overriding the port type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(AsRefStr, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum ArgumentKind {
    /// Rendered as a parameter interpolation.
    Parameter,
    /// Rendered as an artifact path interpolation.
    Artifact,
    /// Rendered as a volume mount instead of a command-line argument.
    Volume,
}

/// The value bound to a container argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum ArgumentSource {
    /// A literal string, passed through unchanged.
    Literal {
        /// The literal value.
        value: String,
    },
    /// A named input port of the brick.
    Port {
        /// Input port name.
        name: String,
        /// Optional rendering override.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        kind: Option<ArgumentKind>,
    },
}

/// A container command-line argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Argument {
    /// The bound value.
    pub source: ArgumentSource,
    /// String prepended to the rendered value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// String appended to the rendered value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

impl Argument {
    /// Creates a literal argument.
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            source: ArgumentSource::Literal {
                value: value.into(),
            },
            prefix: None,
            suffix: None,
        }
    }

    /// Creates an argument bound to an input port.
    pub fn port(name: impl Into<String>) -> Self {
        Self {
            source: ArgumentSource::Port {
                name: name.into(),
                kind: None,
            },
            prefix: None,
            suffix: None,
        }
    }

    /// Overrides how the bound port is rendered.
    pub fn with_kind(mut self, kind: ArgumentKind) -> Self {
        if let ArgumentSource::Port { kind: k, .. } = &mut self.source {
            *k = Some(kind);
        }
        self
    }

    /// Sets the prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Sets the suffix.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// Returns the prefix, or an empty string.
    pub fn prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or_default()
    }

    /// Returns the suffix, or an empty string.
    pub fn suffix(&self) -> &str {
        self.suffix.as_deref().unwrap_or_default()
    }
}

/// Where the value of an output port comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum ResultSource {
    /// A file written by the container.
    File {
        /// Path of the file inside the container.
        path: String,
    },
    /// A volume input port of the same brick.
    Volume {
        /// Name of the brick's volume input port.
        name: String,
    },
}

/// Binds an output port to its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct BrickResult {
    /// Output port name.
    pub port: String,
    /// Value source.
    pub source: ResultSource,
}

impl BrickResult {
    /// Binds an output port to a file path.
    pub fn file(port: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            source: ResultSource::File { path: path.into() },
        }
    }

    /// Binds an output port to one of the brick's volume inputs.
    pub fn volume(port: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            source: ResultSource::Volume { name: name.into() },
        }
    }
}

/// A leaf implementation wrapping a single container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Brick {
    /// Container spec.
    pub container: Container,
    /// Command-line arguments appended to the container command.
    #[serde(default)]
    pub args: Vec<Argument>,
    /// Output port bindings.
    #[serde(default)]
    pub results: Vec<BrickResult>,
}

impl Brick {
    /// Creates a brick running the given container.
    pub fn new(container: Container) -> Self {
        Self {
            container,
            args: Vec::new(),
            results: Vec::new(),
        }
    }

    /// Appends an argument.
    pub fn with_arg(mut self, arg: Argument) -> Self {
        self.args.push(arg);
        self
    }

    /// Appends a result binding.
    pub fn with_result(mut self, result: BrickResult) -> Self {
        self.results.push(result);
        self
    }

    /// Returns the result bound to the given output port.
    pub fn result(&self, port: &str) -> Option<&BrickResult> {
        self.results.iter().find(|r| r.port == port)
    }
}
