//! Transpilation options.

use anyhow::Context;
use brickyard_transpiler::{DEFAULT_ARTIFACT_ROOT, TranspilerConfig};
use clap::Args;
use serde::{Deserialize, Serialize};

use super::{OutputArgs, SourceArgs};
use crate::TRACING_TARGET_CONFIG;

/// Arguments of the `transpile` subcommand.
///
/// # Environment Variables
///
/// - `BRICKYARD_COMPONENTS` - Component directory
/// - `BRICKYARD_NAMESPACE` - Namespace override (default: the job workspace)
/// - `BRICKYARD_SERVICE_ACCOUNT` - Service account of the workflow pods
/// - `BRICKYARD_ARTIFACT_ROOT` - Input artifact directory (default: /tmp/artifacts)
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct TranspileArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Namespace of the emitted workflow.
    #[arg(long, env = "BRICKYARD_NAMESPACE")]
    pub namespace: Option<String>,

    /// Service account the workflow pods run as.
    #[arg(long, env = "BRICKYARD_SERVICE_ACCOUNT")]
    pub service_account: Option<String>,

    /// Directory under which container input artifacts are placed.
    #[arg(long, env = "BRICKYARD_ARTIFACT_ROOT", default_value = DEFAULT_ARTIFACT_ROOT)]
    pub artifact_root: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl TranspileArgs {
    /// Builds the transpiler configuration.
    pub fn to_config(&self) -> anyhow::Result<TranspilerConfig> {
        let mut builder = TranspilerConfig::builder();
        builder.artifact_root(self.artifact_root.as_str());
        if let Some(namespace) = &self.namespace {
            builder.namespace(namespace.as_str());
        }
        if let Some(service_account) = &self.service_account {
            builder.service_account(service_account.as_str());
        }

        let config = builder.build().context("invalid transpiler configuration")?;

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            artifact_root = %config.artifact_root,
            namespace = ?config.namespace,
            service_account = ?config.service_account,
            "Transpiler configuration"
        );

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn args() -> TranspileArgs {
        TranspileArgs {
            source: SourceArgs {
                job: PathBuf::from("job.json"),
                components: None,
            },
            namespace: None,
            service_account: None,
            artifact_root: DEFAULT_ARTIFACT_ROOT.to_owned(),
            output: OutputArgs {
                output: None,
                pretty: false,
            },
        }
    }

    #[test]
    fn defaults_produce_default_config() {
        assert_eq!(args().to_config().unwrap(), TranspilerConfig::default());
    }

    #[test]
    fn overrides_are_forwarded() {
        let mut args = args();
        args.namespace = Some("team-a".into());
        args.service_account = Some("runner".into());
        args.artifact_root = "/data".into();

        let config = args.to_config().unwrap();
        assert_eq!(config.namespace.as_deref(), Some("team-a"));
        assert_eq!(config.service_account.as_deref(), Some("runner"));
        assert_eq!(config.artifact_root, "/data");
    }

    #[test]
    fn empty_artifact_root_is_rejected() {
        let mut args = args();
        args.artifact_root = String::new();
        assert!(args.to_config().is_err());
    }
}
