//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── log_json                   # JSON log output
//! └── command
//!     ├── transpile: TranspileArgs
//!     ├── dereference: DereferenceArgs
//!     └── schema: SchemaArgs     # feature `schema`
//! ```
//!
//! Options can be provided as arguments or environment variables.
//!
//! # Example
//!
//! ```bash
//! brickyard transpile --job job.json --components ./components --pretty
//!
//! BRICKYARD_COMPONENTS=./components brickyard transpile --job job.json
//! ```

mod transpile;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
pub use transpile::TranspileArgs;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::TRACING_TARGET_STARTUP;

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "brickyard")]
#[command(about = "Transpiles brickyard jobs into Argo workflows")]
#[command(version)]
pub struct Cli {
    /// Emit logs as JSON lines instead of human-readable text.
    #[arg(long, global = true, env = "BRICKYARD_LOG_JSON")]
    #[serde(default)]
    pub log_json: bool,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Debug, Clone, Subcommand, Serialize, Deserialize)]
pub enum Command {
    /// Dereferences and transpiles a job into a workflow.
    Transpile(TranspileArgs),
    /// Prints a job with every component reference inlined.
    Dereference(DereferenceArgs),
    /// Prints the JSON Schema of a document type.
    #[cfg(feature = "schema")]
    Schema(SchemaArgs),
}

impl Command {
    /// Returns the subcommand name, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Transpile(_) => "transpile",
            Self::Dereference(_) => "dereference",
            #[cfg(feature = "schema")]
            Self::Schema(_) => "schema",
        }
    }
}

/// Where to read a job and its referenced components from.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct SourceArgs {
    /// Path to the job document.
    #[arg(long)]
    pub job: PathBuf,

    /// Directory holding referenced components.
    ///
    /// Jobs whose components are all inline do not need one.
    #[arg(long, env = "BRICKYARD_COMPONENTS")]
    pub components: Option<PathBuf>,
}

/// Where and how to write a JSON document.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct OutputArgs {
    /// Output file; stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    #[serde(default)]
    pub pretty: bool,
}

/// Arguments of the `dereference` subcommand.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct DereferenceArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments of the `schema` subcommand.
#[cfg(feature = "schema")]
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct SchemaArgs {
    /// Document type: `component`, `job` or `workflow`.
    pub name: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl Cli {
    /// Initializes tracing with environment-based filtering.
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let registry = tracing_subscriber::registry().with(filter);

        // Logs go to stderr so stdout carries only the document.
        if self.log_json {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        } else {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    /// Logs build information at debug level.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            command = self.command.name(),
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "schema").then_some("schema")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_transpile_arguments() {
        let cli = Cli::try_parse_from([
            "brickyard",
            "transpile",
            "--job",
            "job.json",
            "--components",
            "components",
            "--namespace",
            "team-a",
            "--pretty",
        ])
        .unwrap();

        let Command::Transpile(args) = cli.command else {
            panic!("expected transpile");
        };
        assert_eq!(args.source.job, PathBuf::from("job.json"));
        assert_eq!(args.source.components, Some(PathBuf::from("components")));
        assert_eq!(args.namespace.as_deref(), Some("team-a"));
        assert!(args.output.pretty);
        assert!(args.output.output.is_none());
    }

    #[test]
    fn job_is_required() {
        assert!(Cli::try_parse_from(["brickyard", "dereference"]).is_err());
    }

    #[test]
    fn log_json_is_global() {
        let cli = Cli::try_parse_from([
            "brickyard",
            "dereference",
            "--job",
            "job.json",
            "--log-json",
        ])
        .unwrap();
        assert!(cli.log_json);
        assert_eq!(cli.command.name(), "dereference");
    }

    #[cfg(feature = "schema")]
    #[test]
    fn parses_schema_name() {
        let cli = Cli::try_parse_from(["brickyard", "schema", "job"]).unwrap();
        let Command::Schema(args) = cli.command else {
            panic!("expected schema");
        };
        assert_eq!(args.name, "job");
    }
}
