//! Subcommand implementations.

use std::path::Path;

use anyhow::Context;
use brickyard_core::model::Job;
use brickyard_core::{ComponentLookup, InMemoryLookup, dereference_job};
use brickyard_transpiler::Transpiler;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::TRACING_TARGET_COMMAND;
use crate::config::{Command, DereferenceArgs, OutputArgs, SourceArgs, TranspileArgs};
use crate::lookup::DirectoryLookup;

/// Runs the selected subcommand.
pub async fn execute(command: &Command) -> anyhow::Result<()> {
    match command {
        Command::Transpile(args) => transpile(args).await,
        Command::Dereference(args) => dereference(args).await,
        #[cfg(feature = "schema")]
        Command::Schema(args) => schema(args).await,
    }
}

async fn transpile(args: &TranspileArgs) -> anyhow::Result<()> {
    let config = args.to_config()?;
    let job = load_job(&args.source).await?;

    let workflow = Transpiler::new(config)
        .transpile(&job)
        .with_context(|| format!("failed to transpile workflow '{}'", job.workflow.name))?;

    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        workflow = %job.workflow.name,
        entrypoint = %workflow.spec.entrypoint,
        templates = workflow.spec.templates.len(),
        volumes = workflow.spec.volumes.len(),
        "Transpiled workflow"
    );

    write_json(&args.output, &workflow).await
}

async fn dereference(args: &DereferenceArgs) -> anyhow::Result<()> {
    let job = load_job(&args.source).await?;
    write_json(&args.output, &job).await
}

#[cfg(feature = "schema")]
async fn schema(args: &crate::config::SchemaArgs) -> anyhow::Result<()> {
    let registry = brickyard_core::SchemaRegistry::new();
    let schema = registry.get(&args.name).with_context(|| {
        let known: Vec<_> = registry.names().collect();
        format!("unknown schema '{}', expected one of {known:?}", args.name)
    })?;
    write_json(&args.output, schema).await
}

/// Reads a job and dereferences it against the configured components.
async fn load_job(source: &SourceArgs) -> anyhow::Result<Job> {
    let job = read_job(&source.job).await?;

    let lookup: Box<dyn ComponentLookup> = match &source.components {
        Some(dir) => Box::new(DirectoryLookup::new(dir)),
        None => Box::new(InMemoryLookup::new()),
    };

    tracing::debug!(
        target: TRACING_TARGET_COMMAND,
        workflow = %job.workflow.name,
        components = ?source.components,
        "Dereferencing job"
    );

    dereference_job(&*lookup, job)
        .await
        .context("failed to dereference job")
}

async fn read_job(path: &Path) -> anyhow::Result<Job> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read job {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("failed to parse job {}", path.display()))
}

async fn write_json<T: Serialize + ?Sized>(output: &OutputArgs, value: &T) -> anyhow::Result<()> {
    let mut bytes = if output.pretty {
        serde_json::to_vec_pretty(value)
    } else {
        serde_json::to_vec(value)
    }
    .context("failed to serialize output")?;
    bytes.push(b'\n');

    match &output.output {
        Some(path) => tokio::fs::write(path, &bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(&bytes).await.context("failed to write stdout")?;
            stdout.flush().await.context("failed to flush stdout")
        }
    }
}
