#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod command;
mod config;
mod lookup;

use std::process;

use clap::Parser;

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "brickyard_cli::startup";
pub const TRACING_TARGET_CONFIG: &str = "brickyard_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "brickyard_cli::command";
pub const TRACING_TARGET_LOOKUP: &str = "brickyard_cli::lookup";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_COMMAND,
            error = ?error,
            "command failed"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    cli.init_tracing();
    cli.log();

    command::execute(&cli.command).await
}
