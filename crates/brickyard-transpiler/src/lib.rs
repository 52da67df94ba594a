#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod brick;
mod bridge;
mod config;
mod dag;
mod error;
mod expression;
pub mod interpolate;
mod job;
mod ports;
mod scope;
mod transpiler;

#[cfg(test)]
mod fixtures;

pub use config::{
    DEFAULT_ARTIFACT_ROOT, TranspilerConfig, TranspilerConfigBuilder, TranspilerConfigBuilderError,
};
pub use error::{Error, Result};
pub use scope::{Scope, SecretScope, VolumeScope};
pub use transpiler::{Transpiler, WORKFLOW_ID_LABEL, WORKFLOW_NAME_ANNOTATION};

/// Tracing target for transpilation.
pub const TRACING_TARGET: &str = "brickyard_transpiler";
