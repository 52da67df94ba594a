#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod dereference;
mod error;
mod id;
mod lookup;
pub mod model;
#[cfg(feature = "schema")]
#[cfg_attr(docsrs, doc(cfg(feature = "schema")))]
mod schema;

#[doc(hidden)]
pub mod prelude;

pub use dereference::{
    ROOT_NODE, dereference_component, dereference_job, dereference_node, dereference_ref,
};
pub use error::{BoxedError, Error, Result};
pub use id::{ComponentId, NodeId};
pub use lookup::{ComponentLookup, ComponentRequest, InMemoryLookup};
#[cfg(feature = "schema")]
pub use schema::SchemaRegistry;

/// Tracing target for component model operations.
pub const TRACING_TARGET: &str = "brickyard_core";
