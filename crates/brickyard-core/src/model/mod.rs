//! Component data model.
//!
//! A [`Component`] declares typed input and output ports and exactly one
//! [`Implementation`]:
//! - [`Brick`]: a single container execution
//! - [`Graph`]: a DAG of child [`Node`]s
//! - [`Map`]: repeated execution of one child
//! - [`Conditional`]: guarded execution of one of two children
//! - `Any`: a placeholder without executable semantics
//!
//! Children are referenced through [`NodeRef`], which is either an inline
//! component or a reference to a stored one.

mod brick;
mod component;
mod control;
mod graph;
mod job;
mod port;

pub use brick::{
    Argument, ArgumentKind, ArgumentSource, Brick, BrickResult, Container, ResultSource,
};
pub use component::{Component, Implementation};
pub use control::{Conditional, Expression, Map, Operand, Operator};
pub use graph::{Edge, Graph, InputMapping, Node, NodeRef, OutputMapping, PortRef};
pub use job::{Job, Value, ValueData, Workflow};
pub use port::{Data, PortType, find_port};
