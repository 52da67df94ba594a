//! Prelude module for convenient imports.
//!
//! ```rust
//! use brickyard_core::prelude::*;
//! ```

pub use crate::model::{
    Argument, Brick, BrickResult, Component, Conditional, Container, Data, Edge, Expression,
    Graph, Implementation, InputMapping, Job, Map, Node, NodeRef, Operand, Operator,
    OutputMapping, PortRef, PortType, Value, Workflow,
};
pub use crate::{ComponentId, ComponentLookup, Error, NodeId, Result};
