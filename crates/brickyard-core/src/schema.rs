//! JSON Schemas of the submitted documents.

use std::collections::BTreeMap;

use schemars::{Schema, schema_for};

use crate::model::{Component, Job, Workflow};

/// Immutable registry of the JSON Schemas accepted at the API boundary.
///
/// Build it once at startup and pass it to whatever needs validation.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: BTreeMap<&'static str, Schema>,
}

impl SchemaRegistry {
    /// Generates the schemas of every registered document type.
    pub fn new() -> Self {
        let schemas = BTreeMap::from([
            ("component", schema_for!(Component)),
            ("job", schema_for!(Job)),
            ("workflow", schema_for!(Workflow)),
        ]);
        Self { schemas }
    }

    /// Returns the schema registered under the given name.
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// Returns the registered names, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.schemas.keys().copied()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
