//! Component lookup collaborator.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use async_trait::async_trait;

use crate::error::{BoxedError, Error};
use crate::id::ComponentId;
use crate::model::Component;

/// A request for a stored component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentRequest {
    /// The latest version of a component.
    Latest(ComponentId),
    /// A specific version of a component.
    Version(ComponentId, u64),
}

impl ComponentRequest {
    /// Returns the requested component identifier.
    pub const fn id(&self) -> ComponentId {
        match self {
            Self::Latest(id) | Self::Version(id, _) => *id,
        }
    }
}

impl fmt::Display for ComponentRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest(id) => write!(f, "component {id}@latest"),
            Self::Version(id, version) => write!(f, "component {id}@{version}"),
        }
    }
}

/// Resolves component references to stored components.
///
/// Implementations typically call a storage backend. Retries and timeouts
/// are the implementation's responsibility.
#[async_trait]
pub trait ComponentLookup: Send + Sync {
    /// Returns the component matching the request.
    async fn get_component(&self, request: &ComponentRequest) -> Result<Component, BoxedError>;
}

/// In-memory component registry.
///
/// Versions are kept per component; [`ComponentRequest::Latest`] resolves to
/// the highest stored version.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLookup {
    components: HashMap<ComponentId, BTreeMap<u64, Component>>,
}

impl InMemoryLookup {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a component under its declared version, or version 0 when it
    /// carries none.
    pub fn insert(&mut self, component: Component) {
        let version = component.version.unwrap_or_default();
        self.components
            .entry(component.id)
            .or_default()
            .insert(version, component);
    }

    /// Stores a component and returns the registry.
    pub fn with(mut self, component: Component) -> Self {
        self.insert(component);
        self
    }

    /// Returns the number of stored components, counting each id once.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns the stored component matching the request.
    pub fn get(&self, request: &ComponentRequest) -> Option<&Component> {
        let versions = self.components.get(&request.id())?;
        match request {
            ComponentRequest::Latest(_) => versions.values().next_back(),
            ComponentRequest::Version(_, version) => versions.get(version),
        }
    }
}

#[async_trait]
impl ComponentLookup for InMemoryLookup {
    async fn get_component(&self, request: &ComponentRequest) -> Result<Component, BoxedError> {
        self.get(request)
            .cloned()
            .ok_or_else(|| Error::NotFound(*request).into())
    }
}
