//! Secret and volume scopes threaded through the traversal.
//!
//! A scope maps the input ports of the component being visited to the
//! concrete resource bound to them. Scopes are never mutated in place: a
//! parent computes the narrowed scope of each child from its own.

use std::collections::BTreeMap;

use brickyard_argo::{EnvVar, SecretKeySelector};
use brickyard_core::model::{Data, PortType};

use crate::error::{Error, Result};

/// Resources bound to the input ports of one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope<V> {
    entries: BTreeMap<String, V>,
}

/// Kubernetes secret keys bound to `env_secret` ports.
pub type SecretScope = Scope<SecretKeySelector>;

/// Workflow volume names bound to `volume` ports.
pub type VolumeScope = Scope<String>;

impl<V> Default for Scope<V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<V: Clone> Scope<V> {
    /// Creates an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a scope with `port` bound to `value`.
    pub fn with(mut self, port: impl Into<String>, value: V) -> Self {
        self.entries.insert(port.into(), value);
        self
    }

    /// Returns the resource bound to `port`.
    pub fn get(&self, port: &str) -> Option<&V> {
        self.entries.get(port)
    }

    /// Returns the number of bound ports.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no port is bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the bound port names.
    pub fn ports(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Computes a child scope from `(outer, inner)` port bindings.
    ///
    /// Bindings whose outer port is unbound are dropped.
    pub fn narrow<'a, I>(&self, bindings: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let entries = bindings
            .into_iter()
            .filter_map(|(outer, inner)| {
                self.entries
                    .get(outer)
                    .map(|value| (inner.to_owned(), value.clone()))
            })
            .collect();
        Self { entries }
    }
}

impl SecretScope {
    /// Renders one environment variable per declared `env_secret` input.
    ///
    /// Secrets bound to ports the component does not declare are dropped.
    pub fn env_vars(&self, inputs: &[Data]) -> Result<Vec<EnvVar>> {
        inputs
            .iter()
            .filter(|port| port.kind == PortType::EnvSecret)
            .map(|port| {
                self.get(&port.name)
                    .map(|secret| EnvVar::secret(&port.name, secret.clone()))
                    .ok_or_else(|| Error::UnboundSecret {
                        port: port.name.clone(),
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrowing_renames_and_drops() {
        let scope = VolumeScope::new()
            .with("outer-a", "vol-a".to_owned())
            .with("outer-b", "vol-b".to_owned());

        let child = scope.narrow([("outer-a", "inner"), ("missing", "other")]);
        assert_eq!(child.len(), 1);
        assert_eq!(child.get("inner").map(String::as_str), Some("vol-a"));
        assert!(child.get("outer-b").is_none());
        // The parent is untouched.
        assert_eq!(scope.len(), 2);
    }

    #[test]
    fn env_vars_are_pruned_to_declared_inputs() {
        let scope = SecretScope::new()
            .with("token", SecretKeySelector::new("creds", "token"))
            .with("stale", SecretKeySelector::new("creds", "other"));
        let inputs = [Data::env_secret("token"), Data::parameter("stale")];

        let vars = scope.env_vars(&inputs).unwrap();
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[0].name, "token");
        assert_eq!(
            vars[0].value_from.as_ref().map(|v| &v.secret_key_ref),
            Some(&SecretKeySelector::new("creds", "token"))
        );
    }

    #[test]
    fn unbound_secret_is_an_error() {
        let err = SecretScope::new()
            .env_vars(&[Data::env_secret("token")])
            .unwrap_err();
        assert!(matches!(err, Error::UnboundSecret { port } if port == "token"));
    }
}
