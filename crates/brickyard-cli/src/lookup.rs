//! Component lookup backed by a directory of JSON documents.
//!
//! ```text
//! components/
//! ├── 0192f1c4-....json        # latest version
//! └── 0192f1c4-.../
//!     ├── 1.json               # version 1
//!     └── 2.json               # version 2
//! ```
//!
//! A latest request prefers `<id>.json` and falls back to the highest
//! numbered file under `<id>/`.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use brickyard_core::model::Component;
use brickyard_core::{BoxedError, ComponentId, ComponentLookup, ComponentRequest};

use crate::TRACING_TARGET_LOOKUP;

/// Errors raised while reading components from disk.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// No document exists for the request.
    #[error("{request} not found under {}", root.display())]
    NotFound {
        /// The unresolved request.
        request: ComponentRequest,
        /// Component directory.
        root: PathBuf,
    },

    /// The document could not be read.
    #[error("failed to read {}", path.display())]
    Read {
        /// Document path.
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The document is not a valid component.
    #[error("failed to parse {}", path.display())]
    Parse {
        /// Document path.
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The document declares a different identifier than its file name.
    #[error("{} declares component {found}, expected {expected}", path.display())]
    Mismatch {
        /// Document path.
        path: PathBuf,
        /// Identifier named by the request.
        expected: ComponentId,
        /// Identifier found in the document.
        found: ComponentId,
    },
}

/// Reads components from `<root>/<id>.json` and `<root>/<id>/<version>.json`.
#[derive(Debug, Clone)]
pub struct DirectoryLookup {
    root: PathBuf,
}

impl DirectoryLookup {
    /// Creates a lookup rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn resolve(&self, request: &ComponentRequest) -> Result<PathBuf, LookupError> {
        let id = request.id();
        let candidate = match request {
            ComponentRequest::Latest(_) => {
                let flat = self.root.join(format!("{id}.json"));
                if exists(&flat).await? {
                    Some(flat)
                } else {
                    self.latest_version(id).await?
                }
            }
            ComponentRequest::Version(_, version) => {
                let path = self.root.join(id.to_string()).join(format!("{version}.json"));
                exists(&path).await?.then_some(path)
            }
        };

        candidate.ok_or_else(|| LookupError::NotFound {
            request: *request,
            root: self.root.clone(),
        })
    }

    async fn latest_version(&self, id: ComponentId) -> Result<Option<PathBuf>, LookupError> {
        let dir = self.root.join(id.to_string());
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(LookupError::Read { path: dir, source }),
        };

        let mut latest: Option<(u64, PathBuf)> = None;
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(source) => return Err(LookupError::Read { path: dir, source }),
            };
            let path = entry.path();
            let Some(version) = version_of(&path) else {
                continue;
            };
            if latest.as_ref().is_none_or(|(v, _)| version > *v) {
                latest = Some((version, path));
            }
        }

        Ok(latest.map(|(_, path)| path))
    }

    async fn load(&self, request: &ComponentRequest) -> Result<Component, LookupError> {
        let path = self.resolve(request).await?;

        tracing::debug!(
            target: TRACING_TARGET_LOOKUP,
            request = %request,
            path = %path.display(),
            "Reading component"
        );

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| LookupError::Read {
                path: path.clone(),
                source,
            })?;
        let component: Component =
            serde_json::from_slice(&bytes).map_err(|source| LookupError::Parse {
                path: path.clone(),
                source,
            })?;

        if component.id != request.id() {
            return Err(LookupError::Mismatch {
                path,
                expected: request.id(),
                found: component.id,
            });
        }

        Ok(component)
    }
}

#[async_trait]
impl ComponentLookup for DirectoryLookup {
    async fn get_component(&self, request: &ComponentRequest) -> Result<Component, BoxedError> {
        Ok(self.load(request).await?)
    }
}

async fn exists(path: &Path) -> Result<bool, LookupError> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|source| LookupError::Read {
            path: path.to_path_buf(),
            source,
        })
}

/// Parses `<n>.json` into `n`.
fn version_of(path: &Path) -> Option<u64> {
    if path.extension()? != "json" {
        return None;
    }
    path.file_stem()?.to_str()?.parse().ok()
}
