//! Storage backend selection and store path resolution.

use crate::config::xdg;
use crate::error::ApiError;
use crate::store::{MemoryNodeStore, NodeStore, SledNodeStore};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Persistent sled database
    #[default]
    Sled,
    /// Process-local; contents are lost on exit
    Memory,
}

/// Storage configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Sled directory. Relative paths resolve against the workspace root;
    /// unset means `$XDG_DATA_HOME/grove/store`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolve the sled directory to a filesystem location.
    pub fn resolve_path(&self, workspace_root: &Path) -> Result<PathBuf, ApiError> {
        match &self.path {
            Some(path) if path.is_absolute() => Ok(path.clone()),
            Some(path) => Ok(workspace_root.join(path)),
            None => Ok(xdg::data_dir()?.join("store")),
        }
    }

    /// Open the configured store.
    pub fn open(&self, workspace_root: &Path) -> Result<Arc<dyn NodeStore>, ApiError> {
        match self.backend {
            StorageBackend::Memory => {
                info!("Using in-memory node store");
                Ok(Arc::new(MemoryNodeStore::new()))
            }
            StorageBackend::Sled => {
                let path = self.resolve_path(workspace_root)?;
                info!(path = %path.display(), "Opening sled node store");
                Ok(Arc::new(SledNodeStore::new(&path)?))
            }
        }
    }
}
