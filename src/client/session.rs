//! Explorer session: drives optimistic edits through a transport and settles
//! them in the tree cache.
//!
//! Mutation round-trips run one at a time. Optimistic patches still apply
//! immediately, so the user sees every edit at once, but responses settle in
//! the order the requests were sent. Each request is bounded by the session
//! timeout; a timeout settles as a failure.

use crate::client::cache::{CacheSnapshot, LoadStatus, Settlement, TreeCache};
use crate::client::patch::{OptimisticPatch, PatchParent};
use crate::client::transport::ExplorerTransport;
use crate::engine::NodeEdit;
use crate::error::ApiError;
use crate::tree::{Forest, TreeNode};
use crate::types::NodeId;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ExplorerSession {
    cache: Mutex<TreeCache>,
    transport: Arc<dyn ExplorerTransport>,
    in_flight: tokio::sync::Mutex<()>,
    timeout: Duration,
}

impl ExplorerSession {
    pub fn new(transport: Arc<dyn ExplorerTransport>) -> Self {
        Self::with_timeout(transport, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(transport: Arc<dyn ExplorerTransport>, timeout: Duration) -> Self {
        Self {
            cache: Mutex::new(TreeCache::new()),
            transport,
            in_flight: tokio::sync::Mutex::new(()),
            timeout,
        }
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        self.cache.lock().snapshot()
    }

    /// Working forest as currently shown.
    pub fn forest(&self) -> Option<Forest> {
        self.cache.lock().view().cloned()
    }

    pub fn status(&self) -> LoadStatus {
        self.cache.lock().status()
    }

    pub fn last_error(&self) -> Option<String> {
        self.cache.lock().last_error().map(str::to_string)
    }

    pub fn clear_error(&self) {
        self.cache.lock().clear_error();
    }

    /// Fetch the full forest. Returns without fetching when a load is
    /// already running.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<(), ApiError> {
        if !self.cache.lock().begin_load() {
            return Ok(());
        }
        let _turn = self.in_flight.lock().await;
        let result = self.bounded(self.transport.fetch_forest()).await;
        self.cache.lock().finish_load(result)
    }

    /// Load on first use: only when nothing was loaded or attempted yet.
    pub async fn ensure_loaded(&self) -> Result<(), ApiError> {
        let needs_load = {
            let cache = self.cache.lock();
            cache.status() == LoadStatus::Idle && !cache.has_data()
        };
        if needs_load {
            self.load().await
        } else {
            Ok(())
        }
    }

    /// Create a root folder. The server answers with the shallow node only,
    /// so the settle fetches the full forest. Once the server has created
    /// the root this returns `Ok`; a failed refetch settles with the
    /// created node added to the cached roots.
    #[instrument(skip(self))]
    pub async fn create_root(&self, name: &str) -> Result<TreeNode, ApiError> {
        let operation = self
            .cache
            .lock()
            .apply_optimistic(OptimisticPatch::create(PatchParent::Root, name, true));

        let _turn = self.in_flight.lock().await;
        let created = match self.bounded(self.transport.create_root(name)).await {
            Ok(created) => created,
            Err(err) => return Err(self.cache.lock().roll_back(operation, err)),
        };
        info!(node_id = %created.id, "Root created");

        match self.bounded(self.transport.fetch_forest()).await {
            Ok(forest) => {
                self.cache.lock().reconcile(operation, Ok(forest))?;
            }
            Err(err) => {
                warn!(node_id = %created.id, error = %err, "Forest refetch after create failed");
                self.cache.lock().commit_root(operation, created.clone());
            }
        }
        Ok(created)
    }

    #[instrument(skip(self, parent_id), fields(parent_id = %parent_id))]
    pub async fn insert_child(
        &self,
        parent_id: &NodeId,
        name: &str,
        is_folder: bool,
    ) -> Result<Settlement, ApiError> {
        let patch = OptimisticPatch::create(PatchParent::Node(parent_id.clone()), name, is_folder);
        let request = self.transport.insert_child(parent_id, name, is_folder);
        self.settle(Some(patch), request).await
    }

    #[instrument(skip(self, node_id), fields(node_id = %node_id))]
    pub async fn rename(&self, node_id: &NodeId, name: &str) -> Result<Settlement, ApiError> {
        let patch = OptimisticPatch::Rename {
            id: node_id.clone(),
            name: name.to_string(),
        };
        let request = self.transport.edit(node_id, NodeEdit::rename(name));
        self.settle(Some(patch), request).await
    }

    /// Name and content edit. Only a name change has an optimistic patch;
    /// the tree does not show content.
    #[instrument(skip(self, node_id, edit), fields(node_id = %node_id))]
    pub async fn edit(&self, node_id: &NodeId, edit: NodeEdit) -> Result<Settlement, ApiError> {
        let patch = edit.name.clone().map(|name| OptimisticPatch::Rename {
            id: node_id.clone(),
            name,
        });
        let request = self.transport.edit(node_id, edit);
        self.settle(patch, request).await
    }

    #[instrument(skip(self, node_id), fields(node_id = %node_id))]
    pub async fn delete(&self, node_id: &NodeId) -> Result<Settlement, ApiError> {
        let patch = OptimisticPatch::Delete {
            id: node_id.clone(),
        };
        let request = self.transport.delete(node_id);
        self.settle(Some(patch), request).await
    }

    /// Scoped subtree straight from the server; does not touch the cache.
    pub async fn fetch_subtree(&self, node_id: &NodeId) -> Result<TreeNode, ApiError> {
        self.bounded(self.transport.fetch_subtree(node_id)).await
    }

    async fn settle<F>(&self, patch: Option<OptimisticPatch>, request: F) -> Result<Settlement, ApiError>
    where
        F: Future<Output = Result<Option<Forest>, ApiError>>,
    {
        let operation = {
            let mut cache = self.cache.lock();
            match patch {
                Some(patch) => cache.apply_optimistic(patch),
                None => cache.issue(),
            }
        };
        let _turn = self.in_flight.lock().await;
        let result = self.bounded(request).await;
        self.cache.lock().reconcile(operation, result)
    }

    async fn bounded<T, F>(&self, request: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "Explorer request timed out");
                Err(ApiError::Timeout(self.timeout.as_millis() as u64))
            }
        }
    }
}
