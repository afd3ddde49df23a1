//! Client tree cache: the last forest the server confirmed, plus the
//! optimistic patches issued since.
//!
//! Readers see the working copy: the authoritative forest with every pending
//! patch applied in issue order. Any settle, success or failure, ends every
//! pending patch. On success the server forest replaces the authoritative one
//! wholesale; on failure the authoritative forest is kept, which undoes the
//! optimistic edits.

use crate::client::patch::{OperationId, OptimisticPatch, PatchState, PendingPatch};
use crate::error::ApiError;
use crate::tree::{Forest, TreeNode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadStatus {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Outcome of a successful settle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub operation: OperationId,
    /// Patches moved to `Committed` by this settle, including the settling one
    pub committed: usize,
}

/// Point-in-time copy of the cache for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheSnapshot {
    pub forest: Option<Forest>,
    pub status: LoadStatus,
    pub last_error: Option<String>,
    pub pending: usize,
}

#[derive(Debug)]
pub struct TreeCache {
    authoritative: Option<Forest>,
    working: Option<Forest>,
    status: LoadStatus,
    last_error: Option<String>,
    pending: BTreeMap<OperationId, PendingPatch>,
    next_operation: u64,
}

impl Default for TreeCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeCache {
    pub fn new() -> Self {
        Self {
            authoritative: None,
            working: None,
            status: LoadStatus::Idle,
            last_error: None,
            pending: BTreeMap::new(),
            next_operation: 1,
        }
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn authoritative(&self) -> Option<&Forest> {
        self.authoritative.as_ref()
    }

    /// Working forest shown to the user.
    pub fn view(&self) -> Option<&Forest> {
        self.working.as_ref()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn has_data(&self) -> bool {
        self.authoritative.is_some()
    }

    /// Enter `Loading`. Returns false when a load is already running, in
    /// which case the caller must not fetch.
    pub fn begin_load(&mut self) -> bool {
        if self.status == LoadStatus::Loading {
            debug!("Load already in progress");
            return false;
        }
        self.status = LoadStatus::Loading;
        true
    }

    /// Finish a load started with [`TreeCache::begin_load`]. Patches still
    /// pending are replayed on top of the fetched forest.
    pub fn finish_load(&mut self, result: Result<Option<Forest>, ApiError>) -> Result<(), ApiError> {
        match result {
            Ok(forest) => {
                self.authoritative = forest;
                self.status = LoadStatus::Ready;
                self.last_error = None;
                self.rebuild_working();
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Forest load failed");
                self.status = LoadStatus::Failed;
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Apply a patch to the working copy and track it under a fresh id.
    pub fn apply_optimistic(&mut self, patch: OptimisticPatch) -> OperationId {
        let operation = self.issue();

        if !patch.apply(&mut self.working) {
            debug!(%operation, kind = patch.kind(), "Optimistic patch target not in view");
        }
        self.pending.insert(operation, PendingPatch::new(patch));
        operation
    }

    /// Issue an operation id with no patch attached, for round-trips that
    /// change nothing the tree shows.
    pub fn issue(&mut self) -> OperationId {
        let operation = OperationId(self.next_operation);
        self.next_operation += 1;
        operation
    }

    /// Settle a round-trip. Every pending patch ends here, not only
    /// `operation`'s.
    pub fn reconcile(
        &mut self,
        operation: OperationId,
        result: Result<Option<Forest>, ApiError>,
    ) -> Result<Settlement, ApiError> {
        if !self.pending.contains_key(&operation) {
            debug!(%operation, "Settling operation with no pending patch");
        }
        let committed = result.is_ok();
        let settled = self.drain_pending(committed);

        match result {
            Ok(forest) => {
                self.authoritative = forest;
                self.last_error = None;
                if self.status != LoadStatus::Loading {
                    self.status = LoadStatus::Ready;
                }
                self.working = self.authoritative.clone();
                debug!(%operation, settled, "Committed server forest");
                Ok(Settlement {
                    operation,
                    committed: settled,
                })
            }
            Err(err) => Err(self.fail(operation, settled, err)),
        }
    }

    /// Settle a root creation the server confirmed without a fresh forest.
    /// The created node is appended to the authoritative roots and every
    /// pending patch is committed, as for any successful settle.
    pub fn commit_root(&mut self, operation: OperationId, root: TreeNode) -> Settlement {
        let settled = self.drain_pending(true);
        let roots = self.authoritative.get_or_insert_with(Vec::new);
        if !roots.iter().any(|existing| existing.id == root.id) {
            roots.push(root);
        }
        self.last_error = None;
        if self.status != LoadStatus::Loading {
            self.status = LoadStatus::Ready;
        }
        self.working = self.authoritative.clone();
        debug!(%operation, settled, "Committed created root without refetch");
        Settlement {
            operation,
            committed: settled,
        }
    }

    /// Settle a round-trip that failed before any forest came back.
    pub fn roll_back(&mut self, operation: OperationId, err: ApiError) -> ApiError {
        let settled = self.drain_pending(false);
        self.fail(operation, settled, err)
    }

    fn fail(&mut self, operation: OperationId, rolled_back: usize, err: ApiError) -> ApiError {
        warn!(%operation, rolled_back, error = %err, "Rolled back optimistic edits");
        self.last_error = Some(err.to_string());
        self.working = self.authoritative.clone();
        err
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            forest: self.working.clone(),
            status: self.status,
            last_error: self.last_error.clone(),
            pending: self.pending.len(),
        }
    }

    fn drain_pending(&mut self, committed: bool) -> usize {
        let target = if committed {
            PatchState::Committed
        } else {
            PatchState::RolledBack
        };
        std::mem::take(&mut self.pending)
            .into_values()
            .filter(|pending| pending.state() == PatchState::Pending)
            .map(|mut pending| pending.settle(committed))
            .filter(|state| *state == target)
            .count()
    }

    fn rebuild_working(&mut self) {
        let mut working = self.authoritative.clone();
        for pending in self.pending.values() {
            pending.patch.apply(&mut working);
        }
        self.working = working;
    }
}
