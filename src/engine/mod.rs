//! Mutation Engine
//!
//! Applies structural changes to the node store and answers with the rebuilt
//! forest. Every mutation holds the engine write lock for its whole run, so no
//! other request observes a half-applied create, rename or delete. Lookups
//! always happen before any write: `NotFound` and `InvalidOperation` leave
//! the store untouched.
//!
//! Cascade delete is the one multi-record write. It removes children before
//! their parent, but it is not transactional across records: if the store
//! fails part-way, the nodes already removed stay removed and the error is
//! returned as `StoreFailure`.

pub mod validation;

use crate::error::{ApiError, StorageError};
use crate::store::{NewNode, Node, NodeStore, NodeUpdate};
use crate::tree::{build_forest, build_subtree, Forest, TreeNode};
use crate::types::NodeId;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

pub use validation::{validate_name, NodeEdit};

pub struct MutationEngine {
    store: Arc<dyn NodeStore>,
    gate: RwLock<()>,
}

impl MutationEngine {
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        Self {
            store,
            gate: RwLock::new(()),
        }
    }

    pub fn store(&self) -> &Arc<dyn NodeStore> {
        &self.store
    }

    /// Full forest, `None` when the store is empty.
    #[instrument(skip(self))]
    pub fn get_forest(&self) -> Result<Option<Forest>, ApiError> {
        let _read = self.gate.read();
        self.rebuild()
    }

    /// Insert a new root folder and return its shallow view.
    #[instrument(skip(self))]
    pub fn create_root(&self, name: &str) -> Result<TreeNode, ApiError> {
        let name = validate_name("name", name)?;
        let _write = self.gate.write();

        let node = self.store.insert(NewNode::root(name))?;
        info!(node_id = %node.id, name = %node.name, "Created root");
        Ok(TreeNode::shell(&node))
    }

    #[instrument(skip(self, parent_id), fields(parent_id = %parent_id))]
    pub fn insert_child(
        &self,
        parent_id: &NodeId,
        name: &str,
        is_folder: bool,
    ) -> Result<Option<Forest>, ApiError> {
        let name = validate_name("item", name)?;
        let _write = self.gate.write();

        let parent = self.lookup(parent_id, "Parent folder not found")?;
        if !parent.is_folder {
            return Err(ApiError::InvalidOperation(
                "Cannot add items to a file".to_string(),
            ));
        }

        let node = self
            .store
            .insert(NewNode::child(parent.id, name, is_folder))?;
        info!(node_id = %node.id, name = %node.name, is_folder, "Inserted child");
        self.rebuild()
    }

    /// Rename a node and/or replace its content. The only failure is a
    /// missing node; the new name is stored as given.
    #[instrument(skip(self, node_id, edit), fields(node_id = %node_id))]
    pub fn rename(&self, node_id: &NodeId, edit: NodeEdit) -> Result<Option<Forest>, ApiError> {
        let _write = self.gate.write();

        self.lookup(node_id, "Node not found")?;
        let update = NodeUpdate {
            name: edit.name,
            content: edit.content,
        };
        if update.is_empty() {
            debug!("Empty edit, nothing to write");
        } else {
            let node = self.store.update(node_id, update)?;
            info!(name = %node.name, "Updated node");
        }
        self.rebuild()
    }

    /// Delete a node and every descendant, children first.
    #[instrument(skip(self, node_id), fields(node_id = %node_id))]
    pub fn delete_cascade(&self, node_id: &NodeId) -> Result<Option<Forest>, ApiError> {
        let _write = self.gate.write();

        let target = self.lookup(node_id, "Node not found")?;
        let doomed = self.collect_subtree_ids(target.id)?;

        // `doomed` is pre-order, so walking it backwards removes every
        // descendant before its ancestor.
        for (removed, id) in doomed.iter().rev().enumerate() {
            if let Err(e) = self.store.delete(id) {
                error!(
                    failed_id = %id,
                    removed,
                    total = doomed.len(),
                    error = %e,
                    "Cascade delete interrupted; subtree is partially removed"
                );
                return Err(ApiError::StoreFailure(e));
            }
        }
        info!(removed = doomed.len(), "Deleted subtree");
        self.rebuild()
    }

    /// Subtree of a root node. Non-root ids are reported as `NotFound`.
    #[instrument(skip(self, node_id), fields(node_id = %node_id))]
    pub fn get_node_subtree(&self, node_id: &NodeId) -> Result<TreeNode, ApiError> {
        let _read = self.gate.read();

        let node = self.lookup(node_id, "Node not found")?;
        if !node.is_root() {
            return Err(ApiError::NotFound(format!("Node not found: {}", node_id)));
        }
        let tree = build_subtree(node, |id| self.store.get_children(id))?;
        debug!(size = tree.size(), "Built subtree");
        Ok(tree)
    }

    fn lookup(&self, id: &NodeId, message: &str) -> Result<Node, ApiError> {
        match self.store.get(id) {
            Ok(node) => Ok(node),
            Err(StorageError::NotFound(_)) => {
                Err(ApiError::NotFound(format!("{}: {}", message, id)))
            }
            Err(e) => Err(ApiError::StoreFailure(e)),
        }
    }

    /// Ids of `root` and all descendants, parents before children.
    fn collect_subtree_ids(&self, root: NodeId) -> Result<Vec<NodeId>, ApiError> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !seen.insert(id.clone()) {
                continue;
            }
            let children = self
                .store
                .get_children(&id)
                .map_err(ApiError::StoreFailure)?;
            stack.extend(children.into_iter().map(|child| child.id));
            order.push(id);
        }
        Ok(order)
    }

    fn rebuild(&self) -> Result<Option<Forest>, ApiError> {
        let nodes = self.store.get_all().map_err(ApiError::StoreFailure)?;
        Ok(build_forest(&nodes))
    }
}
