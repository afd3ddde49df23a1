//! Node Store
//!
//! Durable records keyed by id, queryable by parent id and ordered by creation
//! time. The store never cascades: removing a subtree is the mutation engine's
//! job, so every call here touches exactly the records it names.

mod clock;
pub mod memory;
pub mod persistence;

use crate::error::StorageError;
use crate::types::{NodeId, Timestamp};
use serde::{Deserialize, Serialize};

pub use clock::MonotonicClock;
pub use memory::MemoryNodeStore;
pub use persistence::SledNodeStore;

/// Persisted node record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub is_folder: bool,
    /// `None` marks a root
    pub parent_id: Option<NodeId>,
    /// Free-form payload, not part of the tree projection
    pub content: Option<String>,
    pub created_at: Timestamp,
}

impl Node {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Fields supplied by the caller on insert; the store assigns id and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNode {
    pub name: String,
    pub is_folder: bool,
    pub parent_id: Option<NodeId>,
    pub content: Option<String>,
}

impl NewNode {
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_folder: true,
            parent_id: None,
            content: None,
        }
    }

    pub fn child(parent_id: NodeId, name: impl Into<String>, is_folder: bool) -> Self {
        Self {
            name: name.into(),
            is_folder,
            parent_id: Some(parent_id),
            content: None,
        }
    }
}

/// Partial update. Structural fields (parent, kind) are immutable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeUpdate {
    pub name: Option<String>,
    pub content: Option<String>,
}

impl NodeUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.content.is_none()
    }

    fn apply_to(self, node: &mut Node) {
        if let Some(name) = self.name {
            node.name = name;
        }
        if let Some(content) = self.content {
            node.content = Some(content);
        }
    }
}

/// Keyed node persistence
pub trait NodeStore: Send + Sync {
    fn get(&self, id: &NodeId) -> Result<Node, StorageError>;

    /// Direct children of `parent_id`, ascending `created_at`, ties by id.
    fn get_children(&self, parent_id: &NodeId) -> Result<Vec<Node>, StorageError>;

    /// Every record, ascending `created_at`, ties by id.
    fn get_all(&self) -> Result<Vec<Node>, StorageError>;

    fn insert(&self, fields: NewNode) -> Result<Node, StorageError>;

    fn update(&self, id: &NodeId, update: NodeUpdate) -> Result<Node, StorageError>;

    fn delete(&self, id: &NodeId) -> Result<(), StorageError>;

    fn len(&self) -> Result<usize, StorageError>;

    fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}

/// Sort into sibling order: insertion time, then id.
pub fn order_nodes(nodes: &mut [Node]) {
    nodes.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}
