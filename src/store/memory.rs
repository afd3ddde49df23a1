//! In-memory node store, used for ephemeral servers and tests.

use super::{order_nodes, MonotonicClock, NewNode, Node, NodeStore, NodeUpdate};
use crate::error::StorageError;
use crate::types::NodeId;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct MemoryState {
    nodes: HashMap<NodeId, Node>,
    /// parent id -> child ids in insertion order
    children: HashMap<NodeId, Vec<NodeId>>,
}

/// Node store held entirely in process memory
#[derive(Debug, Default)]
pub struct MemoryNodeStore {
    state: RwLock<MemoryState>,
    clock: MonotonicClock,
}

impl MemoryNodeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NodeStore for MemoryNodeStore {
    fn get(&self, id: &NodeId) -> Result<Node, StorageError> {
        self.state
            .read()
            .nodes
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(id.clone()))
    }

    fn get_children(&self, parent_id: &NodeId) -> Result<Vec<Node>, StorageError> {
        let state = self.state.read();
        let mut children: Vec<Node> = state
            .children
            .get(parent_id)
            .map(|ids| ids.iter().filter_map(|id| state.nodes.get(id).cloned()).collect())
            .unwrap_or_default();
        order_nodes(&mut children);
        Ok(children)
    }

    fn get_all(&self) -> Result<Vec<Node>, StorageError> {
        let mut nodes: Vec<Node> = self.state.read().nodes.values().cloned().collect();
        order_nodes(&mut nodes);
        Ok(nodes)
    }

    fn insert(&self, fields: NewNode) -> Result<Node, StorageError> {
        let mut state = self.state.write();
        let node = Node {
            id: NodeId::generate(),
            name: fields.name,
            is_folder: fields.is_folder,
            parent_id: fields.parent_id,
            content: fields.content,
            created_at: self.clock.next(),
        };
        if let Some(parent_id) = &node.parent_id {
            state
                .children
                .entry(parent_id.clone())
                .or_default()
                .push(node.id.clone());
        }
        state.nodes.insert(node.id.clone(), node.clone());
        Ok(node)
    }

    fn update(&self, id: &NodeId, update: NodeUpdate) -> Result<Node, StorageError> {
        let mut state = self.state.write();
        let node = state
            .nodes
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(id.clone()))?;
        update.apply_to(node);
        Ok(node.clone())
    }

    fn delete(&self, id: &NodeId) -> Result<(), StorageError> {
        let mut state = self.state.write();
        let node = state
            .nodes
            .remove(id)
            .ok_or_else(|| StorageError::NotFound(id.clone()))?;
        if let Some(parent_id) = &node.parent_id {
            if let Some(siblings) = state.children.get_mut(parent_id) {
                siblings.retain(|sibling| sibling != id);
                if siblings.is_empty() {
                    state.children.remove(parent_id);
                }
            }
        }
        Ok(())
    }

    fn len(&self) -> Result<usize, StorageError> {
        Ok(self.state.read().nodes.len())
    }
}
