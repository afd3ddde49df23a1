//! Nested tree node used for views and on the wire.

use crate::store::Node;
use crate::types::NodeId;
use serde::{Deserialize, Serialize};

/// A node plus its descendants. `items` is always present, empty for leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: NodeId,
    pub name: String,
    pub is_folder: bool,
    #[serde(default)]
    pub items: Vec<TreeNode>,
}

/// Sequence of independent roots
pub type Forest = Vec<TreeNode>;

impl TreeNode {
    pub fn new(id: NodeId, name: impl Into<String>, is_folder: bool) -> Self {
        Self {
            id,
            name: name.into(),
            is_folder,
            items: Vec::new(),
        }
    }

    /// Identity fields of a record, children not yet attached
    pub fn shell(node: &Node) -> Self {
        Self::new(node.id.clone(), node.name.clone(), node.is_folder)
    }

    /// Number of nodes in this subtree, including self
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.items.iter());
        }
        count
    }
}
