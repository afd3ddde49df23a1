//! In-place structural edits on a built forest.
//!
//! All lookups search the whole forest, depth-first, with an explicit stack.

use super::node::TreeNode;
use crate::types::NodeId;

pub fn find<'a>(forest: &'a [TreeNode], id: &NodeId) -> Option<&'a TreeNode> {
    let mut stack: Vec<&'a TreeNode> = forest.iter().collect();
    while let Some(node) = stack.pop() {
        if node.id == *id {
            return Some(node);
        }
        stack.extend(node.items.iter());
    }
    None
}

pub fn find_mut<'a>(forest: &'a mut [TreeNode], id: &NodeId) -> Option<&'a mut TreeNode> {
    let mut stack: Vec<&'a mut TreeNode> = forest.iter_mut().collect();
    while let Some(node) = stack.pop() {
        if node.id == *id {
            return Some(node);
        }
        stack.extend(node.items.iter_mut());
    }
    None
}

/// Append `child` to the items of `parent_id`. Returns false if the parent is absent.
pub fn insert_under(forest: &mut [TreeNode], parent_id: &NodeId, child: TreeNode) -> bool {
    match find_mut(forest, parent_id) {
        Some(parent) => {
            parent.items.push(child);
            true
        }
        None => false,
    }
}

/// Rename the node with `id` wherever it sits. Returns false if absent.
pub fn rename_in_place(forest: &mut [TreeNode], id: &NodeId, name: &str) -> bool {
    match find_mut(forest, id) {
        Some(node) => {
            node.name = name.to_string();
            true
        }
        None => false,
    }
}

/// Detach the node with `id` and its whole subtree.
pub fn remove_subtree(forest: &mut Vec<TreeNode>, id: &NodeId) -> Option<TreeNode> {
    let mut stack: Vec<&mut Vec<TreeNode>> = vec![forest];
    while let Some(items) = stack.pop() {
        if let Some(pos) = items.iter().position(|node| node.id == *id) {
            return Some(items.remove(pos));
        }
        stack.extend(items.iter_mut().map(|node| &mut node.items));
    }
    None
}

/// Every folder id in pre-order.
pub fn folder_ids(forest: &[TreeNode]) -> Vec<NodeId> {
    let mut ids = Vec::new();
    let mut stack: Vec<&TreeNode> = forest.iter().rev().collect();
    while let Some(node) = stack.pop() {
        if node.is_folder {
            ids.push(node.id.clone());
        }
        stack.extend(node.items.iter().rev());
    }
    ids
}
