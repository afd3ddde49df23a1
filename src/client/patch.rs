//! Optimistic patches and their settle state machine.

use crate::tree::edit::{insert_under, remove_subtree, rename_in_place};
use crate::tree::{Forest, TreeNode};
use crate::types::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Identifier of one optimistic edit, issued by the cache in increasing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OperationId(pub u64);

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op-{}", self.0)
    }
}

/// Where an optimistic create lands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatchParent {
    /// New independent root
    Root,
    Node(NodeId),
}

/// Tentative local change applied before the server confirms it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimisticPatch {
    Create {
        temp_id: NodeId,
        parent: PatchParent,
        name: String,
        is_folder: bool,
    },
    Rename {
        id: NodeId,
        name: String,
    },
    Delete {
        id: NodeId,
    },
}

impl OptimisticPatch {
    pub fn create(parent: PatchParent, name: impl Into<String>, is_folder: bool) -> Self {
        OptimisticPatch::Create {
            temp_id: NodeId::temporary(),
            parent,
            name: name.into(),
            is_folder,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            OptimisticPatch::Create { .. } => "create",
            OptimisticPatch::Rename { .. } => "rename",
            OptimisticPatch::Delete { .. } => "delete",
        }
    }

    /// Apply to a working forest. Returns false when the target is not
    /// present, in which case the forest is left as it was.
    pub fn apply(&self, forest: &mut Option<Forest>) -> bool {
        match self {
            OptimisticPatch::Create {
                temp_id,
                parent,
                name,
                is_folder,
            } => {
                let shell = TreeNode::new(temp_id.clone(), name.clone(), *is_folder);
                match parent {
                    PatchParent::Root => {
                        forest.get_or_insert_with(Vec::new).push(shell);
                        true
                    }
                    PatchParent::Node(parent_id) => forest
                        .as_mut()
                        .map_or(false, |f| insert_under(f, parent_id, shell)),
                }
            }
            OptimisticPatch::Rename { id, name } => forest
                .as_mut()
                .map_or(false, |f| rename_in_place(f, id, name)),
            OptimisticPatch::Delete { id } => forest
                .as_mut()
                .map_or(false, |f| remove_subtree(f, id).is_some()),
        }
    }
}

/// Lifecycle of a pending patch: `Pending -> Committed | RolledBack`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatchState {
    Pending,
    Committed,
    RolledBack,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPatch {
    pub patch: OptimisticPatch,
    state: PatchState,
}

impl PendingPatch {
    pub fn new(patch: OptimisticPatch) -> Self {
        Self {
            patch,
            state: PatchState::Pending,
        }
    }

    pub fn state(&self) -> PatchState {
        self.state
    }

    /// Move to a terminal state. Settling twice keeps the first outcome.
    pub fn settle(&mut self, committed: bool) -> PatchState {
        if self.state == PatchState::Pending {
            self.state = if committed {
                PatchState::Committed
            } else {
                PatchState::RolledBack
            };
        } else {
            debug!(state = ?self.state, "Patch already settled");
        }
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forest() -> Option<Forest> {
        let mut docs = TreeNode::new(NodeId::from("docs"), "Docs", true);
        docs.items
            .push(TreeNode::new(NodeId::from("readme"), "readme.txt", false));
        Some(vec![docs])
    }

    #[test]
    fn create_under_folder_adds_shell() {
        let mut f = forest();
        let patch = OptimisticPatch::create(PatchParent::Node(NodeId::from("docs")), "new", true);
        assert!(patch.apply(&mut f));
        let docs = &f.unwrap()[0];
        assert_eq!(docs.items.len(), 2);
        assert!(docs.items[1].id.is_temporary());
        assert!(docs.items[1].items.is_empty());
    }

    #[test]
    fn create_root_on_empty_forest() {
        let mut f = None;
        assert!(OptimisticPatch::create(PatchParent::Root, "Docs", true).apply(&mut f));
        assert_eq!(f.unwrap().len(), 1);
    }

    #[test]
    fn patches_against_missing_targets_do_nothing() {
        let mut f = forest();
        let before = f.clone();
        let ghost = NodeId::from("ghost");
        assert!(!OptimisticPatch::Delete { id: ghost.clone() }.apply(&mut f));
        assert!(!OptimisticPatch::Rename {
            id: ghost.clone(),
            name: "x".to_string()
        }
        .apply(&mut f));
        assert!(!OptimisticPatch::create(PatchParent::Node(ghost), "x", false).apply(&mut f));
        assert_eq!(f, before);

        let mut empty = None;
        assert!(!OptimisticPatch::Delete {
            id: NodeId::from("docs")
        }
        .apply(&mut empty));
    }

    #[test]
    fn settle_is_terminal() {
        let mut pending = PendingPatch::new(OptimisticPatch::Delete {
            id: NodeId::from("x"),
        });
        assert_eq!(pending.state(), PatchState::Pending);
        assert_eq!(pending.settle(false), PatchState::RolledBack);
        assert_eq!(pending.settle(true), PatchState::RolledBack);
    }
}
