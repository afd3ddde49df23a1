//! Expand/collapse, selection and inline input buffers for a tree view.
//!
//! `ViewState` is a plain container changed only through [`ViewState::apply`].
//! An id missing from any map reads as the default: collapsed, no input shown,
//! empty buffer.

use crate::tree::edit;
use crate::tree::TreeNode;
use crate::types::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Inline "add item" input under a folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddInput {
    pub visible: bool,
    /// `None` until the user picks file or folder
    pub is_folder: Option<bool>,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameInput {
    pub visible: bool,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
    Toggle(NodeId),
    SetExpanded { id: NodeId, expanded: bool },
    SetExpandedMany { ids: Vec<NodeId>, expanded: bool },
    SetSelected(Option<NodeId>),
    SetSelectedRoot(Option<NodeId>),
    /// Show or hide the add input; always starts with an empty buffer
    SetAddInput {
        id: NodeId,
        visible: bool,
        is_folder: Option<bool>,
    },
    UpdateAddValue { id: NodeId, value: String },
    SetRenameInput {
        id: NodeId,
        visible: bool,
        value: String,
    },
    /// Ignored unless a rename input was opened for `id`
    UpdateRenameValue { id: NodeId, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    expanded: HashMap<NodeId, bool>,
    add_inputs: HashMap<NodeId, AddInput>,
    rename_inputs: HashMap<NodeId, RenameInput>,
    selected: Option<NodeId>,
    selected_root: Option<NodeId>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, action: ViewAction) {
        match action {
            ViewAction::Toggle(id) => {
                let entry = self.expanded.entry(id).or_insert(false);
                *entry = !*entry;
            }
            ViewAction::SetExpanded { id, expanded } => {
                self.expanded.insert(id, expanded);
            }
            ViewAction::SetExpandedMany { ids, expanded } => {
                self.expanded
                    .extend(ids.into_iter().map(|id| (id, expanded)));
            }
            ViewAction::SetSelected(id) => self.selected = id,
            ViewAction::SetSelectedRoot(id) => self.selected_root = id,
            ViewAction::SetAddInput {
                id,
                visible,
                is_folder,
            } => {
                self.add_inputs.insert(
                    id,
                    AddInput {
                        visible,
                        is_folder,
                        value: String::new(),
                    },
                );
            }
            ViewAction::UpdateAddValue { id, value } => {
                if let Some(input) = self.add_inputs.get_mut(&id) {
                    input.value = value;
                }
            }
            ViewAction::SetRenameInput { id, visible, value } => {
                self.rename_inputs
                    .insert(id, RenameInput { visible, value });
            }
            ViewAction::UpdateRenameValue { id, value } => {
                if let Some(input) = self.rename_inputs.get_mut(&id) {
                    input.value = value;
                }
            }
        }
    }

    /// Consuming form of [`ViewState::apply`].
    pub fn reduce(mut self, action: ViewAction) -> Self {
        self.apply(action);
        self
    }

    pub fn is_expanded(&self, id: &NodeId) -> bool {
        self.expanded.get(id).copied().unwrap_or(false)
    }

    pub fn add_input(&self, id: &NodeId) -> AddInput {
        self.add_inputs.get(id).cloned().unwrap_or_default()
    }

    pub fn rename_input(&self, id: &NodeId) -> RenameInput {
        self.rename_inputs.get(id).cloned().unwrap_or_default()
    }

    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    pub fn selected_root(&self) -> Option<&NodeId> {
        self.selected_root.as_ref()
    }

    /// Roots to render: the selected root when it still exists, otherwise
    /// the first folder root.
    pub fn visible_roots<'a>(&self, forest: &'a [TreeNode]) -> Vec<&'a TreeNode> {
        let chosen = self
            .selected_root
            .as_ref()
            .and_then(|id| forest.iter().find(|root| &root.id == id));
        chosen
            .or_else(|| forest.iter().find(|root| root.is_folder))
            .into_iter()
            .collect()
    }

    /// Expand every folder in `forest`.
    pub fn expand_all(&mut self, forest: &[TreeNode]) {
        self.apply(ViewAction::SetExpandedMany {
            ids: folder_ids(forest),
            expanded: true,
        });
    }

    pub fn collapse_all(&mut self, forest: &[TreeNode]) {
        self.apply(ViewAction::SetExpandedMany {
            ids: folder_ids(forest),
            expanded: false,
        });
    }
}

/// Ids of every folder in `forest`, parents before children.
pub fn folder_ids(forest: &[TreeNode]) -> Vec<NodeId> {
    edit::folder_ids(forest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> NodeId {
        NodeId::from(s)
    }

    fn forest() -> Vec<TreeNode> {
        let mut docs = TreeNode::new(id("docs"), "Docs", true);
        let mut sub = TreeNode::new(id("sub"), "Sub", true);
        sub.items.push(TreeNode::new(id("file"), "file.txt", false));
        docs.items.push(sub);
        vec![docs, TreeNode::new(id("music"), "Music", true)]
    }

    #[test]
    fn absent_entries_read_as_defaults() {
        let view = ViewState::new();
        assert!(!view.is_expanded(&id("x")));
        assert_eq!(view.add_input(&id("x")), AddInput::default());
        assert_eq!(view.rename_input(&id("x")), RenameInput::default());
        assert!(view.selected().is_none());
    }

    #[test]
    fn toggle_flips_expansion() {
        let mut view = ViewState::new();
        view.apply(ViewAction::Toggle(id("docs")));
        assert!(view.is_expanded(&id("docs")));
        view.apply(ViewAction::Toggle(id("docs")));
        assert!(!view.is_expanded(&id("docs")));
    }

    #[test]
    fn expand_and_collapse_all() {
        let forest = forest();
        let mut view = ViewState::new();
        view.expand_all(&forest);
        assert!(view.is_expanded(&id("docs")));
        assert!(view.is_expanded(&id("sub")));
        assert!(!view.is_expanded(&id("file")));

        view.collapse_all(&forest);
        assert!(!view.is_expanded(&id("sub")));
        assert_eq!(folder_ids(&forest), vec![id("docs"), id("sub"), id("music")]);
    }

    #[test]
    fn rename_value_needs_open_input() {
        let mut view = ViewState::new();
        view.apply(ViewAction::UpdateRenameValue {
            id: id("docs"),
            value: "ignored".to_string(),
        });
        assert_eq!(view.rename_input(&id("docs")), RenameInput::default());

        view.apply(ViewAction::SetRenameInput {
            id: id("docs"),
            visible: true,
            value: "Docs".to_string(),
        });
        view.apply(ViewAction::UpdateRenameValue {
            id: id("docs"),
            value: "Documents".to_string(),
        });
        assert_eq!(view.rename_input(&id("docs")).value, "Documents");
    }

    #[test]
    fn add_input_resets_buffer() {
        let view = ViewState::new()
            .reduce(ViewAction::SetAddInput {
                id: id("docs"),
                visible: true,
                is_folder: Some(false),
            })
            .reduce(ViewAction::UpdateAddValue {
                id: id("docs"),
                value: "notes.md".to_string(),
            });
        assert_eq!(view.add_input(&id("docs")).value, "notes.md");

        let view = view.reduce(ViewAction::SetAddInput {
            id: id("docs"),
            visible: false,
            is_folder: None,
        });
        assert_eq!(view.add_input(&id("docs")), AddInput::default());
    }

    #[test]
    fn visible_roots_prefers_selection() {
        let forest = forest();
        let mut view = ViewState::new();
        assert_eq!(view.visible_roots(&forest)[0].id, id("docs"));

        view.apply(ViewAction::SetSelectedRoot(Some(id("music"))));
        let roots = view.visible_roots(&forest);
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].id, id("music"));

        view.apply(ViewAction::SetSelectedRoot(Some(id("gone"))));
        assert_eq!(view.visible_roots(&forest)[0].id, id("docs"));
        assert!(view.visible_roots(&[]).is_empty());
    }

    #[test]
    fn default_root_skips_file_roots() {
        let stray = TreeNode::new(id("stray"), "stray.txt", false);
        let mut forest = forest();
        forest.insert(0, stray.clone());
        let view = ViewState::new();
        assert_eq!(view.visible_roots(&forest)[0].id, id("docs"));
        assert!(view.visible_roots(&[stray]).is_empty());
    }
}
