//! Text rendering for the CLI: tree outlines and node tables.

use crate::tree::TreeNode;
use crate::types::NodeId;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

/// One row of the flattened forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRow {
    pub id: NodeId,
    pub name: String,
    pub is_folder: bool,
    pub parent_id: Option<NodeId>,
    pub depth: usize,
}

/// Pre-order flattening with parent and depth.
pub fn flatten(forest: &[TreeNode]) -> Vec<NodeRow> {
    let mut rows = Vec::new();
    let mut stack: Vec<(&TreeNode, Option<&NodeId>, usize)> =
        forest.iter().rev().map(|root| (root, None, 0)).collect();
    while let Some((node, parent, depth)) = stack.pop() {
        rows.push(NodeRow {
            id: node.id.clone(),
            name: node.name.clone(),
            is_folder: node.is_folder,
            parent_id: parent.cloned(),
            depth,
        });
        stack.extend(
            node.items
                .iter()
                .rev()
                .map(|child| (child, Some(&node.id), depth + 1)),
        );
    }
    rows
}

fn label(node: &TreeNode, color: bool) -> String {
    let id = format!("[{}]", node.id);
    match (node.is_folder, color) {
        (true, true) => format!("{} {}", format!("{}/", node.name).blue().bold(), id.dimmed()),
        (true, false) => format!("{}/ {}", node.name, id),
        (false, true) => format!("{} {}", node.name, id.dimmed()),
        (false, false) => format!("{} {}", node.name, id),
    }
}

/// Box-drawing outline of the forest, one root after another.
pub fn format_forest_text(forest: Option<&[TreeNode]>, color: bool) -> String {
    let forest = match forest {
        Some(forest) if !forest.is_empty() => forest,
        _ => return "No nodes. Create one with `grove create-root <name>`.".to_string(),
    };

    let mut lines = Vec::new();
    for root in forest {
        lines.push(label(root, color));
        let mut stack: Vec<(&TreeNode, String, bool)> = Vec::new();
        push_children(&mut stack, root, "");
        while let Some((node, prefix, last)) = stack.pop() {
            let branch = if last { "└── " } else { "├── " };
            lines.push(format!("{}{}{}", prefix, branch, label(node, color)));
            let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
            push_children(&mut stack, node, &child_prefix);
        }
    }
    lines.join("\n")
}

fn push_children<'a>(stack: &mut Vec<(&'a TreeNode, String, bool)>, node: &'a TreeNode, prefix: &str) {
    let count = node.items.len();
    for (index, child) in node.items.iter().enumerate().rev() {
        stack.push((child, prefix.to_string(), index + 1 == count));
    }
}

pub fn format_node_table(forest: &[TreeNode]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["ID", "Name", "Kind", "Parent", "Depth"]);
    for row in flatten(forest) {
        table.add_row(vec![
            row.id.to_string(),
            row.name,
            if row.is_folder { "folder" } else { "file" }.to_string(),
            row.parent_id
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string()),
            row.depth.to_string(),
        ]);
    }
    table.to_string()
}
