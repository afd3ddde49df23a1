//! Flat record set -> nested forest.
//!
//! Both builders assemble bottom-up from an explicit pre-order list, so depth
//! never touches the call stack and every node is visited once.

use super::node::{Forest, TreeNode};
use crate::store::Node;
use crate::types::NodeId;
use std::collections::{HashMap, HashSet};

/// Build the forest for `nodes`.
///
/// Returns `None` for an empty input. Roots keep their relative input order,
/// as do siblings. A `parent_id` that does not resolve within `nodes` makes
/// the node a root. Records caught in a parent cycle are unreachable from any
/// root and are left out. O(n) time and space.
pub fn build_forest(nodes: &[Node]) -> Option<Forest> {
    if nodes.is_empty() {
        return None;
    }

    let index: HashMap<&NodeId, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (&node.id, i))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut roots = Vec::new();
    for (i, node) in nodes.iter().enumerate() {
        match node.parent_id.as_ref().and_then(|parent| index.get(parent)) {
            Some(&parent) if parent != i => children[parent].push(i),
            _ => roots.push(i),
        }
    }

    let mut shells: Vec<Option<TreeNode>> =
        nodes.iter().map(|n| Some(TreeNode::shell(n))).collect();

    let mut order = Vec::with_capacity(nodes.len());
    let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
    while let Some(i) = stack.pop() {
        order.push(i);
        stack.extend(children[i].iter().rev());
    }

    // Reverse pre-order: every child is complete before its parent takes it.
    for &i in order.iter().rev() {
        let items: Vec<TreeNode> = children[i]
            .iter()
            .filter_map(|&child| shells[child].take())
            .collect();
        if let Some(shell) = shells[i].as_mut() {
            shell.items = items;
        }
    }

    Some(roots.iter().filter_map(|&r| shells[r].take()).collect())
}

/// Build the subtree under `root`, pulling each level from `children_of`.
///
/// `children_of` must return children in sibling order. A node id seen twice
/// is skipped, so a corrupt parent chain cannot loop forever.
pub fn build_subtree<F, E>(root: Node, mut children_of: F) -> Result<TreeNode, E>
where
    F: FnMut(&NodeId) -> Result<Vec<Node>, E>,
{
    let mut tree = TreeNode::shell(&root);
    // slot 0 is the root itself; `tree` holds it
    let mut shells: Vec<Option<TreeNode>> = vec![None];
    let mut child_slots: Vec<Vec<usize>> = vec![Vec::new()];
    let mut seen: HashSet<NodeId> = HashSet::from([root.id.clone()]);

    let mut order = Vec::new();
    let mut stack = vec![(0usize, root.id)];
    while let Some((slot, id)) = stack.pop() {
        order.push(slot);
        let mut pushed = Vec::new();
        for child in children_of(&id)? {
            if !seen.insert(child.id.clone()) {
                continue;
            }
            let child_slot = shells.len();
            shells.push(Some(TreeNode::shell(&child)));
            child_slots.push(Vec::new());
            child_slots[slot].push(child_slot);
            pushed.push((child_slot, child.id));
        }
        stack.extend(pushed.into_iter().rev());
    }

    for &slot in order.iter().rev().filter(|&&slot| slot != 0) {
        let items: Vec<TreeNode> = child_slots[slot]
            .iter()
            .filter_map(|&child| shells[child].take())
            .collect();
        if let Some(shell) = shells[slot].as_mut() {
            shell.items = items;
        }
    }

    tree.items = child_slots[0]
        .iter()
        .filter_map(|&child| shells[child].take())
        .collect();
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;
    use std::convert::Infallible;

    fn node(id: &str, name: &str, is_folder: bool, parent: Option<&str>, tick: i64) -> Node {
        Node {
            id: NodeId::from(id),
            name: name.to_string(),
            is_folder,
            parent_id: parent.map(NodeId::from),
            content: None,
            created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(tick),
        }
    }

    fn ids(forest: &[TreeNode]) -> Vec<&str> {
        forest.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn empty_input_yields_none() {
        assert_eq!(build_forest(&[]), None);
    }

    #[test]
    fn nests_children_under_parents() {
        let nodes = vec![
            node("docs", "Docs", true, None, 0),
            node("readme", "readme.txt", false, Some("docs"), 1),
            node("sub", "Sub", true, Some("docs"), 2),
            node("file", "file.txt", false, Some("sub"), 3),
        ];
        let forest = build_forest(&nodes).unwrap();
        assert_eq!(ids(&forest), vec!["docs"]);
        assert_eq!(ids(&forest[0].items), vec!["readme", "sub"]);
        assert_eq!(ids(&forest[0].items[1].items), vec!["file"]);
        assert!(forest[0].items[0].items.is_empty());
    }

    #[test]
    fn supports_multiple_roots_in_input_order() {
        let nodes = vec![
            node("b", "B", true, None, 0),
            node("a", "A", true, None, 1),
            node("c", "C", true, None, 2),
        ];
        assert_eq!(ids(&build_forest(&nodes).unwrap()), vec!["b", "a", "c"]);
    }

    #[test]
    fn child_listed_before_parent_still_nests() {
        let nodes = vec![
            node("child", "child", false, Some("root"), 1),
            node("root", "root", true, None, 0),
        ];
        let forest = build_forest(&nodes).unwrap();
        assert_eq!(ids(&forest), vec!["root"]);
        assert_eq!(ids(&forest[0].items), vec!["child"]);
    }

    #[test]
    fn dangling_parent_becomes_root() {
        let nodes = vec![
            node("root", "root", true, None, 0),
            node("orphan", "orphan", false, Some("gone"), 1),
        ];
        let forest = build_forest(&nodes).unwrap();
        assert_eq!(ids(&forest), vec!["root", "orphan"]);
    }

    #[test]
    fn self_parent_is_treated_as_root() {
        let nodes = vec![node("loop", "loop", true, Some("loop"), 0)];
        assert_eq!(ids(&build_forest(&nodes).unwrap()), vec!["loop"]);
    }

    #[test]
    fn parent_cycle_terminates() {
        let nodes = vec![
            node("root", "root", true, None, 0),
            node("a", "a", true, Some("b"), 1),
            node("b", "b", true, Some("a"), 2),
        ];
        let forest = build_forest(&nodes).unwrap();
        assert_eq!(ids(&forest), vec!["root"]);
    }

    #[test]
    fn subtree_walks_children_in_order() {
        let nodes = vec![
            node("docs", "Docs", true, None, 0),
            node("sub", "Sub", true, Some("docs"), 1),
            node("readme", "readme.txt", false, Some("docs"), 2),
            node("file", "file.txt", false, Some("sub"), 3),
        ];
        let lookup = |id: &NodeId| -> Result<Vec<Node>, Infallible> {
            Ok(nodes
                .iter()
                .filter(|n| n.parent_id.as_ref() == Some(id))
                .cloned()
                .collect())
        };
        let tree = build_subtree(nodes[0].clone(), lookup).unwrap();
        assert_eq!(ids(&tree.items), vec!["sub", "readme"]);
        assert_eq!(ids(&tree.items[0].items), vec!["file"]);
        assert_eq!(tree, build_forest(&nodes).unwrap()[0]);
    }

    #[test]
    fn subtree_skips_repeated_ids() {
        let root = node("r", "r", true, None, 0);
        let looping = node("r", "r", true, Some("r"), 1);
        let tree = build_subtree(root, |_| Ok::<_, Infallible>(vec![looping.clone()])).unwrap();
        assert!(tree.items.is_empty());
    }

    #[test]
    fn subtree_propagates_lookup_errors() {
        let root = node("r", "r", true, None, 0);
        let result = build_subtree(root, |_| Err::<Vec<Node>, _>("store down"));
        assert_eq!(result.unwrap_err(), "store down");
    }

    /// Acyclic node sets: each parent is an earlier node, absent, or dangling.
    fn node_sets() -> impl Strategy<Value = Vec<Node>> {
        prop::collection::vec(
            (0u8..4, any::<prop::sample::Index>(), any::<bool>()),
            0..48,
        )
        .prop_map(|specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (kind, parent, is_folder))| {
                    let parent_id = match kind {
                        0 => None,
                        1 => Some(format!("missing-{}", i)),
                        _ if i == 0 => None,
                        _ => Some(format!("n{}", parent.index(i))),
                    };
                    node(
                        &format!("n{}", i),
                        &format!("name{}", i),
                        is_folder,
                        parent_id.as_deref(),
                        i as i64,
                    )
                })
                .collect()
        })
    }

    fn flatten(forest: &[TreeNode]) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<&TreeNode> = forest.iter().rev().collect();
        while let Some(n) = stack.pop() {
            out.push(n.id.clone());
            stack.extend(n.items.iter().rev());
        }
        out
    }

    proptest! {
        #[test]
        fn building_is_idempotent(nodes in node_sets()) {
            prop_assert_eq!(build_forest(&nodes), build_forest(&nodes));
        }

        #[test]
        fn top_level_is_exactly_the_unparented(nodes in node_sets()) {
            let known: HashSet<&NodeId> = nodes.iter().map(|n| &n.id).collect();
            let expected: Vec<NodeId> = nodes
                .iter()
                .filter(|n| n.parent_id.as_ref().map_or(true, |p| !known.contains(p)))
                .map(|n| n.id.clone())
                .collect();
            let top: Vec<NodeId> = build_forest(&nodes)
                .unwrap_or_default()
                .into_iter()
                .map(|n| n.id)
                .collect();
            prop_assert_eq!(top, expected);
        }

        #[test]
        fn every_node_appears_exactly_once(nodes in node_sets()) {
            let mut seen = flatten(&build_forest(&nodes).unwrap_or_default());
            seen.sort();
            let mut expected: Vec<NodeId> = nodes.iter().map(|n| n.id.clone()).collect();
            expected.sort();
            prop_assert_eq!(seen, expected);
        }
    }
}
