//! Assembly of parent/child lists into nested trees.
//!
//! Used for threaded comments on both the server and the client. The input
//! is a flat list in display order (oldest first); every node whose parent
//! appears earlier in the list is attached to that parent, every other node
//! becomes a root. Sibling order follows input order.

use std::collections::HashMap;
use std::hash::Hash;

/// A node that can be nested under a parent of the same type.
pub trait TreeNode: Sized {
    /// Identifier type.
    type Id: Eq + Hash + Copy;

    /// This node's identifier.
    fn node_id(&self) -> Self::Id;

    /// The parent identifier, if any.
    fn parent_id(&self) -> Option<Self::Id>;

    /// Mutable access to the children collection.
    fn children_mut(&mut self) -> &mut Vec<Self>;
}

/// Build a forest from a flat, ordered list.
pub fn build_tree<T: TreeNode>(flat: Vec<T>) -> Vec<T> {
    let positions: HashMap<T::Id, usize> = flat
        .iter()
        .enumerate()
        .map(|(i, node)| (node.node_id(), i))
        .collect();

    let parents: Vec<Option<usize>> = flat
        .iter()
        .enumerate()
        .map(|(i, node)| {
            node.parent_id()
                .and_then(|pid| positions.get(&pid).copied())
                .filter(|&p| p < i)
        })
        .collect();

    let mut pending: Vec<Vec<T>> = flat.iter().map(|_| Vec::new()).collect();
    let mut roots = Vec::new();

    // Children always sit after their parent, so walking backwards finishes
    // every subtree before its parent is moved.
    for (i, mut node) in flat.into_iter().enumerate().rev() {
        let mut children = std::mem::take(&mut pending[i]);
        children.reverse();
        node.children_mut().extend(children);

        match parents[i] {
            Some(p) => pending[p].push(node),
            None => roots.push(node),
        }
    }

    roots.reverse();
    roots
}

/// Count a node and all of its descendants.
pub fn subtree_size<T: TreeNode>(node: &mut T) -> usize {
    1 + node
        .children_mut()
        .iter_mut()
        .map(subtree_size)
        .sum::<usize>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Node {
        id: u32,
        parent: Option<u32>,
        children: Vec<Node>,
    }

    fn node(id: u32, parent: Option<u32>) -> Node {
        Node {
            id,
            parent,
            children: Vec::new(),
        }
    }

    impl TreeNode for Node {
        type Id = u32;

        fn node_id(&self) -> u32 {
            self.id
        }

        fn parent_id(&self) -> Option<u32> {
            self.parent
        }

        fn children_mut(&mut self) -> &mut Vec<Self> {
            &mut self.children
        }
    }

    #[test]
    fn test_nested_replies_keep_order() {
        let flat = vec![
            node(1, None),
            node(2, Some(1)),
            node(3, None),
            node(4, Some(2)),
            node(5, Some(1)),
        ];
        let roots = build_tree(flat);
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].id, 1);
        assert_eq!(roots[1].id, 3);
        let child_ids: Vec<u32> = roots[0].children.iter().map(|c| c.id).collect();
        assert_eq!(child_ids, vec![2, 5]);
        assert_eq!(roots[0].children[0].children[0].id, 4);
    }

    #[test]
    fn test_missing_parent_becomes_root() {
        let roots = build_tree(vec![node(7, Some(99)), node(8, None)]);
        let ids: Vec<u32> = roots.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![7, 8]);
    }

    #[test]
    fn test_parent_listed_later_is_treated_as_root() {
        let roots = build_tree(vec![node(2, Some(1)), node(1, Some(2))]);
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].id, 2);
        assert_eq!(roots[0].children[0].id, 1);
    }

    #[test]
    fn test_subtree_size_counts_descendants() {
        let mut roots = build_tree(vec![
            node(1, None),
            node(2, Some(1)),
            node(3, Some(2)),
            node(4, None),
        ]);
        assert_eq!(subtree_size(&mut roots[0]), 3);
        assert_eq!(subtree_size(&mut roots[1]), 1);
    }

    #[test]
    fn test_empty_input() {
        let roots: Vec<Node> = build_tree(Vec::new());
        assert!(roots.is_empty());
    }
}
