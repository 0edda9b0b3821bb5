use generational_arena::{Arena, Index};
use tracing::{instrument, warn};

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug, Clone)]
pub struct TreeNode<T> {
    /// Caller payload, never inspected by the layout engine
    pub data: T,
    /// Index of parent node in the arena, None for root nodes
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in left-to-right order
    pub children: Vec<Index>,
}

/// Arena-based ordered tree.
///
/// Uses generational arena for memory-safe node references and O(1) lookups.
/// Parents are non-owning handles, so the structure has no reference cycles;
/// the arena owns every node.
#[derive(Debug, Clone)]
pub struct TreeArena<T> {
    /// Arena storage for all tree nodes
    arena: Arena<TreeNode<T>>,
    /// Index of the root node, None for empty trees
    root: Option<Index>,
}

impl<T> Default for TreeArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TreeArena<T> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Inserts `data` as the last child of `parent`, or as the root when
    /// `parent` is `None`.
    #[instrument(level = "trace", skip(self, data))]
    pub fn insert_node(&mut self, data: T, parent: Option<Index>) -> Index {
        let node = TreeNode {
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            } else {
                warn!(?parent_idx, "parent not in arena, node left detached");
            }
        } else {
            self.root = Some(node_idx);
        }

        node_idx
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_node(&self, idx: Index) -> Option<&TreeNode<T>> {
        self.arena.get(idx)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut TreeNode<T>> {
        self.arena.get_mut(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order traversal from the root.
    pub fn iter(&self) -> TreeIterator<'_, T> {
        TreeIterator::new(self, self.root)
    }

    /// Pre-order traversal of the subtree rooted at `start`.
    pub fn iter_from(&self, start: Index) -> TreeIterator<'_, T> {
        TreeIterator::new(self, Some(start))
    }

    /// Post-order traversal from the root, children left to right.
    pub fn iter_postorder(&self) -> PostOrderIterator<'_, T> {
        PostOrderIterator::new(self, self.root)
    }

    /// Post-order traversal of the subtree rooted at `start`.
    pub fn iter_postorder_from(&self, start: Index) -> PostOrderIterator<'_, T> {
        PostOrderIterator::new(self, Some(start))
    }

    /// Number of levels in the tree; an empty tree has depth 0.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack: Vec<(Index, usize)> = self.root.map(|r| (r, 1)).into_iter().collect();

        while let Some((idx, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Some(node) = self.get_node(idx) {
                stack.extend(node.children.iter().map(|&child| (child, depth + 1)));
            }
        }

        max_depth
    }

    /// Collects all leaf nodes (nodes with no children) in left-to-right order.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_nodes(&self) -> Vec<Index> {
        self.iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn is_leaf(&self, idx: Index) -> bool {
        self.get_node(idx)
            .map(|node| node.children.is_empty())
            .unwrap_or(true)
    }

    /// Position of `idx` within its parent's children, None for roots.
    pub fn sibling_position(&self, idx: Index) -> Option<usize> {
        let parent = self.get_node(idx)?.parent?;
        self.get_node(parent)?
            .children
            .iter()
            .position(|&child| child == idx)
    }

    pub fn is_leftmost(&self, idx: Index) -> bool {
        self.sibling_position(idx).map_or(true, |pos| pos == 0)
    }

    pub fn is_rightmost(&self, idx: Index) -> bool {
        match self.siblings(idx) {
            Some(siblings) => siblings.last() == Some(&idx),
            None => true,
        }
    }

    pub fn leftmost_child(&self, idx: Index) -> Option<Index> {
        self.get_node(idx)?.children.first().copied()
    }

    pub fn rightmost_child(&self, idx: Index) -> Option<Index> {
        self.get_node(idx)?.children.last().copied()
    }

    pub fn left_sibling(&self, idx: Index) -> Option<Index> {
        let pos = self.sibling_position(idx)?;
        let siblings = self.siblings(idx)?;
        pos.checked_sub(1).map(|left| siblings[left])
    }

    pub fn right_sibling(&self, idx: Index) -> Option<Index> {
        let pos = self.sibling_position(idx)?;
        self.siblings(idx)?.get(pos + 1).copied()
    }

    /// First child of `idx`'s parent; the node itself when it is leftmost.
    pub fn leftmost_sibling(&self, idx: Index) -> Option<Index> {
        self.siblings(idx)?.first().copied()
    }

    /// The ordered children of `idx`'s parent, None for roots.
    pub fn siblings(&self, idx: Index) -> Option<&[Index]> {
        let parent = self.get_node(idx)?.parent?;
        Some(self.get_node(parent)?.children.as_slice())
    }
}

pub struct TreeIterator<'a, T> {
    arena: &'a TreeArena<T>,
    stack: Vec<Index>,
}

impl<'a, T> TreeIterator<'a, T> {
    fn new(arena: &'a TreeArena<T>, start: Option<Index>) -> Self {
        Self {
            arena,
            stack: start.into_iter().collect(),
        }
    }
}

impl<'a, T> Iterator for TreeIterator<'a, T> {
    type Item = (Index, &'a TreeNode<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a, T> {
    arena: &'a TreeArena<T>,
    stack: Vec<(Index, bool)>,
}

impl<'a, T> PostOrderIterator<'a, T> {
    fn new(arena: &'a TreeArena<T>, start: Option<Index>) -> Self {
        Self {
            arena,
            stack: start.map(|idx| (idx, false)).into_iter().collect(),
        }
    }
}

impl<'a, T> Iterator for PostOrderIterator<'a, T> {
    type Item = (Index, &'a TreeNode<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    //      root
    //     /    \
    //    a      b
    //   / \
    //  a1  a2
    fn sample() -> (TreeArena<&'static str>, [Index; 5]) {
        let mut tree = TreeArena::new();
        let root = tree.insert_node("root", None);
        let a = tree.insert_node("a", Some(root));
        let b = tree.insert_node("b", Some(root));
        let a1 = tree.insert_node("a1", Some(a));
        let a2 = tree.insert_node("a2", Some(a));
        (tree, [root, a, b, a1, a2])
    }

    #[test]
    fn test_preorder_is_left_to_right() {
        let (tree, _) = sample();
        let labels: Vec<_> = tree.iter().map(|(_, n)| n.data).collect();
        assert_eq!(labels, vec!["root", "a", "a1", "a2", "b"]);
    }

    #[test]
    fn test_postorder_visits_children_first() {
        let (tree, _) = sample();
        let labels: Vec<_> = tree.iter_postorder().map(|(_, n)| n.data).collect();
        assert_eq!(labels, vec!["a1", "a2", "a", "b", "root"]);
    }

    #[test]
    fn test_depth_and_leaves() {
        let (tree, [_, _, b, a1, a2]) = sample();
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.leaf_nodes(), vec![a1, a2, b]);
        assert_eq!(TreeArena::<u8>::new().depth(), 0);
    }

    #[test]
    fn test_sibling_navigation() {
        let (tree, [root, a, b, a1, a2]) = sample();
        assert!(tree.is_leftmost(root));
        assert!(tree.is_rightmost(root));
        assert!(tree.is_leftmost(a));
        assert!(!tree.is_leftmost(b));
        assert!(tree.is_rightmost(b));
        assert_eq!(tree.left_sibling(b), Some(a));
        assert_eq!(tree.left_sibling(a), None);
        assert_eq!(tree.right_sibling(a1), Some(a2));
        assert_eq!(tree.right_sibling(a2), None);
        assert_eq!(tree.leftmost_sibling(a2), Some(a1));
        assert_eq!(tree.leftmost_sibling(root), None);
        assert_eq!(tree.leftmost_child(a), Some(a1));
        assert_eq!(tree.rightmost_child(a), Some(a2));
        assert_eq!(tree.rightmost_child(b), None);
        assert_eq!(tree.sibling_position(a2), Some(1));
        assert!(tree.is_leaf(b));
        assert!(!tree.is_leaf(a));
    }

    #[test]
    fn test_iter_from_subtree() {
        let (tree, [_, a, ..]) = sample();
        let labels: Vec<_> = tree.iter_from(a).map(|(_, n)| n.data).collect();
        assert_eq!(labels, vec!["a", "a1", "a2"]);
        let post: Vec<_> = tree.iter_postorder_from(a).map(|(_, n)| n.data).collect();
        assert_eq!(post, vec!["a1", "a2", "a"]);
    }
}
