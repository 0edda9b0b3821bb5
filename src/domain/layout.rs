//! Tidy tree layout (Reingold-Tilford style).
//!
//! The engine runs four passes over a [`TreeArena`]:
//!
//! 1. **Initialize** (pre-order): seed every node with `x = -1`, its depth
//!    and a zero modifier; reject cycles and inconsistent parent links.
//! 2. **Initial x** (post-order): place leaves next to their left sibling,
//!    center parents over their children, and push subtrees right until
//!    they clear every earlier sibling subtree.
//! 3. **Finalize x**: bake accumulated modifiers into x top-down, then move
//!    the whole tree right if any node went negative. Shifting final
//!    positions keeps the leftmost node at exactly 0.
//! 4. **Extents**: fold subtree width and height bottom-up.
//!
//! Layout state lives in a side table keyed by node handle, so the domain
//! tree is only ever borrowed immutably. All passes use explicit stacks.

use std::collections::{HashMap, HashSet};

use generational_arena::Index;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::domain::arena::{TreeArena, TreeNode};
use crate::domain::contour::{trace_contour, Contour, Side};
use crate::domain::error::{DomainError, LayoutResult};

/// Tolerance for float comparisons between positions.
const EPSILON: f64 = 1e-9;

/// Spacing constants, fixed for one layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Minimum width reserved per node
    pub node_size: f64,
    /// Extra gap between adjacent siblings on the same level
    pub sibling_distance: f64,
    /// Extra gap between neighbouring subtrees on deeper levels
    pub tree_distance: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_size: 1.0,
            sibling_distance: 0.0,
            tree_distance: 0.0,
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> LayoutResult<()> {
        let fields = [
            ("node_size", self.node_size),
            ("sibling_distance", self.sibling_distance),
            ("tree_distance", self.tree_distance),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(DomainError::InvalidConfig(format!(
                "{name} must be finite, got {value}"
            )));
        }
        if self.node_size <= 0.0 {
            return Err(DomainError::InvalidConfig(format!(
                "node_size must be positive, got {}",
                self.node_size
            )));
        }
        if let Some((name, value)) = fields[1..].iter().find(|(_, v)| *v < 0.0) {
            return Err(DomainError::InvalidConfig(format!(
                "{name} must not be negative, got {value}"
            )));
        }
        Ok(())
    }

    /// Distance between adjacent siblings on their own level.
    fn sibling_step(&self) -> f64 {
        self.node_size + self.sibling_distance
    }

    /// Clearance between neighbouring subtrees on deeper levels.
    fn min_distance(&self) -> f64 {
        self.tree_distance + self.node_size
    }
}

/// Final position and subtree extent of one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeLayout {
    /// Horizontal position, always >= 0
    pub x: f64,
    /// Depth from the layout root
    pub y: usize,
    /// Largest x anywhere in this node's subtree
    pub width: f64,
    /// Largest depth anywhere in this node's subtree
    pub height: usize,
}

/// Positions computed for every node reachable from a root.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    root: Index,
    nodes: HashMap<Index, NodeLayout>,
}

impl Layout {
    pub fn root(&self) -> Index {
        self.root
    }

    pub fn get(&self, idx: Index) -> Option<&NodeLayout> {
        self.nodes.get(&idx)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Index, &NodeLayout)> + '_ {
        self.nodes.iter().map(|(&idx, layout)| (idx, layout))
    }

    /// Largest x in the whole tree.
    pub fn width(&self) -> f64 {
        self.get(self.root).map_or(0.0, |root| root.width)
    }

    /// Deepest level in the whole tree.
    pub fn height(&self) -> usize {
        self.get(self.root).map_or(0, |root| root.height)
    }

    /// Contour of the laid-out subtree below `start`, in final coordinates.
    pub fn contour<T>(&self, tree: &TreeArena<T>, start: Index, side: Side) -> Contour {
        trace_contour(tree, start, side, |idx| {
            self.get(idx).map(|node| (node.y, node.x, 0.0))
        })
    }
}

/// Computes tidy tree layouts.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> LayoutResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lays out the whole tree starting at the arena's root.
    pub fn layout<T>(&self, tree: &TreeArena<T>) -> LayoutResult<Layout> {
        let root = tree.root().ok_or_else(|| {
            DomainError::InvalidArgument("cannot lay out an empty tree".to_string())
        })?;
        self.compute_positions(tree, root)
    }

    /// Lays out the subtree rooted at `root`.
    ///
    /// `root` is treated as a tree root even if it has a parent, so laying
    /// out a subtree never looks at nodes outside it.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn compute_positions<T>(&self, tree: &TreeArena<T>, root: Index) -> LayoutResult<Layout> {
        if tree.get_node(root).is_none() {
            return Err(DomainError::InvalidArgument(format!(
                "root {root:?} is not a node of this tree"
            )));
        }

        let mut pass = LayoutPass {
            tree,
            config: &self.config,
            root,
            scratch: HashMap::new(),
            preorder: Vec::new(),
        };

        pass.initialize()?;
        pass.assign_initial_x();
        pass.apply_modifiers();
        pass.shift_onto_screen();
        let layout = pass.finalize();

        debug!(
            nodes = layout.len(),
            width = layout.width(),
            height = layout.height(),
            "layout computed"
        );
        Ok(layout)
    }
}

/// Mutable per-node state used while a layout is computed.
#[derive(Debug, Clone, Copy)]
struct Scratch {
    x: f64,
    y: usize,
    modifier: f64,
    width: f64,
    height: usize,
}

struct LayoutPass<'a, T> {
    tree: &'a TreeArena<T>,
    config: &'a LayoutConfig,
    root: Index,
    // every node reachable from root gets an entry in initialize()
    scratch: HashMap<Index, Scratch>,
    preorder: Vec<Index>,
}

impl<'a, T> LayoutPass<'a, T> {
    fn at(&self, idx: Index) -> &Scratch {
        &self.scratch[&idx]
    }

    fn at_mut(&mut self, idx: Index) -> &mut Scratch {
        self.scratch
            .get_mut(&idx)
            .unwrap_or_else(|| unreachable!("node {idx:?} was not initialized"))
    }

    fn node(&self, idx: Index) -> &'a TreeNode<T> {
        let tree: &'a TreeArena<T> = self.tree;
        tree.get_node(idx)
            .unwrap_or_else(|| unreachable!("node {idx:?} was validated in initialize"))
    }

    /// Ordered siblings of `idx` including itself; None for the layout root.
    fn siblings(&self, idx: Index) -> Option<&'a [Index]> {
        if idx == self.root {
            return None;
        }
        let tree: &'a TreeArena<T> = self.tree;
        tree.siblings(idx)
    }

    fn left_sibling(&self, idx: Index) -> Option<Index> {
        let siblings = self.siblings(idx)?;
        let pos = siblings.iter().position(|&s| s == idx)?;
        pos.checked_sub(1).map(|left| siblings[left])
    }

    fn shift(&mut self, idx: Index, offset: f64) {
        let scratch = self.at_mut(idx);
        scratch.x += offset;
        scratch.modifier += offset;
    }

    fn contour(&self, start: Index, side: Side) -> Contour {
        trace_contour(self.tree, start, side, |idx| {
            self.scratch.get(&idx).map(|s| (s.y, s.x, s.modifier))
        })
    }

    fn initialize(&mut self) -> LayoutResult<()> {
        let mut visited = HashSet::new();
        let mut stack: Vec<(Index, Option<Index>, usize)> = vec![(self.root, None, 0)];

        while let Some((idx, listed_under, depth)) = stack.pop() {
            if !visited.insert(idx) {
                return Err(DomainError::MalformedTree(format!(
                    "node {idx:?} is reachable twice (cycle or shared child)"
                )));
            }
            let node = self.tree.get_node(idx).ok_or_else(|| {
                DomainError::MalformedTree(format!("dangling child handle {idx:?}"))
            })?;
            if let Some(parent) = listed_under {
                if node.parent != Some(parent) {
                    return Err(DomainError::MalformedTree(format!(
                        "node {idx:?} is a child of {parent:?} but its parent is {:?}",
                        node.parent
                    )));
                }
            }

            self.scratch.insert(
                idx,
                Scratch {
                    x: -1.0,
                    y: depth,
                    modifier: 0.0,
                    width: 0.0,
                    height: 0,
                },
            );
            self.preorder.push(idx);

            for &child in node.children.iter().rev() {
                stack.push((child, Some(idx), depth + 1));
            }
        }

        debug!(nodes = self.preorder.len(), "initialized");
        Ok(())
    }

    fn assign_initial_x(&mut self) {
        let tree: &'a TreeArena<T> = self.tree;
        for (idx, node) in tree.iter_postorder_from(self.root) {
            self.place(idx, node);
        }
    }

    fn place(&mut self, idx: Index, node: &TreeNode<T>) {
        let left = self.left_sibling(idx);
        let beside_left = left.map(|l| self.at(l).x + self.config.sibling_step());

        let center = match node.children.as_slice() {
            [] => None,
            [only] => Some(self.at(*only).x),
            [first, .., last] => Some((self.at(*first).x + self.at(*last).x) / 2.0),
        };

        let (x, modifier) = match (beside_left, center) {
            (None, None) => (0.0, 0.0),
            (Some(x), None) => (x, 0.0),
            (None, Some(center)) => (center, 0.0),
            (Some(x), Some(center)) => (x, x - center),
        };

        let scratch = self.at_mut(idx);
        scratch.x = x;
        scratch.modifier = modifier;
        trace!(?idx, x, modifier, "initial x");

        if center.is_some() && left.is_some() {
            self.resolve_conflicts(idx);
        }
    }

    /// Pushes the subtree at `idx` right until it clears every earlier
    /// sibling subtree, then spreads the siblings in between.
    fn resolve_conflicts(&mut self, idx: Index) {
        let Some(siblings) = self.siblings(idx) else {
            return;
        };
        let Some(position) = siblings.iter().position(|&s| s == idx) else {
            return;
        };

        let min_distance = self.config.min_distance();
        let below = self.at(idx).y + 1;
        let node_contour = self.contour(idx, Side::Left);
        let earlier: Vec<Contour> = siblings[..position]
            .iter()
            .map(|&sibling| self.contour(sibling, Side::Right))
            .collect();

        let mut shift = 0.0;
        let mut blocking = None;
        for (pos, sibling_contour) in earlier.iter().enumerate() {
            let needed = Contour::required_shift(sibling_contour, &node_contour, below, min_distance);
            if needed - shift > EPSILON {
                shift = needed;
                blocking = Some(pos);
            }
        }

        let Some(blocking) = blocking else {
            return;
        };

        trace!(?idx, shift, blocking, "subtree conflict");
        self.shift(idx, shift);

        if position - blocking > 1 {
            self.center_between(siblings, blocking, position, &earlier);
        }
    }

    /// Spaces `siblings[left + 1..right]` evenly between `siblings[left]`
    /// and `siblings[right]`, keeping the result only if the moved siblings
    /// stay clear of every other sibling up to `right`.
    ///
    /// `earlier` holds the right contours of `siblings[..right]` from
    /// before the move.
    fn center_between(&mut self, siblings: &[Index], left: usize, right: usize, earlier: &[Contour]) {
        let left_x = self.at(siblings[left]).x;
        let step = (self.at(siblings[right]).x - left_x) / (right - left) as f64;

        let mut moved = Vec::with_capacity(right - left - 1);
        for (count, &middle) in siblings[left + 1..right].iter().enumerate() {
            let desired = left_x + step * (count + 1) as f64;
            let offset = desired - self.at(middle).x;
            self.shift(middle, offset);
            moved.push((middle, offset));
        }

        if self.separated(siblings, left, right, &earlier[..=left]) {
            trace!(left, right, "centered intermediate siblings");
        } else {
            for (middle, offset) in moved {
                self.shift(middle, -offset);
            }
            trace!(left, right, "centering would overlap, rolled back");
        }
    }

    /// Whether `siblings[left + 1..=right]` are clear of each other and of
    /// the unmoved siblings, whose right contours are `unmoved`.
    fn separated(&self, siblings: &[Index], left: usize, right: usize, unmoved: &[Contour]) -> bool {
        let step = self.config.sibling_step();
        let beside = siblings[left..=right]
            .iter()
            .tuple_windows()
            .all(|(&a, &b)| self.at(b).x - self.at(a).x + EPSILON >= step);
        if !beside {
            return false;
        }

        let below = self.at(siblings[right]).y + 1;
        let min_distance = self.config.min_distance();
        let mut moved: Vec<Contour> = Vec::with_capacity(right - left);
        for &sibling in &siblings[left + 1..=right] {
            let sibling_left = self.contour(sibling, Side::Left);
            let blocked = unmoved.iter().chain(&moved).any(|earlier| {
                Contour::required_shift(earlier, &sibling_left, below, min_distance) > EPSILON
            });
            if blocked {
                return false;
            }
            moved.push(self.contour(sibling, Side::Right));
        }
        true
    }

    /// Pushes modifiers down so every x is final.
    fn apply_modifiers(&mut self) {
        let mut stack = vec![(self.root, 0.0)];
        while let Some((idx, mod_sum)) = stack.pop() {
            let scratch = self.at_mut(idx);
            scratch.x += mod_sum;
            let mod_sum = mod_sum + scratch.modifier;
            stack.extend(self.node(idx).children.iter().map(|&child| (child, mod_sum)));
        }
    }

    /// Moves the whole tree right so its leftmost node lands on x = 0.
    fn shift_onto_screen(&mut self) {
        let lowest = self.scratch.values().map(|s| s.x).fold(0.0, f64::min);
        if lowest < 0.0 {
            debug!(shift = -lowest, "shifting tree onto screen");
            for scratch in self.scratch.values_mut() {
                scratch.x -= lowest;
            }
        }
    }

    fn finalize(mut self) -> Layout {
        // reverse pre-order reaches every child before its parent
        let preorder = std::mem::take(&mut self.preorder);
        for &idx in preorder.iter().rev() {
            let children = &self.node(idx).children;
            let (width, height) = if children.is_empty() {
                let scratch = self.at(idx);
                (scratch.x, scratch.y)
            } else {
                children.iter().fold((f64::NEG_INFINITY, 0), |(w, h), &child| {
                    let scratch = self.at(child);
                    (w.max(scratch.width), h.max(scratch.height))
                })
            };
            let scratch = self.at_mut(idx);
            scratch.width = width;
            scratch.height = height;
        }

        let nodes = self
            .scratch
            .into_iter()
            .map(|(idx, s)| {
                (
                    idx,
                    NodeLayout {
                        x: s.x,
                        y: s.y,
                        width: s.width,
                        height: s.height,
                    },
                )
            })
            .collect();

        Layout {
            root: self.root,
            nodes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> LayoutEngine {
        LayoutEngine::default()
    }

    #[test]
    fn test_single_node() {
        let mut tree = TreeArena::new();
        let root = tree.insert_node((), None);
        let layout = engine().layout(&tree).unwrap();
        assert_eq!(
            layout.get(root),
            Some(&NodeLayout {
                x: 0.0,
                y: 0,
                width: 0.0,
                height: 0
            })
        );
    }

    #[test]
    fn test_extents_fold_bottom_up() {
        let mut tree = TreeArena::new();
        let root = tree.insert_node((), None);
        let a = tree.insert_node((), Some(root));
        let b = tree.insert_node((), Some(root));
        tree.insert_node((), Some(b));
        let b2 = tree.insert_node((), Some(b));

        let layout = engine().layout(&tree).unwrap();

        let extent = |idx| {
            let node = layout.get(idx).unwrap();
            (node.width, node.height)
        };
        assert_eq!(extent(a), (0.0, 1));
        assert_eq!(extent(b2), (1.5, 2));
        assert_eq!(extent(b), (1.5, 2));
        assert_eq!(extent(root), (1.5, 2));
        assert_eq!(layout.get(root).unwrap().x, 0.5);
    }

    #[test]
    fn test_empty_tree_is_invalid_argument() {
        let tree: TreeArena<()> = TreeArena::new();
        let err = engine().layout(&tree).unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));
    }

    #[test]
    fn test_unknown_root_is_invalid_argument() {
        let mut tree = TreeArena::new();
        tree.insert_node((), None);

        // a handle into a slot this arena never filled
        let mut foreign = TreeArena::new();
        for _ in 0..3 {
            foreign.insert_node((), None);
        }
        let stray = foreign.insert_node((), None);

        let err = engine().compute_positions(&tree, stray).unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));
    }

    #[test]
    fn test_cycle_is_malformed() {
        let mut tree = TreeArena::new();
        let root = tree.insert_node((), None);
        let child = tree.insert_node((), Some(root));
        tree.get_node_mut(child).unwrap().children.push(root);
        let err = engine().layout(&tree).unwrap_err();
        assert!(matches!(err, DomainError::MalformedTree(_)), "{err}");
    }

    #[test]
    fn test_parent_mismatch_is_malformed() {
        let mut tree = TreeArena::new();
        let root = tree.insert_node((), None);
        let a = tree.insert_node((), Some(root));
        let b = tree.insert_node((), Some(root));
        tree.get_node_mut(b).unwrap().parent = Some(a);
        let err = engine().layout(&tree).unwrap_err();
        assert!(matches!(err, DomainError::MalformedTree(_)), "{err}");
    }

    #[test]
    fn test_config_validation() {
        assert!(LayoutConfig::default().validate().is_ok());
        let bad = [
            LayoutConfig {
                node_size: 0.0,
                ..Default::default()
            },
            LayoutConfig {
                sibling_distance: -1.0,
                ..Default::default()
            },
            LayoutConfig {
                tree_distance: f64::NAN,
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(
                matches!(LayoutEngine::new(config), Err(DomainError::InvalidConfig(_))),
                "{config:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_subtree_layout_ignores_outside_siblings() {
        let mut tree = TreeArena::new();
        let root = tree.insert_node((), None);
        let _left = tree.insert_node((), Some(root));
        let right = tree.insert_node((), Some(root));
        let leaf = tree.insert_node((), Some(right));

        let layout = engine().compute_positions(&tree, right).unwrap();
        assert_eq!(layout.len(), 2);
        assert_eq!(layout.get(right).unwrap().x, 0.0);
        assert_eq!(layout.get(right).unwrap().y, 0);
        assert_eq!(layout.get(leaf).unwrap().y, 1);
    }
}
