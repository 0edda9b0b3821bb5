//! Per-level horizontal extents of a subtree.
//!
//! A contour records, for every depth level a subtree touches, the leftmost
//! or rightmost x seen on that level. Comparing the right contour of one
//! subtree with the left contour of its right neighbour tells how far apart
//! the two are without comparing every pair of nodes.

use std::collections::BTreeMap;

use generational_arena::Index;

use crate::domain::arena::TreeArena;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Minimum x per level
    Left,
    /// Maximum x per level
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    side: Side,
    levels: BTreeMap<usize, f64>,
}

impl Contour {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }

    /// Folds `x` into the extreme kept for `level`.
    pub fn record(&mut self, level: usize, x: f64) {
        let side = self.side;
        self.levels
            .entry(level)
            .and_modify(|current| {
                *current = match side {
                    Side::Left => current.min(x),
                    Side::Right => current.max(x),
                }
            })
            .or_insert(x);
    }

    pub fn get(&self, level: usize) -> Option<f64> {
        self.levels.get(&level).copied()
    }

    /// Smallest horizontal gap between `left` (a right contour) and `right`
    /// (a left contour) over the levels both share, starting at `from_level`.
    /// None when no level is shared.
    pub fn gap(left: &Contour, right: &Contour, from_level: usize) -> Option<f64> {
        debug_assert_eq!(left.side, Side::Right, "left subtree needs its right contour");
        debug_assert_eq!(right.side, Side::Left, "right subtree needs its left contour");
        right
            .levels
            .range(from_level..)
            .filter_map(|(level, &r)| left.get(*level).map(|l| r - l))
            .reduce(f64::min)
    }

    /// How far `right` must move so that it is at least `min_distance` clear
    /// of `left` on every shared level from `from_level` down; 0 if it
    /// already is.
    pub fn required_shift(
        left: &Contour,
        right: &Contour,
        from_level: usize,
        min_distance: f64,
    ) -> f64 {
        Self::gap(left, right, from_level)
            .map(|gap| (min_distance - gap).max(0.0))
            .unwrap_or(0.0)
    }
}

/// Walks the subtree below `start` and records a contour.
///
/// `placement` yields `(level, x, modifier)` for a node. The modifiers of a
/// node's ancestors inside the walk are added to its x; the start node's
/// own modifier only moves its descendants.
pub(crate) fn trace_contour<T, F>(
    tree: &TreeArena<T>,
    start: Index,
    side: Side,
    mut placement: F,
) -> Contour
where
    F: FnMut(Index) -> Option<(usize, f64, f64)>,
{
    let mut contour = Contour::new(side);
    let mut stack = vec![(start, 0.0)];

    while let Some((idx, mod_sum)) = stack.pop() {
        let (Some(node), Some((level, x, modifier))) = (tree.get_node(idx), placement(idx)) else {
            continue;
        };
        contour.record(level, x + mod_sum);
        let mod_sum = mod_sum + modifier;
        stack.extend(node.children.iter().map(|&child| (child, mod_sum)));
    }

    contour
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contour(side: Side, values: &[(usize, f64)]) -> Contour {
        let mut c = Contour::new(side);
        for &(level, x) in values {
            c.record(level, x);
        }
        c
    }

    #[test]
    fn test_record_keeps_extreme() {
        let left = contour(Side::Left, &[(1, 3.0), (1, 1.0), (1, 2.0)]);
        let right = contour(Side::Right, &[(1, 3.0), (1, 1.0), (1, 2.0)]);
        assert_eq!(left.get(1), Some(1.0));
        assert_eq!(right.get(1), Some(3.0));
        assert_eq!(left.get(0), None);
    }

    #[test]
    fn test_gap_uses_shared_levels_only() {
        let left = contour(Side::Right, &[(0, 0.0), (1, 1.5), (2, 4.0)]);
        let right = contour(Side::Left, &[(0, 2.0), (1, 2.5)]);
        assert_eq!(Contour::gap(&left, &right, 0), Some(1.0));
        assert_eq!(Contour::gap(&left, &right, 1), Some(1.0));
        assert_eq!(Contour::gap(&left, &right, 2), None);
    }

    #[test]
    fn test_required_shift() {
        let left = contour(Side::Right, &[(1, 1.5)]);
        let right = contour(Side::Left, &[(1, 1.0)]);
        assert_eq!(Contour::required_shift(&left, &right, 1, 1.0), 1.5);
        assert_eq!(Contour::required_shift(&left, &right, 2, 1.0), 0.0);
        assert_eq!(Contour::required_shift(&left, &right, 1, -1.0), 0.0);
    }

    #[test]
    fn test_trace_contour_applies_ancestor_modifiers() {
        let mut tree = TreeArena::new();
        let root = tree.insert_node((), None);
        let a = tree.insert_node((), Some(root));
        let b = tree.insert_node((), Some(root));

        // root at x=5 with modifier 2; children at raw 0 and 1
        let placement = |idx: Index| {
            if idx == root {
                Some((0, 5.0, 2.0))
            } else if idx == a {
                Some((1, 0.0, 0.0))
            } else if idx == b {
                Some((1, 1.0, 0.0))
            } else {
                None
            }
        };

        let left = trace_contour(&tree, root, Side::Left, placement);
        let right = trace_contour(&tree, root, Side::Right, placement);
        assert_eq!(left.get(0), Some(5.0));
        assert_eq!(left.get(1), Some(2.0));
        assert_eq!(right.get(1), Some(3.0));
        assert_eq!(left.get(2), None);
    }
}
