//! Presenting a computed layout: rows for tables, termtree for the terminal.

use std::fmt::{self, Display};

use generational_arena::Index;
use termtree::Tree;
use tracing::{debug, instrument};

use crate::domain::{Layout, NodeLayout, ScreenPoint, ScreenTransform, TreeArena};

/// One node of a laid-out tree, flattened for display.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutRow {
    pub label: String,
    pub x: f64,
    pub y: usize,
    pub width: f64,
    pub height: usize,
    pub screen: Option<ScreenPoint>,
}

impl LayoutRow {
    fn new(label: String, node: &NodeLayout, screen: Option<&ScreenTransform>) -> Self {
        Self {
            label,
            x: node.x,
            y: node.y,
            width: node.width,
            height: node.height,
            screen: screen.map(|transform| transform.project(node)),
        }
    }
}

impl Display for LayoutRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<24} x={:<8} y={:<4} width={:<8} height={}",
            self.label,
            fmt_coord(self.x),
            self.y,
            fmt_coord(self.width),
            self.height
        )?;
        if let Some(screen) = self.screen {
            write!(f, "  screen=({}, {})", fmt_coord(screen.x), fmt_coord(screen.y))?;
        }
        Ok(())
    }
}

/// Trims trailing zeros so `0.5` and `2` print as written.
pub(crate) fn fmt_coord(value: f64) -> String {
    let text = format!("{value:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// Flattens the laid-out part of `tree` into rows, in pre-order.
#[instrument(level = "debug", skip_all)]
pub fn rows<T: Display>(
    tree: &TreeArena<T>,
    layout: &Layout,
    screen: Option<&ScreenTransform>,
) -> Vec<LayoutRow> {
    tree.iter_from(layout.root())
        .filter_map(|(idx, node)| {
            let placed = layout.get(idx)?;
            debug!("{}:{}:{}", placed.y, placed.x, placed.width);
            Some(LayoutRow::new(node.data.to_string(), placed, screen))
        })
        .collect()
}

/// Renders the laid-out tree with each node annotated by its position.
pub fn to_termtree<T: Display>(tree: &TreeArena<T>, layout: &Layout) -> Tree<String> {
    fn label<T: Display>(tree: &TreeArena<T>, layout: &Layout, idx: Index) -> String {
        match (tree.get_node(idx), layout.get(idx)) {
            (Some(node), Some(placed)) => format!(
                "{} (x={}, y={})",
                node.data,
                fmt_coord(placed.x),
                placed.y
            ),
            (Some(node), None) => node.data.to_string(),
            _ => format!("{idx:?}"),
        }
    }

    fn build_tree<T: Display>(
        tree: &TreeArena<T>,
        layout: &Layout,
        node_idx: Index,
        parent_tree: &mut Tree<String>,
    ) {
        if let Some(node) = tree.get_node(node_idx) {
            for &child_idx in &node.children {
                let mut child_tree = Tree::new(label(tree, layout, child_idx));
                build_tree(tree, layout, child_idx, &mut child_tree);
                parent_tree.push(child_tree);
            }
        }
    }

    let root_idx = layout.root();
    let mut root = Tree::new(label(tree, layout, root_idx));
    build_tree(tree, layout, root_idx, &mut root);
    root
}
