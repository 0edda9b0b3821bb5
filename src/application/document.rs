//! TOML tree documents.
//!
//! A document is one nested table per node:
//!
//! ```toml
//! label = "root"
//!
//! [[children]]
//! label = "left"
//!
//! [[children.children]]
//! label = "left.a"
//!
//! [[children]]
//! label = "right"
//! ```

use std::path::Path;

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::TreeArena;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeDocument {
    pub label: String,
    #[serde(default)]
    pub children: Vec<TreeDocument>,
}

impl TreeDocument {
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<TreeDocument>) -> Self {
        self.children = children;
        self
    }

    /// Parses a document; `origin` names the source in error messages.
    pub fn from_toml_str(content: &str, origin: &str) -> ApplicationResult<Self> {
        toml::from_str(content).map_err(|e| ApplicationError::Parse {
            origin: origin.to_string(),
            message: e.message().to_string(),
        })
    }

    #[instrument(level = "debug")]
    pub fn from_path(path: &Path) -> ApplicationResult<Self> {
        let content = std::fs::read_to_string(path).with_path_context("read", path)?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    pub fn to_toml(&self) -> ApplicationResult<String> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Parse {
            origin: self.label.clone(),
            message: format!("serialize: {e}"),
        })
    }

    /// Builds an arena tree of labels, preserving child order.
    #[instrument(level = "debug", skip(self), fields(root = %self.label))]
    pub fn to_arena(&self) -> TreeArena<String> {
        let mut tree = TreeArena::new();
        let mut stack: Vec<(&TreeDocument, Option<Index>)> = vec![(self, None)];

        while let Some((doc, parent_idx)) = stack.pop() {
            let current_idx = tree.insert_node(doc.label.clone(), parent_idx);

            // Reversed so the leftmost child is inserted first
            for child in doc.children.iter().rev() {
                stack.push((child, Some(current_idx)));
            }
        }

        debug!(nodes = tree.len(), "built tree from document");
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_children() {
        let doc = TreeDocument::from_toml_str(
            r#"
label = "root"

[[children]]
label = "left"

[[children.children]]
label = "left.a"

[[children]]
label = "right"
"#,
            "inline",
        )
        .unwrap();

        assert_eq!(
            doc,
            TreeDocument::leaf("root").with_children(vec![
                TreeDocument::leaf("left").with_children(vec![TreeDocument::leaf("left.a")]),
                TreeDocument::leaf("right"),
            ])
        );
    }

    #[test]
    fn test_missing_label_is_parse_error() {
        let err = TreeDocument::from_toml_str("[[children]]\nlabel = \"x\"\n", "inline")
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Parse { .. }), "{err}");
        assert!(err.to_string().contains("inline"));
    }

    #[test]
    fn test_to_arena_keeps_child_order() {
        let doc = TreeDocument::leaf("root").with_children(vec![
            TreeDocument::leaf("a").with_children(vec![
                TreeDocument::leaf("a1"),
                TreeDocument::leaf("a2"),
            ]),
            TreeDocument::leaf("b"),
            TreeDocument::leaf("c"),
        ]);

        let tree = doc.to_arena();
        let labels: Vec<_> = tree.iter().map(|(_, n)| n.data.as_str()).collect();
        assert_eq!(labels, vec!["root", "a", "a1", "a2", "b", "c"]);

        let root = tree.root().unwrap();
        let children: Vec<_> = tree
            .get_node(root)
            .unwrap()
            .children
            .iter()
            .map(|&c| tree.get_node(c).unwrap().data.as_str())
            .collect();
        assert_eq!(children, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let doc = TreeDocument::leaf("root").with_children(vec![TreeDocument::leaf("child")]);
        let text = doc.to_toml().unwrap();
        assert_eq!(TreeDocument::from_toml_str(&text, "round-trip").unwrap(), doc);
    }
}
