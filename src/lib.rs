//! storytree: tidy tree layout for story and dialogue trees
//!
//! Architecture:
//! - `domain`: the arena tree model and the layout engine (no I/O)
//! - `application`: tree documents and layout reports
//! - `config`: layered settings
//! - `cli`: argument parsing and command dispatch
//!
//! ```
//! use storytree::domain::{LayoutEngine, TreeArena};
//!
//! let mut tree = TreeArena::new();
//! let root = tree.insert_node("root", None);
//! let left = tree.insert_node("left", Some(root));
//! let right = tree.insert_node("right", Some(root));
//!
//! let layout = LayoutEngine::default().layout(&tree).unwrap();
//! assert_eq!(layout.get(left).unwrap().x, 0.0);
//! assert_eq!(layout.get(right).unwrap().x, 1.0);
//! assert_eq!(layout.get(root).unwrap().x, 0.5);
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;
