//! Domain layer: the tree model and the layout engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod contour;
pub mod error;
pub mod layout;
pub mod projection;

pub use arena::{TreeArena, TreeNode};
pub use contour::{Contour, Side};
pub use error::{DomainError, LayoutResult};
pub use layout::{Layout, LayoutConfig, LayoutEngine, NodeLayout};
pub use projection::{ScreenPoint, ScreenTransform};
