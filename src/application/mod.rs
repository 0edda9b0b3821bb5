//! Application layer: documents in, reports out
//!
//! This layer wires file I/O and presentation around the domain engine.

pub mod document;
pub mod error;
pub mod error_ext;
pub mod report;

pub use document::TreeDocument;
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use report::{rows, to_termtree, LayoutRow};
