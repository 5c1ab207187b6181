//! Canonical runtime representations of the trained classifier.

/// Node identifier: an index into a tree's SoA arrays.
pub type NodeId = u32;

pub mod forest;
pub mod linear;
pub mod tree;

pub use forest::{Forest, ForestValidationError};
pub use linear::LinearModel;
pub use tree::{Tree, TreeBuilder, TreeValidationError, TreeView};
