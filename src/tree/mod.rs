//! Decision tree representation.
//!
//! Trees are read-only inputs produced by a training library. They can be
//! built node by node ([`Tree::new`]) or from exported parallel arrays
//! ([`Tree::from_arrays`], [`TreeArrays`]).

pub mod node;
pub mod tree;

pub use node::TreeNode;
pub use tree::{Tree, TreeArrays, TREE_LEAF};
