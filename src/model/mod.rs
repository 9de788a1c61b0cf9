//! Core tree model: nodes, the arena tree, and traversal iterators.

pub mod node;
pub mod traverse;
pub mod tree;

pub use node::{AttrValue, NAME_ATTR, Node, NodeId};
pub use traverse::{Strategy, Traverse};
pub use tree::{ChildOptions, NodeRef, Tree};
