//! Treekit is a library for building, editing, and analyzing rooted
//! phylogenetic trees in memory.
//!
//! Core functionality provided:
//! - Tree model: arena-backed n-ary rooted trees ([model::Tree]) with
//!   branch lengths, support values, and typed per-node attributes
//!   ([model::AttrValue]). No direct node references are stored, only
//!   node indices ([model::NodeId]).
//! - Traversal: preorder, postorder, and level-order iterators, all with
//!   explicit stacks so deep trees never exhaust the call stack.
//! - Topology editing: attach/detach, child and sister surgery, node
//!   deletion with edge elision, pruning to a leaf subset, and random
//!   population for test fixtures.
//! - Metrics: pairwise distances (branch-length or topology-only),
//!   common ancestors, farthest leaf/node queries.
//! - Rerooting: outgroup-based rerooting with edge reversal, midpoint
//!   outgroup selection, and unrooting.
//! - Canonical form: deterministic sibling ordering for structural
//!   comparison, plus ultrametric rescaling.
//! - Newick I/O: the numbered format levels (0-9, 100) and NHX
//!   annotation blocks. See [crate::newick] for the grammar and the
//!   field table.
//! - ASCII rendering of trees for terminals and debugging.
//!
//! # Example
//!
//! Parse a Newick string, reroot, and write it back out:
//! ```
//! use treekit::newick::{self, FormatSpec};
//!
//! let mut tree = newick::parse_str("((A:1,B:1)0.9:0.5,C:1.5);").unwrap();
//! let names: Vec<_> = tree.leaf_names(tree.root()).collect();
//! assert_eq!(names, ["A", "B", "C"]);
//!
//! let root = tree.root();
//! tree.set_outgroup(root, "C".into()).unwrap();
//! let rerooted = newick::to_newick(&tree, tree.root(), FormatSpec::FLEXIBLE, None);
//! assert!(rerooted.ends_with(";"));
//! ```

pub mod algo;
pub mod ascii;
pub mod error;
pub mod model;
pub mod newick;

pub use crate::algo::{DistanceMode, UltrametricStrategy};
pub use crate::error::TreeError;
pub use crate::model::{AttrValue, Node, NodeId, Strategy, Tree};

use std::path::Path;

// ============================================================================
// Quick Newick API
// ============================================================================
/// Parses a Newick string using the flexible default format.
///
/// See [`newick::parse_str`] for full documentation of this convenience
/// function.
pub fn parse_newick_str<S: AsRef<str>>(input: S) -> Result<Tree, TreeError> {
    newick::parse_str(input.as_ref())
}

/// Parses a file containing a single Newick tree using the flexible
/// default format.
///
/// See [`newick::parse_file`] for full documentation of this convenience
/// function.
pub fn parse_newick_file<P: AsRef<Path>>(path: P) -> Result<Tree, TreeError> {
    newick::parse_file(path)
}
