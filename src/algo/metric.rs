//! Distance and common-ancestor computation.
//!
//! All searches here are iterative: distances and farthest-node lookups
//! fold over explicit postorder traversals and parent-chain walks, so tree
//! depth never translates into call-stack depth.

use crate::error::TreeError;
use crate::model::node::NodeId;
use crate::model::traverse::Strategy;
use crate::model::tree::{NodeRef, Tree};

/// How [`Tree::distance`] measures the path between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceMode {
    /// Sum of branch lengths along the path.
    BranchLength,
    /// Edge count, preserving a historical quirk: the first edge of the leg
    /// toward the *first* argument is not counted, so
    /// `distance(a, b, Topology)` can differ from `distance(b, a, Topology)`
    /// by one. Kept for compatibility with existing measurements; new code
    /// should prefer [`DistanceMode::TopologySymmetric`].
    Topology,
    /// Edge count over the full path, symmetric in its arguments.
    TopologySymmetric,
}

impl Tree {
    /// Returns the distance between two nodes: the sum of edge weights (or
    /// edge counts, see [`DistanceMode`]) from each node up to their
    /// nearest common ancestor.
    ///
    /// # Errors
    /// [`TreeError::DisconnectedNodes`] if `a` and `b` do not share a root
    /// context (e.g. one sits in a detached subtree).
    pub fn distance(&self, a: NodeId, b: NodeId, mode: DistanceMode) -> Result<f64, TreeError> {
        let root = self.tree_root_of(a);
        let ancestor = self.common_ancestor_of(root, &[a, b])?;

        let mut dist = 0.0;
        for leg in [b, a] {
            let mut current = leg;
            while current != ancestor {
                match mode {
                    DistanceMode::BranchLength => dist += self[current].dist(),
                    DistanceMode::Topology => {
                        if current != a {
                            dist += 1.0;
                        }
                    }
                    DistanceMode::TopologySymmetric => dist += 1.0,
                }
                current = self[current].parent().ok_or(TreeError::DisconnectedNodes)?;
            }
        }
        Ok(dist)
    }

    /// Returns the nearest node from which every target is reachable.
    ///
    /// Targets may be ids or names; `base` itself counts as a target, so a
    /// single explicit target yields the common ancestor of it and `base`.
    ///
    /// # Errors
    /// - Resolution errors from [`Tree::resolve`]
    /// - [`TreeError::DisconnectedNodes`] if the root context does not
    ///   contain all targets
    /// - [`TreeError::InvalidTopology`] if no targets are given
    pub fn common_ancestor(
        &self,
        base: NodeId,
        targets: &[NodeRef<'_>],
    ) -> Result<NodeId, TreeError> {
        if targets.is_empty() {
            return Err(TreeError::topology("common ancestor requires at least one target"));
        }
        let root = self.tree_root_of(base);
        let mut ids = Vec::with_capacity(targets.len() + 1);
        for target in targets {
            ids.push(self.resolve(root, *target)?);
        }
        if targets.len() == 1 {
            ids.push(base);
        }
        self.common_ancestor_of(root, &ids)
    }

    /// Nearest common ancestor of a set of resolved ids.
    ///
    /// Climbs from the last target toward the root, accumulating the set of
    /// nodes reachable by descending from the current node without
    /// re-entering the branch just ascended from, and stops as soon as the
    /// accumulated set covers every target.
    pub(crate) fn common_ancestor_of(
        &self,
        root: NodeId,
        targets: &[NodeId],
    ) -> Result<NodeId, TreeError> {
        let start = *targets.last().expect("targets must be non-empty");

        let mut below = vec![false; self.capacity()];
        for id in self.traverse(start, Strategy::Preorder) {
            below[id] = true;
        }

        let mut current = start;
        let mut prev = start;
        loop {
            // Absorb every subtree hanging off `current` except the branch
            // we climbed out of
            for &child in self[current].children() {
                if child != prev {
                    for id in self.traverse(child, Strategy::Preorder) {
                        below[id] = true;
                    }
                }
            }
            below[current] = true;

            if targets.iter().all(|&t| below[t]) {
                return Ok(current);
            }
            if current == root {
                return Err(TreeError::DisconnectedNodes);
            }
            prev = current;
            current = self[current].parent().ok_or(TreeError::DisconnectedNodes)?;
        }
    }

    /// Returns the leaf under `id` farthest from it, and the distance to
    /// it. Ties are broken by first encounter in child order; a leaf is its
    /// own farthest leaf at distance zero.
    pub fn farthest_leaf(&self, id: NodeId, topology_only: bool) -> (NodeId, f64) {
        // (best leaf, distance from each node down to it), filled postorder
        let mut best: Vec<Option<(NodeId, f64)>> = vec![None; self.capacity()];

        for node in self.traverse(id, Strategy::Postorder) {
            if self[node].is_leaf() {
                best[node] = Some((node, 0.0));
                continue;
            }
            let mut node_best: Option<(NodeId, f64)> = None;
            for &child in self[node].children() {
                let (leaf, below) = best[child].expect("children are visited before parents");
                let edge = if topology_only { 1.0 } else { self[child].dist() };
                let total = below + edge;
                if node_best.is_none_or(|(_, d)| total > d) {
                    node_best = Some((leaf, total));
                }
            }
            best[node] = node_best;
        }

        best[id].expect("traversal always visits its root")
    }

    /// Returns the globally farthest node from `id` (a descendant, or a
    /// node reachable through an ancestor's other subtrees) and the
    /// distance to it.
    ///
    /// Starts from the farthest leaf below `id`, then climbs the ancestor
    /// chain, comparing candidate paths that route through each sister
    /// subtree along the way.
    pub fn farthest_node(&self, id: NodeId, topology_only: bool) -> (NodeId, f64) {
        let (mut far_node, mut far_dist) = self.farthest_leaf(id, topology_only);

        let mut prev = id;
        let mut climbed = if topology_only { 0.0 } else { self[id].dist() };
        let mut current = self[id].parent();
        while let Some(ancestor) = current {
            for &sister in self[ancestor].children() {
                if sister == prev {
                    continue;
                }
                let (leaf, below) = if self[sister].is_leaf() {
                    (sister, 0.0)
                } else {
                    self.farthest_leaf(sister, topology_only)
                };
                let via = below + if topology_only { 1.0 } else { self[sister].dist() };
                if climbed + via > far_dist {
                    far_dist = climbed + via;
                    far_node = leaf;
                }
            }
            prev = ancestor;
            climbed += if topology_only { 1.0 } else { self[ancestor].dist() };
            current = self[ancestor].parent();
        }

        (far_node, far_dist)
    }
}
