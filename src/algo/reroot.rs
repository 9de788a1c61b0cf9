//! Rerooting: outgroup rotation, midpoint rooting, and unrooting.
//!
//! `set_outgroup` is edge-reversal surgery along the path from the root to
//! the outgroup's parent: every node on that path swaps child/parent roles
//! with its former parent while the dist/support pair of each traversed
//! edge is carried one step further in a one-edge buffer, so every path
//! length through the tree is preserved.

use tracing::{debug, warn};

use crate::error::TreeError;
use crate::model::node::NodeId;
use crate::model::tree::{NodeRef, Tree};

impl Tree {
    /// Rotates the structure under `root` so that `outgroup` becomes one of
    /// exactly two children of `root`, the rest of the original topology
    /// forming the second child's subtree.
    ///
    /// If the outgroup's original parent had further children besides the
    /// rotated path, they are gathered under a newly created connector
    /// node. The two final root edges each get half of their combined
    /// previous weight and the outgroup's original support. Root children
    /// are left in a deterministic order (sorted by leaf count, then
    /// smallest leaf name) so equivalent rerootings compare equal.
    ///
    /// # Errors
    /// [`TreeError::InvalidTopology`] if `outgroup` resolves to `root`
    /// itself; resolution errors from [`Tree::resolve`]. All validation
    /// happens before any structural change.
    pub fn set_outgroup(&mut self, root: NodeId, outgroup: NodeRef<'_>) -> Result<(), TreeError> {
        let outgroup = self.resolve(root, outgroup)?;
        if outgroup == root {
            return Err(TreeError::topology("cannot set a node as its own outgroup"));
        }
        if self[root].children().len() < 2 {
            return Err(TreeError::topology("rerooting requires a root with at least two children"));
        }
        let outgroup_parent = self[outgroup].parent().expect("resolved outgroup lies below root");

        // Child of `root` on the path down to the outgroup
        let mut path_top = outgroup;
        while self[path_top].parent() != Some(root) {
            path_top = self[path_top].parent().expect("resolve guarantees outgroup below root");
        }

        // Pull the outgroup path off the root; whatever remains becomes the
        // down-branch side, grouped under a connector if there are several
        let position = self[root]
            .children
            .iter()
            .position(|&c| c == path_top)
            .expect("path top is a child of root");
        self[root].children.remove(position);

        let connector = if self[root].children().len() > 1 {
            let connector = self.new_node();
            self[connector].dist = 0.0;
            self[connector].support = self[path_top].support();
            let former = std::mem::take(&mut self[root].children);
            for &child in &former {
                self[child].parent = Some(connector);
            }
            self[connector].children = former;
            connector
        } else {
            self[root].children[0]
        };

        let other = if outgroup_parent != root {
            // Reverse every edge from the outgroup's parent up to the root,
            // carrying each edge's dist/support one step along
            let mut becomes_parent = outgroup_parent;
            let mut becomes_child = self[becomes_parent].parent().expect("path reaches root");
            let mut reversed_parent: Option<NodeId> = None;
            let mut buf_dist = self[becomes_parent].dist();
            let mut buf_support = self[becomes_parent].support();

            while becomes_child != root {
                self[becomes_parent].children.push(becomes_child);
                let position = self[becomes_child]
                    .children
                    .iter()
                    .position(|&c| c == becomes_parent)
                    .expect("parent/child links in sync on the rotated path");
                self[becomes_child].children.remove(position);

                let next_dist = self[becomes_child].dist();
                let next_support = self[becomes_child].support();
                self[becomes_child].dist = buf_dist;
                self[becomes_child].support = buf_support;
                buf_dist = next_dist;
                buf_support = next_support;

                self[becomes_parent].parent = reversed_parent;
                reversed_parent = Some(becomes_parent);
                becomes_parent = becomes_child;
                becomes_child = self[becomes_parent].parent().expect("path reaches root");
            }

            // The last rotated node takes the down-branch side as a child
            self[becomes_parent].children.push(connector);
            self[connector].parent = Some(becomes_parent);
            self[becomes_parent].parent = reversed_parent;
            self[connector].dist += buf_dist;

            let position = self[outgroup_parent]
                .children
                .iter()
                .position(|&c| c == outgroup)
                .expect("outgroup still linked to its former parent");
            self[outgroup_parent].children.remove(position);
            self[outgroup_parent].dist = 0.0;
            outgroup_parent
        } else {
            connector
        };

        self[outgroup].parent = Some(root);
        self[other].parent = Some(root);
        self[root].children = vec![outgroup, other];

        let middist = (self[other].dist() + self[outgroup].dist()) / 2.0;
        self[outgroup].dist = middist;
        self[other].dist = middist;
        let support = self[outgroup].support();
        self[other].support = support;

        // Deterministic order of the two root children
        let key_outgroup = self.subtree_order_key(outgroup);
        let key_other = self.subtree_order_key(other);
        if key_other < key_outgroup {
            self[root].children = vec![other, outgroup];
        }

        debug!(root, outgroup, "rerooted on outgroup");
        Ok(())
    }

    /// Total ordering over subtrees used to fix the root child order after
    /// rerooting.
    fn subtree_order_key(&self, id: NodeId) -> (usize, String) {
        let smallest = self
            .leaf_names(id)
            .min()
            .map(str::to_string)
            .unwrap_or_default();
        (self.num_leaves(id), smallest)
    }

    /// Returns the node dividing the structure under `root` into two
    /// distance-balanced halves, suitable as an argument to
    /// [`Tree::set_outgroup`].
    ///
    /// Finds the farthest leaf A from the root and the node B farthest from
    /// A, then walks from A toward B accumulating branch lengths; the first
    /// node at which the accumulated weight exceeds half the A–B distance
    /// is the midpoint anchor.
    pub fn midpoint_outgroup(&self, root: NodeId) -> NodeId {
        let (leaf_a, _) = self.farthest_leaf(root, false);
        let (_, a_to_b) = self.farthest_node(leaf_a, false);

        let middist = a_to_b / 2.0;
        let mut accumulated = 0.0;
        let mut current = leaf_a;
        loop {
            accumulated += self[current].dist();
            if accumulated > middist {
                return current;
            }
            match self[current].parent() {
                Some(parent) => current = parent,
                None => return current,
            }
        }
    }

    /// Collapses one of the two root children, dissolving the root
    /// bifurcation. Intended for the absolute root; calling it on an
    /// internal node is allowed but logged.
    ///
    /// # Errors
    /// [`TreeError::InvalidTopology`] if both root children are leaves
    /// (a two-leaf tree cannot be unrooted).
    pub fn unroot(&mut self, root: NodeId) -> Result<(), TreeError> {
        if !self[root].is_root() {
            warn!(root, "unrooting an internal node");
        }
        if self[root].children().len() != 2 {
            return Ok(());
        }
        let (first, second) = (self[root].children()[0], self[root].children()[1]);
        if !self[first].is_leaf() {
            self.delete(first, false);
        } else if !self[second].is_leaf() {
            self.delete(second, false);
        } else {
            return Err(TreeError::topology("cannot unroot a tree with only two leaves"));
        }
        Ok(())
    }
}
