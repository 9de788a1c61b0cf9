//! Canonical ordering and ultrametric rescaling.
//!
//! `sort_descendants` gives two trees with the same labeled topology the
//! same child order regardless of construction order, enabling structural
//! equality and hashing. The digest only needs to be deterministic and
//! collision-resistant enough for ordering; it is not part of any external
//! contract.

use std::collections::VecDeque;
use std::hash::{DefaultHasher, Hash, Hasher};

use crate::model::node::{AttrValue, NodeId};
use crate::model::traverse::Strategy;
use crate::model::tree::Tree;

/// Attribute under which [`Tree::sort_descendants`] records each node's
/// stable postorder id.
pub const NID_ATTR: &str = "nid";

/// How [`Tree::rescale_ultrametric`] distributes edge weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UltrametricStrategy {
    /// Each edge takes the remaining root-to-leaf budget divided by the
    /// number of edges left on the longest path through it.
    Balanced,
    /// Internal edges take a constant step computed from the root's max
    /// depth; leaf edges absorb whatever remainder reaches the total
    /// exactly.
    Fixed,
}

fn digest_name(name: Option<&str>) -> u64 {
    let mut hasher = DefaultHasher::new();
    name.unwrap_or_default().hash(&mut hasher);
    hasher.finish()
}

fn digest_keys(keys: &[u64]) -> u64 {
    let mut hasher = DefaultHasher::new();
    keys.hash(&mut hasher);
    hasher.finish()
}

impl Tree {
    /// Sorts every sibling set under `root` into canonical order and
    /// assigns each node a sequential postorder id (the `"nid"` attribute,
    /// starting at 1).
    ///
    /// Leaves are keyed by a digest of their label; internal nodes by a
    /// digest of the sorted multiset of their children's keys. Trees with
    /// identical labeled topology therefore sort identically, whatever
    /// order their children were attached in. Duplicate leaf labels need an
    /// extra criterion to be fully stable.
    pub fn sort_descendants(&mut self, root: NodeId) {
        let order: Vec<NodeId> = self.traverse(root, Strategy::Postorder).collect();
        let mut keys = vec![0u64; self.capacity()];

        for &id in &order {
            if self[id].is_leaf() {
                keys[id] = digest_name(self[id].name());
            } else {
                self[id].children.sort_by_key(|&c| keys[c]);
                let child_keys: Vec<u64> =
                    self[id].children().iter().map(|&c| keys[c]).collect();
                keys[id] = digest_keys(&child_keys);
            }
        }

        // Number nodes in the postorder of the new arrangement
        let renumbered: Vec<NodeId> = self.traverse(root, Strategy::Postorder).collect();
        for (counter, id) in renumbered.into_iter().enumerate() {
            self[id].set_attr(NID_ATTR, AttrValue::Int(counter as i64 + 1));
        }
    }

    /// Rewrites every edge weight under `root` so that all leaves end up at
    /// cumulative distance `total_length` from it.
    pub fn rescale_ultrametric(
        &mut self,
        root: NodeId,
        total_length: f64,
        strategy: UltrametricStrategy,
    ) {
        // Splits remaining under each node, counting the node's own edge
        let mut max_depth = vec![0usize; self.capacity()];
        for id in self.traverse(root, Strategy::Postorder) {
            max_depth[id] = if self[id].is_leaf() {
                1
            } else {
                self[id].children().iter().map(|&c| max_depth[c]).max().unwrap_or(0) + 1
            };
        }

        let step = total_length / max_depth[root] as f64;
        // Distance already spent above each node (edge count for Fixed)
        let mut spent = vec![0.0f64; self.capacity()];

        let order: Vec<NodeId> =
            self.descendants(root, Strategy::Levelorder).collect();
        for id in order {
            let parent = self[id].parent().expect("descendants have parents");
            match strategy {
                UltrametricStrategy::Balanced => {
                    let dist = (total_length - spent[parent]) / max_depth[id] as f64;
                    self[id].dist = dist;
                    spent[id] = dist + spent[parent];
                }
                UltrametricStrategy::Fixed => {
                    if self[id].is_leaf() {
                        self[id].dist = total_length - spent[parent] * step;
                    } else {
                        self[id].dist = step;
                    }
                    spent[id] = spent[parent] + 1.0;
                }
            }
        }
    }

    /// Checks whether the structure under `root` is ultrametric: all
    /// leaves at the same cumulative distance from `root`, within
    /// `tolerance`.
    pub fn is_ultrametric(&self, root: NodeId, tolerance: f64) -> bool {
        let mut depth = VecDeque::from([(root, 0.0f64)]);
        let mut leaf_depth: Option<f64> = None;
        while let Some((id, above)) = depth.pop_front() {
            if self[id].is_leaf() {
                match leaf_depth {
                    Some(expected) if (above - expected).abs() > tolerance => return false,
                    Some(_) => {}
                    None => leaf_depth = Some(above),
                }
                continue;
            }
            for &child in self[id].children() {
                depth.push_back((child, above + self[child].dist()));
            }
        }
        true
    }
}
