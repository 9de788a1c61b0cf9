//! Traversal iterators over a tree.
//!
//! All three strategies produce lazy, finite, one-shot sequences of every
//! node reachable from a given root, including the root itself. The
//! iterators are stack/queue driven rather than recursive, since tree depth
//! is data-dependent and deep chains must not exhaust the call stack.

use std::collections::VecDeque;

use crate::model::node::NodeId;
use crate::model::tree::Tree;

/// Order in which [`Tree::traverse`] emits nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// A node before any of its descendants; children left to right, each
    /// subtree fully emitted before the next sibling's begins.
    Preorder,
    /// A node strictly after all of its descendants.
    Postorder,
    /// Breadth-first: non-decreasing depth, siblings in child order.
    Levelorder,
}

/// One-shot iterator over the nodes under a root.
///
/// Obtained from [`Tree::traverse`]. Borrows the tree, so the structure
/// cannot be mutated while a traversal is in flight.
pub struct Traverse<'a> {
    tree: &'a Tree,
    state: State,
}

enum State {
    Pre { stack: Vec<NodeId> },
    // (id, children_expanded)
    Post { stack: Vec<(NodeId, bool)> },
    Level { queue: VecDeque<NodeId> },
}

impl<'a> Traverse<'a> {
    pub(crate) fn new(tree: &'a Tree, root: NodeId, strategy: Strategy) -> Self {
        let state = match strategy {
            Strategy::Preorder => State::Pre { stack: vec![root] },
            Strategy::Postorder => State::Post { stack: vec![(root, false)] },
            Strategy::Levelorder => State::Level { queue: VecDeque::from([root]) },
        };
        Traverse { tree, state }
    }
}

impl Iterator for Traverse<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        match &mut self.state {
            State::Pre { stack } => {
                let id = stack.pop()?;
                // Right-to-left push so the leftmost child is emitted first
                stack.extend(self.tree[id].children().iter().rev());
                Some(id)
            }
            State::Post { stack } => {
                while let Some((id, expanded)) = stack.pop() {
                    let children = self.tree[id].children();
                    if expanded || children.is_empty() {
                        return Some(id);
                    }
                    stack.push((id, true));
                    stack.extend(children.iter().rev().map(|&c| (c, false)));
                }
                None
            }
            State::Level { queue } => {
                let id = queue.pop_front()?;
                queue.extend(self.tree[id].children());
                Some(id)
            }
        }
    }
}
