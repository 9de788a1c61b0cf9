//! Tree module: the arena holding [`Node`]s and the topology editor.
//!
//! A [`Tree`] stores all of its nodes in a contiguous arena and links them
//! by [`NodeId`], so parent/child references are plain indices and the
//! structure contains no reference cycles. One node is the primary root;
//! a detached subtree lives on in the same arena as a secondary root, owned
//! by whoever holds its id.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::error::TreeError;
use crate::model::node::{AttrValue, NAME_ATTR, Node, NodeId};
use crate::model::traverse::{Strategy, Traverse};

// =#========================================================================#=
// TREE
// =#========================================================================#=
/// A rooted tree of [`Node`]s stored in an arena.
///
/// Nodes are referenced by [`NodeId`]. Deleted nodes leave tombstone slots
/// behind; ids are never reused, so a stale id is detectable via
/// [`Tree::contains`] rather than silently aliasing a new node.
///
/// # Invariants (hold after every public operation)
/// 1. Acyclicity: no node is its own ancestor
/// 2. Single ownership: every non-root node appears in exactly one parent's
///    child list, and its parent link points back at that parent
/// 3. No duplicate entries in any child list
/// 4. Leaf (no children) and root (no parent) are derived properties
///
/// # Example
/// ```
/// use treekit::Tree;
///
/// // Build ((A,B),C) by hand
/// let mut tree = Tree::new();
/// let inner = tree.add_child(tree.root());
/// let a = tree.add_child(inner);
/// tree[a].set_name("A");
/// let b = tree.add_child(inner);
/// tree[b].set_name("B");
/// let c = tree.add_child(tree.root());
/// tree[c].set_name("C");
///
/// assert_eq!(tree.num_leaves(tree.root()), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Tree {
    /// Node arena; `None` marks a deleted slot.
    nodes: Vec<Option<Node>>,
    /// Index of the primary root.
    root: NodeId,
}

/// Reference to a node, either directly by id or by its label.
///
/// Name references are resolved against a root context; zero matches is
/// [`TreeError::NodeNotFound`], more than one is
/// [`TreeError::AmbiguousReference`].
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Id(NodeId),
    Name(&'a str),
}

impl From<NodeId> for NodeRef<'_> {
    fn from(id: NodeId) -> Self {
        NodeRef::Id(id)
    }
}

impl<'a> From<&'a str> for NodeRef<'a> {
    fn from(name: &'a str) -> Self {
        NodeRef::Name(name)
    }
}

/// Optional overrides for [`Tree::add_child_with`] and
/// [`Tree::add_sister`].
///
/// Branch length and support may be supplied as any [`AttrValue`]; they are
/// coerced to `f64` before the child is attached, so a non-numeric value
/// fails with [`TreeError::TypeCoercionFailure`] and leaves the tree
/// untouched.
#[derive(Debug, Default, Clone)]
pub struct ChildOptions {
    pub name: Option<AttrValue>,
    pub dist: Option<AttrValue>,
    pub support: Option<AttrValue>,
}

// ============================================================================
// New, Getters / Accessors (pub)
// ============================================================================
impl Tree {
    /// Creates a tree holding a single root node.
    pub fn new() -> Self {
        Tree { nodes: vec![Some(Node::new())], root: 0 }
    }

    /// Returns the id of the primary root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns a reference to the node at `id`, or `None` if the id is out
    /// of bounds or its slot was deleted.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id).and_then(|slot| slot.as_ref())
    }

    /// Returns a mutable reference to the node at `id`, or `None` if the id
    /// is out of bounds or its slot was deleted.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id).and_then(|slot| slot.as_mut())
    }

    /// Returns `true` if `id` refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of slots in the arena, tombstones included. Upper bound for
    /// every live [`NodeId`].
    pub(crate) fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Number of live nodes in the whole arena, detached subtrees included.
    pub fn num_live(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    /// Number of nodes reachable from `root`, `root` included.
    pub fn num_nodes(&self, root: NodeId) -> usize {
        self.traverse(root, Strategy::Preorder).count()
    }

    /// Number of leaves under `root` (a lone leaf counts itself).
    pub fn num_leaves(&self, root: NodeId) -> usize {
        self.leaves(root).count()
    }

    /// Walks parent links from `id` up to the root of its containing
    /// structure and returns that root.
    pub fn tree_root_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self[current].parent() {
            current = parent;
        }
        current
    }

    /// Returns `true` if `ancestor` lies on the parent chain of `id`
    /// (a node is not its own ancestor).
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self[id].parent();
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self[parent].parent();
        }
        false
    }

    /// Sister nodes of `id`: the other children of its parent, in order.
    pub fn sisters(&self, id: NodeId) -> Vec<NodeId> {
        match self[id].parent() {
            Some(parent) => {
                self[parent].children().iter().copied().filter(|&c| c != id).collect()
            }
            None => Vec::new(),
        }
    }
}

impl Default for Tree {
    fn default() -> Self {
        Tree::new()
    }
}

impl std::ops::Index<NodeId> for Tree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        self.get(id).expect("node id is dead or out of bounds")
    }
}

impl std::ops::IndexMut<NodeId> for Tree {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        self.get_mut(id).expect("node id is dead or out of bounds")
    }
}

// ============================================================================
// Traversal & queries (pub)
// ============================================================================
impl Tree {
    /// Returns a lazy one-shot iterator over the nodes reachable from
    /// `root`, `root` included, in the order given by `strategy`.
    ///
    /// Every reachable node is visited exactly once. The iterator borrows
    /// the tree, so no mutation can happen while it is in flight.
    pub fn traverse(&self, root: NodeId, strategy: Strategy) -> Traverse<'_> {
        Traverse::new(self, root, strategy)
    }

    /// Iterates over all nodes strictly below `root`.
    pub fn descendants(
        &self,
        root: NodeId,
        strategy: Strategy,
    ) -> impl Iterator<Item = NodeId> + '_ {
        self.traverse(root, strategy).filter(move |&id| id != root)
    }

    /// Iterates over the leaves under `root` in preorder (left to right).
    pub fn leaves(&self, root: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.traverse(root, Strategy::Preorder).filter(|&id| self[id].is_leaf())
    }

    /// Iterates over the names of named leaves under `root`.
    pub fn leaf_names(&self, root: NodeId) -> impl Iterator<Item = &str> + '_ {
        self.leaves(root).filter_map(|id| self[id].name())
    }

    /// Iterates over the ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut current = self[id].parent();
        std::iter::from_fn(move || {
            let parent = current?;
            current = self[parent].parent();
            Some(parent)
        })
    }

    /// Lazily yields nodes under `root` whose attributes match every
    /// `(key, value)` condition.
    ///
    /// A node matches iff it has each named attribute set to exactly the
    /// expected value. Matches are yielded as they are found, so huge trees
    /// need not be fully scanned to obtain the first hit.
    pub fn iter_search<'a>(
        &'a self,
        root: NodeId,
        conditions: &'a [(&'a str, AttrValue)],
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.traverse(root, Strategy::Levelorder).filter(move |&id| {
            conditions.iter().all(|(key, expected)| self[id].attr(key) == Some(expected))
        })
    }

    /// Returns all nodes under `root` matching the given attribute
    /// conditions. See [`Tree::iter_search`].
    pub fn search_nodes(&self, root: NodeId, conditions: &[(&str, AttrValue)]) -> Vec<NodeId> {
        self.iter_search(root, conditions).collect()
    }

    /// Returns all leaves under `root` with the given name.
    pub fn leaves_by_name(&self, root: NodeId, name: &str) -> Vec<NodeId> {
        self.leaves(root).filter(|&id| self[id].name() == Some(name)).collect()
    }

    /// Resolves a [`NodeRef`] against the structure under `root`.
    ///
    /// # Errors
    /// - [`TreeError::NodeNotFound`] if a name matches no node
    /// - [`TreeError::AmbiguousReference`] if a name matches several nodes
    /// - [`TreeError::DisconnectedNodes`] if an id is dead or not reachable
    ///   from `root`
    pub fn resolve(&self, root: NodeId, node: NodeRef<'_>) -> Result<NodeId, TreeError> {
        match node {
            NodeRef::Id(id) => {
                if !self.contains(id) || (id != root && !self.is_ancestor(root, id)) {
                    return Err(TreeError::DisconnectedNodes);
                }
                Ok(id)
            }
            NodeRef::Name(name) => {
                let conditions = [(NAME_ATTR, AttrValue::Text(name.to_string()))];
                let mut matches = self.iter_search(root, &conditions);
                let first =
                    matches.next().ok_or_else(|| TreeError::NodeNotFound(name.to_string()))?;
                let extra = matches.count();
                if extra > 0 {
                    return Err(TreeError::AmbiguousReference {
                        name: name.to_string(),
                        matches: extra + 1,
                    });
                }
                Ok(first)
            }
        }
    }
}

// ============================================================================
// Topology editing (pub)
// ============================================================================
impl Tree {
    /// Creates a standalone node in the arena: no parent, no children.
    pub fn new_node(&mut self) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Some(Node::new()));
        id
    }

    /// Creates a new empty node and appends it as the last child of
    /// `parent`, returning its id.
    pub fn add_child(&mut self, parent: NodeId) -> NodeId {
        let child = self.new_node();
        self[child].parent = Some(parent);
        self[parent].children.push(child);
        child
    }

    /// Attaches a child to `parent`, with optional overrides for its label,
    /// branch length, and support.
    ///
    /// If `child` is `None`, a new empty node is created and attached.
    /// Overrides are coerced before any structural change, so a bad
    /// override leaves the tree in its pre-call state.
    ///
    /// # Errors
    /// - [`TreeError::TypeCoercionFailure`] if `dist` or `support` is not
    ///   numeric
    /// - [`TreeError::InvalidTopology`] if attaching an existing node would
    ///   break the linkage invariants (see [`Tree::attach`])
    pub fn add_child_with(
        &mut self,
        parent: NodeId,
        child: Option<NodeId>,
        options: ChildOptions,
    ) -> Result<NodeId, TreeError> {
        // Coerce first: fail before touching the structure
        let dist = options.dist.map(|v| v.to_f64()).transpose()?;
        let support = options.support.map(|v| v.to_f64()).transpose()?;

        let child = match child {
            Some(existing) => self.attach(parent, existing)?,
            None => self.add_child(parent),
        };

        let node = &mut self[child];
        if let Some(name) = options.name {
            node.set_name(name.to_string());
        }
        if let Some(dist) = dist {
            node.dist = dist;
        }
        if let Some(support) = support {
            node.support = support;
        }
        Ok(child)
    }

    /// Appends an existing rootless node as the last child of `parent`.
    ///
    /// # Errors
    /// [`TreeError::InvalidTopology`] if `child` already has a parent, if
    /// `child == parent`, or if `child` is an ancestor of `parent` (either
    /// would create a cycle or a duplicate child entry).
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, TreeError> {
        if self[child].parent().is_some() {
            return Err(TreeError::topology("child already has a parent; detach it first"));
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(TreeError::topology("child is an ancestor of the target parent"));
        }
        self[child].parent = Some(parent);
        self[parent].children.push(child);
        Ok(child)
    }

    /// Adds a sister to `id`: a new or existing node attached to `id`'s
    /// parent.
    ///
    /// # Errors
    /// [`TreeError::InvalidTopology`] if `id` is a root, plus the errors of
    /// [`Tree::add_child_with`].
    pub fn add_sister(
        &mut self,
        id: NodeId,
        sister: Option<NodeId>,
        options: ChildOptions,
    ) -> Result<NodeId, TreeError> {
        let parent = self[id]
            .parent()
            .ok_or_else(|| TreeError::topology("a parent node is required to add a sister"))?;
        self.add_child_with(parent, sister, options)
    }

    /// Removes `child` from `parent`'s child list and clears its parent
    /// link. The child keeps its own subtree and becomes a secondary root.
    ///
    /// # Errors
    /// [`TreeError::InvalidTopology`] if `child` is not currently a child
    /// of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, TreeError> {
        let position = self[parent]
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or_else(|| TreeError::topology("node is not a child of the given parent"))?;
        self[parent].children.remove(position);
        self[child].parent = None;
        Ok(child)
    }

    /// Removes the first sister of `id` (or the given one) from their
    /// shared parent, returning the removed node.
    ///
    /// Returns `None` when `id` has no sisters.
    pub fn remove_sister(&mut self, id: NodeId, sister: Option<NodeId>) -> Option<NodeId> {
        let parent = self[id].parent()?;
        let sister = sister.or_else(|| self.sisters(id).first().copied())?;
        self.remove_child(parent, sister).ok()
    }

    /// Detaches `id` from its parent and returns it. The subtree below it
    /// stays intact and independently owned by the caller. A no-op if `id`
    /// is already rootless.
    pub fn detach(&mut self, id: NodeId) -> NodeId {
        if let Some(parent) = self[id].parent() {
            // Cannot fail: parent link and child list are kept in sync
            let _ = self.remove_child(parent, id);
        }
        id
    }

    /// Elides a node: its children are re-parented, in order, onto its
    /// former parent, then the node itself is removed from the tree.
    ///
    /// With `prevent_single_child`, any ancestor left with fewer than two
    /// children by the removal is elided as well; the cascade is a loop,
    /// not recursion, so arbitrarily deep chains are safe. Deleting a root
    /// is a no-op apart from its children conceptually keeping their own
    /// subtrees.
    pub fn delete(&mut self, id: NodeId, prevent_single_child: bool) {
        let Some(parent) = self[id].parent() else {
            return;
        };
        self.elide(id, parent);

        if prevent_single_child {
            let mut current = parent;
            while self[current].children.len() < 2 {
                let Some(above) = self[current].parent() else {
                    break;
                };
                self.elide(current, above);
                current = above;
            }
        }
    }

    /// Transfers `id`'s children onto `parent`, unlinks `id`, and
    /// tombstones its slot.
    fn elide(&mut self, id: NodeId, parent: NodeId) {
        let children = std::mem::take(&mut self[id].children);
        for &child in &children {
            self[child].parent = Some(parent);
        }
        let position = self[parent]
            .children
            .iter()
            .position(|&c| c == id)
            .expect("parent/child links out of sync");
        self[parent].children.splice(position..=position, children);
        self.nodes[id] = None;
    }

    /// Reverses the child order of `id`.
    pub fn swap_children(&mut self, id: NodeId) {
        if self[id].children.len() > 1 {
            self[id].children.reverse();
        }
    }

    /// Reduces the structure under `root` to the minimal topology
    /// connecting exactly the nodes in `keep` and their necessary
    /// branching ancestors.
    ///
    /// Postorder-marks every node that is in `keep` or has a marked
    /// descendant; detaches each unmarked node whose parent is marked, so
    /// one cut removes a whole unmarked subtree; then elides every
    /// surviving single-child node, including below a single-child root
    /// that was not itself kept. Cut subtrees are released from the arena.
    ///
    /// # Errors
    /// Name resolution errors from [`Tree::resolve`]; the tree is not
    /// modified if any `keep` entry fails to resolve.
    pub fn prune(&mut self, root: NodeId, keep: &[NodeRef<'_>]) -> Result<(), TreeError> {
        let mut kept: Vec<NodeId> = Vec::with_capacity(keep.len());
        for node in keep {
            kept.push(self.resolve(root, *node)?);
        }

        // Postorder marking: a node survives if it is kept or any child is
        let order: Vec<NodeId> = self.traverse(root, Strategy::Postorder).collect();
        let mut marked = vec![false; self.capacity()];
        for &id in &order {
            marked[id] =
                kept.contains(&id) || self[id].children().iter().any(|&c| marked[c]);
        }

        // One cut per unmarked subtree hanging off a marked node
        let mut cut = 0usize;
        for &id in &order {
            if marked[id] {
                continue;
            }
            if self[id].parent().is_some_and(|p| marked[p]) {
                self.detach(id);
                self.release_subtree(id);
                cut += 1;
            }
        }

        // Elide spurious single-child branch points among the survivors
        let survivors: Vec<NodeId> =
            self.traverse(root, Strategy::Postorder).filter(|&id| id != root).collect();
        for id in survivors {
            if self.contains(id) && self[id].children.len() == 1 {
                self.delete(id, false);
            }
        }
        if self[root].children.len() == 1 && !kept.contains(&root) {
            let only = self[root].children[0];
            if !kept.contains(&only) {
                self.delete(only, false);
            }
        }

        debug!(kept = kept.len(), cut, "pruned tree");
        Ok(())
    }

    /// Tombstones every node of a detached subtree.
    fn release_subtree(&mut self, root: NodeId) {
        let ids: Vec<NodeId> = self.traverse(root, Strategy::Preorder).collect();
        for id in ids {
            self.nodes[id] = None;
        }
    }
}

// ============================================================================
// Copying & population (pub)
// ============================================================================
impl Tree {
    /// Deep-copies the subtree rooted at `id` into a fresh arena.
    ///
    /// The clone shares no node identity with the source. Only the nodes
    /// below `id` are walked and the copy's root has no parent, so the
    /// clone can never reach the source's ancestors.
    pub fn copy_subtree(&self, id: NodeId) -> Tree {
        let mut copy = Tree::new();
        // Map source ids to clone ids, seeded with the new root
        let mut remap = vec![usize::MAX; self.capacity()];
        remap[id] = copy.root();

        for source in self.traverse(id, Strategy::Preorder) {
            let target = remap[source];
            let node = &self[source];
            copy[target].dist = node.dist;
            copy[target].support = node.support;
            copy[target].attrs = node.attrs.clone();
            for &child in node.children() {
                remap[child] = copy.add_child(target);
            }
        }
        copy
    }

    /// Grows the structure under `root` until it holds `size` additional
    /// leaves, adding internal nodes as required.
    ///
    /// Names are drawn from `names_library` (without replacement unless
    /// `reuse_names`), falling back to random five-letter strings once the
    /// library is exhausted; branch lengths are uniform in `[0, 1)`.
    pub fn populate<R: Rng>(
        &mut self,
        rng: &mut R,
        root: NodeId,
        size: usize,
        names_library: &[String],
        reuse_names: bool,
    ) {
        const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

        let mut names: Vec<String> = names_library.to_vec();
        let mut terminal: Vec<NodeId> = self.leaves(root).collect();
        // Single-child branch points can absorb a new leaf without losing one
        let mut single: Vec<NodeId> = self
            .traverse(root, Strategy::Preorder)
            .filter(|&id| self[id].children().len() == 1)
            .collect();

        // Growing below a leaf root turns the root itself non-terminal
        let target_count =
            terminal.len() + if self[root].is_leaf() { size.saturating_sub(1) } else { size };

        while terminal.len() < target_count {
            let target = if single.is_empty() {
                let pick = rng.gen_range(0..terminal.len());
                let target = terminal.swap_remove(pick);
                single.push(target);
                target
            } else {
                let pick = rng.gen_range(0..single.len());
                single.swap_remove(pick)
            };

            let name: String = if names.is_empty() {
                (0..5)
                    .map(|_| *CHARSET.choose(rng).expect("charset is non-empty") as char)
                    .collect()
            } else if reuse_names {
                names.choose(rng).expect("names is non-empty").clone()
            } else {
                let pick = rng.gen_range(0..names.len());
                names.swap_remove(pick)
            };

            let child = self.add_child(target);
            self[child].set_name(name);
            self[child].dist = rng.gen_range(0.0..1.0);
            terminal.push(child);
        }
    }
}
