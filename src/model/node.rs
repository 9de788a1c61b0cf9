//! Node type for rooted tree representation.
//!
//! A [`Node`] is the atomic tree element: id-based parent/child links,
//! branch length, support value, and a small attribute map for
//! domain metadata. Structural logic lives on [`Tree`](crate::model::tree::Tree);
//! a node on its own only maintains its link fields.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::TreeError;

/// Index of a node in a tree (arena).
pub type NodeId = usize;

/// Attribute name under which a node's label is stored.
pub const NAME_ATTR: &str = "name";

// =#========================================================================#=
// NODE
// =#========================================================================#=
/// A node of a rooted tree.
///
/// Nodes live in a [`Tree`](crate::model::tree::Tree) arena and reference
/// each other by [`NodeId`], so the parent link is a plain back-reference
/// and never an ownership relation.
///
/// # Invariants (maintained by `Tree`)
/// - A node with `parent == None` is the root of its containing structure
/// - A node with no children is a leaf; both are derived properties
/// - Every non-root node appears in exactly one parent's child list, and
///   its parent field points back at that parent
/// - The child list holds no duplicates
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Index of the parent node, `None` for a root.
    pub(crate) parent: Option<NodeId>,
    /// Indices of child nodes, in order. Each child is owned by exactly
    /// this node until detached.
    pub(crate) children: Vec<NodeId>,
    /// Branch length to the parent; meaningless on a root. Default 1.0.
    pub(crate) dist: f64,
    /// Support value of the edge to the parent. Default 1.0.
    pub(crate) support: f64,
    /// Open-ended named metadata (label, domain annotations).
    pub(crate) attrs: BTreeMap<String, AttrValue>,
}

impl Default for Node {
    fn default() -> Self {
        Node {
            parent: None,
            children: Vec::new(),
            dist: 1.0,
            support: 1.0,
            attrs: BTreeMap::new(),
        }
    }
}

impl Node {
    /// Creates a standalone node: no parent, no children, default
    /// branch length and support.
    pub fn new() -> Self {
        Node::default()
    }

    /// Returns the parent id, or `None` if this node is a root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns the ordered child ids.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Returns `true` if this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns `true` if this node has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Branch length to the parent.
    pub fn dist(&self) -> f64 {
        self.dist
    }

    /// Sets the branch length to the parent.
    pub fn set_dist(&mut self, dist: f64) {
        self.dist = dist;
    }

    /// Support value on the edge to the parent.
    pub fn support(&self) -> f64 {
        self.support
    }

    /// Sets the support value on the edge to the parent.
    pub fn set_support(&mut self, support: f64) {
        self.support = support;
    }

    /// Returns the node label (the `"name"` attribute), if set.
    pub fn name(&self) -> Option<&str> {
        match self.attrs.get(NAME_ATTR) {
            Some(AttrValue::Text(name)) => Some(name),
            _ => None,
        }
    }

    /// Sets the node label.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.attrs.insert(NAME_ATTR.to_string(), AttrValue::Text(name.into()));
    }

    /// Returns the attribute stored under `key`, if any.
    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    /// Adds or updates a named attribute.
    pub fn set_attr(&mut self, key: impl Into<String>, value: AttrValue) {
        self.attrs.insert(key.into(), value);
    }

    /// Removes a named attribute, returning its previous value.
    pub fn remove_attr(&mut self, key: &str) -> Option<AttrValue> {
        self.attrs.remove(key)
    }

    /// Iterates over all attributes in deterministic (sorted-key) order.
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }
}

// =#========================================================================#=
// ATTRIBUTE VALUES
// =#========================================================================#=
/// Value of a named node attribute.
///
/// A closed, variant-typed set rather than arbitrary dynamic values: the
/// attribute map carries domain metadata (labels, annotations) without
/// widening the structural contract of [`Node`].
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Text(String),
    Real(f64),
    Int(i64),
    Flag(bool),
}

impl AttrValue {
    /// Coerces this value to `f64`.
    ///
    /// `Real` and `Int` convert directly; `Text` is parsed as a float.
    ///
    /// # Errors
    /// [`TreeError::TypeCoercionFailure`] if the value is a flag or a
    /// non-numeric string.
    pub fn to_f64(&self) -> Result<f64, TreeError> {
        match self {
            AttrValue::Real(value) => Ok(*value),
            AttrValue::Int(value) => Ok(*value as f64),
            AttrValue::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| TreeError::coercion(text.clone(), "f64")),
            AttrValue::Flag(flag) => Err(TreeError::coercion(flag.to_string(), "f64")),
        }
    }

    /// Returns the text content if this is a `Text` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Text(text) => write!(f, "{text}"),
            AttrValue::Real(value) => write!(f, "{value}"),
            AttrValue::Int(value) => write!(f, "{value}"),
            AttrValue::Flag(flag) => write!(f, "{flag}"),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Real(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Flag(value)
    }
}
