//! Error type shared by all fallible tree operations.
//!
//! This is a library, not a service: every error is raised synchronously at
//! the point of detection and recovery policy belongs to the caller. No
//! operation partially mutates the tree and then fails; validation that
//! cannot be undone (notably the self-as-outgroup check in rerooting) runs
//! before any structural change begins.

use thiserror::Error;

/// Errors raised by tree construction, queries, and topology surgery.
#[derive(Debug, Error)]
pub enum TreeError {
    /// A structural precondition was violated, e.g. using a node as its own
    /// outgroup, attaching a node to one of its own descendants, or removing
    /// a child from a node that does not hold it.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// A name-based lookup matched no node.
    #[error("no node named {0:?}")]
    NodeNotFound(String),

    /// A name-based lookup matched more than one node where exactly one was
    /// required.
    #[error("ambiguous node name {name:?}: {matches} matches")]
    AmbiguousReference { name: String, matches: usize },

    /// Distance or common-ancestor computation over nodes that do not share
    /// a root context (e.g. one of them sits in a detached subtree).
    #[error("nodes are not connected")]
    DisconnectedNodes,

    /// A value could not be coerced to the numeric type a field requires,
    /// e.g. a non-numeric branch length or support override.
    #[error("cannot coerce {value:?} to {target}")]
    TypeCoercionFailure { value: String, target: &'static str },

    /// Malformed Newick input. Carries the byte position and a short excerpt
    /// of the input around it.
    #[error("invalid newick at byte {position}: {message}{}", fmt_context(.context))]
    Parse {
        position: usize,
        message: String,
        context: String,
    },

    /// I/O failure while reading or writing a Newick file.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn fmt_context(context: &str) -> String {
    if context.is_empty() {
        String::new()
    } else {
        format!(" (near {context:?})")
    }
}

impl TreeError {
    /// Shorthand for [`TreeError::InvalidTopology`].
    pub(crate) fn topology(msg: impl Into<String>) -> Self {
        TreeError::InvalidTopology(msg.into())
    }

    /// Shorthand for [`TreeError::TypeCoercionFailure`].
    pub(crate) fn coercion(value: impl Into<String>, target: &'static str) -> Self {
        TreeError::TypeCoercionFailure { value: value.into(), target }
    }
}
