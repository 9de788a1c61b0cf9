//! Newick format writing.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::TreeError;
use crate::model::node::{NAME_ATTR, Node, NodeId};
use crate::model::tree::Tree;
use crate::newick::FormatSpec;

/// Bytes that force a label into quotes.
const QUOTE_TRIGGERS: &[u8] = b"(),:;[]' \t\n\r";

/// Returns the Newick representation of the subtree under `root`, with
/// closing semicolon.
///
/// The [FormatSpec] selects which fields are written. `features` controls
/// NHX annotation blocks: `None` writes no block, `Some(&[])` writes every
/// attribute a node carries, and a non-empty slice writes only the named
/// attributes. The root node never gets a branch length.
///
/// # Example
/// ```
/// use treekit::model::Tree;
/// use treekit::newick::{FormatSpec, to_newick};
///
/// let mut tree = Tree::new();
/// let a = tree.add_child(tree.root());
/// tree[a].set_name("A");
/// tree[a].set_dist(1.0);
/// let b = tree.add_child(tree.root());
/// tree[b].set_name("B");
/// tree[b].set_dist(2.0);
///
/// let newick = to_newick(&tree, tree.root(), FormatSpec::level(5).unwrap(), None);
/// assert_eq!(newick, "(A:1,B:2);");
/// ```
pub fn to_newick(
    tree: &Tree,
    root: NodeId,
    spec: FormatSpec,
    features: Option<&[&str]>,
) -> String {
    let mut newick = String::with_capacity(tree.num_nodes(root) * 8);

    // Stack entries carry the index of the next child to emit, so the walk
    // needs no recursion however deep the tree is.
    let mut stack: Vec<(NodeId, usize)> = vec![(root, 0)];
    while let Some((id, next_child)) = stack.pop() {
        if tree[id].is_leaf() {
            push_fields(&mut newick, tree, id, root, spec, features);
            continue;
        }

        let arity = tree[id].children().len();
        if next_child == 0 {
            newick.push('(');
            stack.push((id, 1));
            stack.push((tree[id].children()[0], 0));
        } else if next_child < arity {
            newick.push(',');
            stack.push((id, next_child + 1));
            stack.push((tree[id].children()[next_child], 0));
        } else {
            newick.push(')');
            push_fields(&mut newick, tree, id, root, spec, features);
        }
    }

    newick.push(';');
    newick
}

/// Writes the subtree under `root` to a file as a single Newick line.
pub fn write_newick_file(
    path: impl AsRef<Path>,
    tree: &Tree,
    root: NodeId,
    spec: FormatSpec,
    features: Option<&[&str]>,
) -> Result<(), TreeError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(to_newick(tree, root, spec, features).as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Emits the fields following a node: label or support per the format, then
/// `:dist`, then an NHX block if requested.
fn push_fields(
    newick: &mut String,
    tree: &Tree,
    id: NodeId,
    root: NodeId,
    spec: FormatSpec,
    features: Option<&[&str]>,
) {
    let node = &tree[id];
    let internal = !node.is_leaf();

    let mut label_written = false;
    if internal {
        if spec.internal_name {
            if let Some(name) = node.name() {
                newick.push_str(&escape_label(name));
                label_written = true;
            }
        } else if spec.internal_support && id != root {
            newick.push_str(&node.support().to_string());
        }
    } else if spec.leaf_name {
        if let Some(name) = node.name() {
            newick.push_str(&escape_label(name));
            label_written = true;
        }
    }

    let want_dist = if internal { spec.internal_dist } else { spec.leaf_dist };
    if want_dist && id != root {
        newick.push(':');
        newick.push_str(&node.dist().to_string());
    }

    if let Some(selected) = features {
        push_nhx(newick, node, selected, label_written);
    }
}

/// Emits an `[&&NHX:...]` block for the selected attributes. An empty
/// selection means every attribute; the name attribute is skipped when it
/// was already written as the node's label.
fn push_nhx(newick: &mut String, node: &Node, selected: &[&str], label_written: bool) {
    let mut block = String::new();
    for (key, value) in node.attrs() {
        if label_written && key == NAME_ATTR {
            continue;
        }
        if !selected.is_empty() && !selected.iter().any(|&s| s == key) {
            continue;
        }
        block.push(':');
        block.push_str(key);
        block.push('=');
        block.push_str(&value.to_string());
    }

    if !block.is_empty() {
        newick.push_str("[&&NHX");
        newick.push_str(&block);
        newick.push(']');
    }
}

/// Quotes a label in single quotes when it contains Newick syntax bytes,
/// doubling any embedded quote.
fn escape_label(label: &str) -> String {
    let needs_quotes = label.bytes().any(|b| QUOTE_TRIGGERS.contains(&b));
    if !needs_quotes {
        return label.to_string();
    }

    let mut escaped = String::with_capacity(label.len() + 2);
    escaped.push('\'');
    for ch in label.chars() {
        if ch == '\'' {
            escaped.push('\'');
        }
        escaped.push(ch);
    }
    escaped.push('\'');
    escaped
}
