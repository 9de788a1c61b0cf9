//! Plain-text rendering of trees for debugging and terminal output.

use std::fmt;

use crate::model::node::NodeId;
use crate::model::traverse::Strategy;
use crate::model::tree::Tree;

/// Width of the horizontal connector drawn for each edge.
const LEN: usize = 5;

impl Tree {
    /// Renders the subtree under `root` as ASCII art, one leaf per row.
    ///
    /// `show_internal` overlays internal node names onto their connector
    /// stems; `compact` drops the blank rows between sibling subtrees.
    ///
    /// ```text
    ///       /-A
    ///    /-|
    ///   |   \-B
    /// --|
    ///    \-C
    /// ```
    pub fn to_ascii(&self, root: NodeId, show_internal: bool, compact: bool) -> String {
        let (lines, _) = self.render_ascii(root, show_internal, compact);
        lines.join("\n")
    }

    /// Builds the art bottom-up: each node's block is assembled from its
    /// children's finished blocks, with the child's connector byte patched
    /// to `/`, `\` or `-` by its position in the sibling list. Returns the
    /// block and the row its own connector sits on.
    fn render_ascii(
        &self,
        root: NodeId,
        show_internal: bool,
        compact: bool,
    ) -> (Vec<String>, usize) {
        let pad = " ".repeat(LEN);
        let bar = format!("{}|", " ".repeat(LEN - 1));

        let mut blocks: Vec<Option<(Vec<String>, usize)>> = vec![None; self.capacity()];
        let order: Vec<NodeId> = self.traverse(root, Strategy::Postorder).collect();

        for id in order {
            let name = self[id].name().unwrap_or("").to_string();
            if self[id].is_leaf() {
                blocks[id] = Some((vec![format!("--{name}")], 0));
                continue;
            }

            let arity = self[id].children().len();
            let mut result: Vec<String> = Vec::new();
            let mut mids: Vec<usize> = Vec::new();
            for (i, &child) in self[id].children().iter().enumerate() {
                let connector = if i == 0 {
                    '/'
                } else if i == arity - 1 {
                    '\\'
                } else {
                    '-'
                };
                let (mut child_lines, child_mid) =
                    blocks[child].take().expect("children render before parents");
                child_lines[child_mid].replace_range(0..1, &connector.to_string());
                mids.push(child_mid + result.len());
                result.extend(child_lines);
                if !compact {
                    result.push(String::new());
                }
            }
            if !compact {
                result.pop();
            }

            let (lo, hi) = (mids[0], mids[arity - 1]);
            let end = result.len();
            let mut prefixes: Vec<&str> = Vec::with_capacity(end);
            prefixes.extend(std::iter::repeat_n(pad.as_str(), lo + 1));
            prefixes.extend(std::iter::repeat_n(bar.as_str(), hi.saturating_sub(lo + 1)));
            prefixes.extend(std::iter::repeat_n(pad.as_str(), end - hi));

            let mid = (lo + hi) / 2;
            let stem_tail = prefixes[mid].chars().last().unwrap_or(' ');
            let stem = format!("-{}{stem_tail}", "-".repeat(LEN - 2));

            let mut merged: Vec<String> = Vec::with_capacity(end);
            for (row, line) in result.iter().enumerate() {
                if row == mid {
                    merged.push(format!("{stem}{line}"));
                } else {
                    merged.push(format!("{}{line}", prefixes[row]));
                }
            }

            if show_internal && !name.is_empty() {
                let old = &merged[mid];
                let mut overlaid: String = old.chars().take(1).collect();
                overlaid.push_str(&name);
                overlaid.extend(old.chars().skip(name.chars().count() + 1));
                merged[mid] = overlaid;
            }

            blocks[id] = Some((merged, mid));
        }

        blocks[root].take().expect("root renders last")
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_ascii(self.root(), false, false))
    }
}
