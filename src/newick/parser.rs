//! Newick parsing.
//!
//! The reader is a byte-by-byte scanner over in-memory input with explicit
//! position tracking for error reporting, and the tree is built with an
//! explicit cursor rather than grammar recursion, so arbitrarily deep
//! nestings parse in constant stack space.

use std::path::Path;

use crate::error::TreeError;
use crate::model::node::{AttrValue, NodeId};
use crate::model::tree::Tree;
use crate::newick::FormatSpec;

/// Bytes that end an unquoted label.
const LABEL_DELIMITERS: &[u8] = b"(),:;[] \t\n\r";

/// Bytes shown around the failure position in parse errors.
const CONTEXT_BYTES: usize = 20;

/// Parses a single Newick tree using the flexible default format.
pub fn parse_str(input: &str) -> Result<Tree, TreeError> {
    parse_str_with(input, FormatSpec::FLEXIBLE)
}

/// Parses a single Newick tree, interpreting bare internal-node tokens per
/// the given [FormatSpec] (support value vs. internal name).
///
/// Parsing is tolerant: fields the format does not select are still accepted
/// when present in the input. Trailing whitespace and comments after the
/// terminating `;` are allowed, anything else is an error.
pub fn parse_str_with(input: &str, spec: FormatSpec) -> Result<Tree, TreeError> {
    let mut scanner = Scanner::new(input.as_bytes());
    let mut tree = Tree::new();

    scanner.skip_comment_and_whitespace()?;

    // A tree without parentheses is a single node, e.g. "A:1.0;"
    if scanner.peek() != Some(b'(') {
        let root = tree.root();
        read_node_fields(&mut scanner, &mut tree, root, false, spec)?;
    } else {
        parse_topology(&mut scanner, &mut tree, spec)?;
    }

    scanner.skip_comment_and_whitespace()?;
    if !scanner.consume_if(b';') {
        return Err(scanner.error("expected ';' at end of tree"));
    }

    scanner.skip_comment_and_whitespace()?;
    if !scanner.is_eof() {
        return Err(scanner.error("trailing content after ';'"));
    }

    Ok(tree)
}

/// Reads a file and parses its contents as one Newick tree.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Tree, TreeError> {
    let input = std::fs::read_to_string(path)?;
    parse_str(&input)
}

/// Walks the parenthesized structure with a cursor into the growing tree.
///
/// `(` descends into a fresh child, `,` moves to a fresh sibling, `)`
/// climbs back to the parent and reads its fields. The cursor is back at
/// the root when the outermost `)` closes.
fn parse_topology(
    scanner: &mut Scanner<'_>,
    tree: &mut Tree,
    spec: FormatSpec,
) -> Result<(), TreeError> {
    let mut current = tree.root();

    loop {
        scanner.skip_comment_and_whitespace()?;
        match scanner.peek() {
            Some(b'(') => {
                scanner.next();
                current = tree.add_child(current);
                scanner.skip_comment_and_whitespace()?;
                if scanner.peek() != Some(b'(') {
                    read_node_fields(scanner, tree, current, false, spec)?;
                }
            }
            Some(b',') => {
                scanner.next();
                let parent = tree[current]
                    .parent()
                    .ok_or_else(|| scanner.error("unexpected ',' outside parentheses"))?;
                current = tree.add_child(parent);
                scanner.skip_comment_and_whitespace()?;
                if scanner.peek() != Some(b'(') {
                    read_node_fields(scanner, tree, current, false, spec)?;
                }
            }
            Some(b')') => {
                scanner.next();
                current = tree[current]
                    .parent()
                    .ok_or_else(|| scanner.error("unbalanced ')'"))?;
                read_node_fields(scanner, tree, current, true, spec)?;
                if tree[current].parent().is_none() {
                    return Ok(());
                }
            }
            Some(other) => {
                return Err(scanner.error(format!("unexpected character {:?}", other as char)));
            }
            None => {
                return Err(scanner.error("unexpected end of input"));
            }
        }
    }
}

/// Reads the optional fields following a node: a bare token (label or, for
/// internal nodes under a support-bearing format, a support value), a
/// `:dist`, and an NHX annotation block.
fn read_node_fields(
    scanner: &mut Scanner<'_>,
    tree: &mut Tree,
    id: NodeId,
    internal: bool,
    spec: FormatSpec,
) -> Result<(), TreeError> {
    scanner.skip_comment_and_whitespace()?;

    let token_ahead = match scanner.peek() {
        Some(b) => !LABEL_DELIMITERS.contains(&b) || b == b'\'',
        None => false,
    };
    if token_ahead {
        let label = scanner.parse_label()?;
        if !label.is_empty() {
            match label.parse::<f64>() {
                Ok(support) if internal && spec.internal_support => {
                    tree[id].set_support(support);
                }
                _ => tree[id].set_name(&label),
            }
        }
    }

    scanner.skip_comment_and_whitespace()?;
    if scanner.consume_if(b':') {
        scanner.skip_comment_and_whitespace()?;
        let dist = scanner.parse_number("branch length")?;
        tree[id].set_dist(dist);
    }

    scanner.skip_comment_and_whitespace()?;
    if scanner.peek_is_nhx() {
        parse_nhx(scanner, tree, id)?;
    }

    Ok(())
}

/// Parses an `[&&NHX:key=value:...]` block into node attributes.
///
/// The keys `name`, `dist`, and `support` write through to the node's
/// fields; everything else lands in the attribute map with the narrowest
/// type that parses (integer, then real, then text).
fn parse_nhx(scanner: &mut Scanner<'_>, tree: &mut Tree, id: NodeId) -> Result<(), TreeError> {
    for _ in 0..b"[&&NHX".len() {
        scanner.next();
    }

    while scanner.consume_if(b':') {
        let mut key_bytes = Vec::new();
        while let Some(b) = scanner.peek() {
            if b == b'=' || b == b':' || b == b']' {
                break;
            }
            key_bytes.push(b);
            scanner.next();
        }
        let key = String::from_utf8_lossy(&key_bytes).into_owned();
        if !scanner.consume_if(b'=') {
            return Err(scanner.error(format!("NHX key {key:?} has no value")));
        }
        let mut value_bytes = Vec::new();
        while let Some(b) = scanner.peek() {
            if b == b':' || b == b']' {
                break;
            }
            value_bytes.push(b);
            scanner.next();
        }
        let value = String::from_utf8_lossy(&value_bytes).into_owned();

        match key.as_str() {
            "name" => tree[id].set_name(&value),
            "dist" => {
                let dist =
                    value.parse::<f64>().map_err(|_| TreeError::coercion(value.as_str(), "dist"))?;
                tree[id].set_dist(dist);
            }
            "support" => {
                let support =
                    value.parse::<f64>().map_err(|_| TreeError::coercion(value.as_str(), "support"))?;
                tree[id].set_support(support);
            }
            _ => {
                tree[id].set_attr(&key, infer_value(&value));
            }
        }
    }

    if !scanner.consume_if(b']') {
        return Err(scanner.error("unclosed NHX annotation"));
    }
    Ok(())
}

fn infer_value(raw: &str) -> AttrValue {
    if let Ok(i) = raw.parse::<i64>() {
        AttrValue::Int(i)
    } else if let Ok(f) = raw.parse::<f64>() {
        AttrValue::Real(f)
    } else {
        AttrValue::Text(raw.to_string())
    }
}

// =#========================================================================#=
// SCANNER
// =#========================================================================#=
/// A byte-by-byte scanner over in-memory ASCII input with support for
/// peeking, consuming, and quote-aware label parsing.
struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    #[inline(always)]
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    #[inline(always)]
    fn next(&mut self) -> Option<u8> {
        let b = self.peek();
        if b.is_some() {
            self.pos += 1;
        }
        b
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn consume_if(&mut self, ch: u8) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Checks for an NHX annotation opener without consuming it.
    fn peek_is_nhx(&self) -> bool {
        self.input[self.pos..].starts_with(b"[&&NHX")
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if b == b' ' || b == b'\t' || b == b'\n' || b == b'\r' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// Skips a bracketed comment if present. NHX annotations also start
    /// with `[` but carry data, so they are left in place for the caller.
    fn skip_comment(&mut self) -> Result<bool, TreeError> {
        if self.peek() != Some(b'[') || self.peek_is_nhx() {
            return Ok(false);
        }
        while let Some(b) = self.next() {
            if b == b']' {
                return Ok(true);
            }
        }
        Err(self.error("unclosed comment"))
    }

    fn skip_comment_and_whitespace(&mut self) -> Result<(), TreeError> {
        self.skip_whitespace();
        while self.skip_comment()? {
            self.skip_whitespace();
        }
        Ok(())
    }

    /// Parses a label, quoted or unquoted.
    ///
    /// Quoted labels are enclosed in single quotes; a quote inside the
    /// label is escaped by doubling it (`'Wilson''s'` reads as `Wilson's`).
    /// Unquoted labels run until a delimiter byte. Labels are decoded as
    /// UTF-8, replacing invalid sequences.
    fn parse_label(&mut self) -> Result<String, TreeError> {
        if self.peek() != Some(b'\'') {
            let start = self.pos;
            while let Some(b) = self.peek() {
                if LABEL_DELIMITERS.contains(&b) {
                    break;
                }
                self.pos += 1;
            }
            return Ok(String::from_utf8_lossy(&self.input[start..self.pos]).into_owned());
        }

        self.next(); // opening quote
        let mut bytes = Vec::new();
        loop {
            match self.next() {
                Some(b'\'') => {
                    if self.peek() == Some(b'\'') {
                        bytes.push(b'\'');
                        self.next();
                    } else {
                        return Ok(String::from_utf8_lossy(&bytes).into_owned());
                    }
                }
                Some(b) => bytes.push(b),
                None => return Err(self.error("unclosed quoted label")),
            }
        }
    }

    /// Parses a decimal number, supporting scientific notation. A token
    /// that is not a number is a [TreeError::TypeCoercionFailure] naming
    /// `target`.
    fn parse_number(&mut self, target: &'static str) -> Result<f64, TreeError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if LABEL_DELIMITERS.contains(&b) {
                break;
            }
            self.pos += 1;
        }
        let text = String::from_utf8_lossy(&self.input[start..self.pos]);
        text.parse::<f64>().map_err(|_| TreeError::coercion(text, target))
    }

    /// Builds a [TreeError::Parse] at the current position with a short
    /// excerpt of the upcoming input.
    fn error(&self, message: impl Into<String>) -> TreeError {
        let end = (self.pos + CONTEXT_BYTES).min(self.input.len());
        TreeError::Parse {
            position: self.pos,
            message: message.into(),
            context: String::from_utf8_lossy(&self.input[self.pos..end]).into_owned(),
        }
    }
}
