//! Newick serialization for [Tree](crate::model::tree::Tree)s.
//!
//! Supports the numbered format levels commonly used by phylogenetics
//! tooling, plus NHX (`[&&NHX:key=value]`) annotation blocks for arbitrary
//! node attributes.
//!
//! # Format
//! The Newick format has the following structure (n-ary, not binary):
//! * tree ::= node ';'
//! * node ::= leaf | internal
//! * internal ::= '(' node (',' node)* ')' [label] [branch_length] [nhx]
//! * leaf ::= [label] [branch_length] [nhx]
//! * branch_length ::= ':' number
//! * nhx ::= '[&&NHX:' key '=' value (':' key '=' value)* ']'
//!
//! Whitespace and bracketed comments may appear between tokens. Labels may
//! be quoted in single quotes, with `''` escaping an embedded quote.
//!
//! # Format levels
//! Levels control which fields are written (and, for the bare token after a
//! `)`, whether it reads as a support value or a name):
//!
//! | level | leaf name | leaf dist | internal name | internal support | internal dist |
//! |-------|-----------|-----------|---------------|------------------|---------------|
//! | 0, 2  | yes       | yes       |               | yes              | yes           |
//! | 1, 3  | yes       | yes       | yes           |                  | yes           |
//! | 4     | yes       | yes       |               |                  |               |
//! | 5     | yes       | yes       |               |                  | yes           |
//! | 6     | yes       |           |               |                  | yes           |
//! | 7     | yes       | yes       | yes           |                  |               |
//! | 8     | yes       |           | yes           |                  |               |
//! | 9     | yes       |           |               |                  |               |
//! | 100   |           |           |               |                  |               |

pub mod parser;
pub mod writer;

pub use parser::{parse_file, parse_str, parse_str_with};
pub use writer::{to_newick, write_newick_file};

use crate::error::TreeError;

/// Field selection for one Newick format level.
///
/// The parser is tolerant: it accepts any field the grammar allows and uses
/// the selection only to decide whether a bare token after `)` is a support value
/// or an internal node name. The writer emits exactly the selected fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatSpec {
    pub leaf_name: bool,
    pub leaf_dist: bool,
    pub internal_name: bool,
    pub internal_support: bool,
    pub internal_dist: bool,
}

impl FormatSpec {
    /// Level 0: leaf names and distances, internal supports and distances.
    pub const FLEXIBLE: FormatSpec = FormatSpec {
        leaf_name: true,
        leaf_dist: true,
        internal_name: false,
        internal_support: true,
        internal_dist: true,
    };

    /// Looks up the field selection for a numbered format level.
    ///
    /// # Returns
    /// * `Ok(FormatSpec)` - For levels 0-9 and 100
    /// * `Err(TreeError::Parse)` - For any other level
    pub fn level(level: u8) -> Result<FormatSpec, TreeError> {
        let (leaf_name, leaf_dist, internal_name, internal_support, internal_dist) = match level {
            0 | 2 => (true, true, false, true, true),
            1 | 3 => (true, true, true, false, true),
            4 => (true, true, false, false, false),
            5 => (true, true, false, false, true),
            6 => (true, false, false, false, true),
            7 => (true, true, true, false, false),
            8 => (true, false, true, false, false),
            9 => (true, false, false, false, false),
            100 => (false, false, false, false, false),
            other => {
                return Err(TreeError::Parse {
                    position: 0,
                    message: format!("unknown newick format level {other}"),
                    context: String::new(),
                });
            }
        };
        Ok(FormatSpec { leaf_name, leaf_dist, internal_name, internal_support, internal_dist })
    }
}

impl Default for FormatSpec {
    fn default() -> Self {
        FormatSpec::FLEXIBLE
    }
}
