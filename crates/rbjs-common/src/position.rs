//! Source locations.
//!
//! Locations are produced by the external parser and are opaque to the
//! converter: they are carried on tree nodes, preserved across filter
//! rewrites that update a node in place, and reported back in diagnostics.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 1-based line and 0-based column in the original source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
    /// The call site was written with explicit argument parentheses.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub parens: bool,
}

impl SourceLocation {
    pub const fn new(line: u32, column: u32) -> Self {
        SourceLocation {
            line,
            column,
            parens: false,
        }
    }

    /// The same location, marked as a parenthesized call site.
    #[must_use]
    pub const fn with_parens(mut self) -> Self {
        self.parens = true;
        self
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
