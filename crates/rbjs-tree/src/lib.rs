//! Canonical syntax tree for the rbjs converter.
//!
//! Every pass (filters and the code generator) consumes and produces this
//! representation:
//!
//! - `Node` - an immutable typed node with ordered children
//! - `NodeKind` - the node type tag, an open set (unknown tags are kept)
//! - `Child` - a child node or a literal (symbol, string, number, nil)
//! - `s!` - the builder macro
//!
//! Nodes carry no parent pointers. Context is always threaded explicitly
//! by the traversal that needs it.
//!
//! Trees cross the parser boundary either as s-expression text (`sexp`) or
//! as JSON (`json`).

mod error;
pub use error::TreeError;

pub mod kind;
pub use kind::NodeKind;

pub mod node;
pub use node::{Child, Node};

pub mod sexp;
pub use sexp::parse_sexp;

pub mod json;
pub use json::from_json_str;

pub use rbjs_common::SourceLocation;

/// Build a node: `s!(Send, Child::Nil, "puts", s!(Str, Child::str("hi")))`.
///
/// Each child goes through `Child::from`, so nodes, `Option<Node>`, integers
/// and floats can be passed directly. A bare `&str` becomes a *symbol*; use
/// `Child::str` for string literals and `Child::Nil` for absent children.
#[macro_export]
macro_rules! s {
    ($kind:ident) => {
        $crate::Node::new($crate::NodeKind::$kind, ::std::vec::Vec::new())
    };
    ($kind:ident, $($child:expr),+ $(,)?) => {
        $crate::Node::new(
            $crate::NodeKind::$kind,
            ::std::vec![$($crate::Child::from($child)),+],
        )
    };
}

#[cfg(test)]
#[path = "../tests/node_tests.rs"]
mod tests;
