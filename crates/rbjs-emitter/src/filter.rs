//! Filter protocol.
//!
//! A filter is a partial rewrite over node types. The stack is an ordered
//! list; dispatch starts at the first filter and each filter receives a
//! `Next` continuation standing for "the rest of the stack". For a given
//! node a filter either
//!
//! - returns a replacement, sending any newly constructed node back through
//!   `FilterContext::process` so it is fully normalized before being
//!   embedded,
//! - calls `next.run(node, cx)` to fall through, or
//! - returns a `ConvertError` for a construct it must reject.
//!
//! After the last filter an identity terminal rebuilds the node with every
//! nested child processed. Re-running the stack on its own output must
//! return that output unchanged, so a filter's replacement must never match
//! the filter again.
//!
//! Filters may also register setup tokens (once-only boilerplate such as
//! `fs = require("fs")`). Tokens are collected in the context during the
//! pass and materialized by the pipeline afterwards.

use crate::error::{ConvertError, ConvertResult};
use crate::options::ConvertOptions;
use rbjs_common::EsLevel;
use rbjs_common::limits::MAX_FILTER_DEPTH;
use rbjs_tree::Node;
use rustc_hash::FxHashSet;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Name of a piece of once-only boilerplate a filter may require.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SetupToken(pub &'static str);

impl SetupToken {
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for SetupToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A rewrite pass over the canonical tree.
pub trait Filter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Rewrite `node`, or fall through with `next.run(node, cx)`.
    fn rewrite(&self, node: &Node, cx: &mut FilterContext<'_>, next: Next) -> ConvertResult<Node> {
        next.run(node, cx)
    }

    /// Tokens this filter can declare, in canonical order.
    fn setup_tokens(&self) -> &'static [SetupToken] {
        &[]
    }

    /// The declaration for one of this filter's tokens.
    fn setup_declaration(&self, _token: SetupToken) -> Option<Node> {
        None
    }
}

pub type SharedFilter = Arc<dyn Filter>;

/// Continuation standing for the filters after the current one.
#[derive(Clone, Copy, Debug)]
pub struct Next {
    index: usize,
}

impl Next {
    pub fn run(self, node: &Node, cx: &mut FilterContext<'_>) -> ConvertResult<Node> {
        cx.dispatch(self.index, node)
    }
}

/// Per-conversion state threaded through the filter pass.
pub struct FilterContext<'a> {
    filters: &'a [SharedFilter],
    options: &'a ConvertOptions,
    setup: FxHashSet<SetupToken>,
    depth: u32,
}

impl<'a> FilterContext<'a> {
    pub fn new(filters: &'a [SharedFilter], options: &'a ConvertOptions) -> Self {
        FilterContext {
            filters,
            options,
            setup: FxHashSet::default(),
            depth: 0,
        }
    }

    #[inline]
    pub fn options(&self) -> &'a ConvertOptions {
        self.options
    }

    #[inline]
    pub fn es_level(&self) -> EsLevel {
        self.options.es_level
    }

    /// Run `node` through the whole stack, starting at the first filter.
    pub fn process(&mut self, node: &Node) -> ConvertResult<Node> {
        if self.depth >= MAX_FILTER_DEPTH {
            return Err(ConvertError::TooDeep {
                node: Box::new(node.clone()),
            });
        }
        self.depth += 1;
        let result = self.dispatch(0, node);
        self.depth -= 1;
        result
    }

    /// Process each node in order.
    pub fn process_all<'n>(&mut self, nodes: impl IntoIterator<Item = &'n Node>) -> ConvertResult<Vec<Node>> {
        nodes.into_iter().map(|node| self.process(node)).collect()
    }

    /// Record that the output needs the boilerplate named by `token`.
    pub fn require_setup(&mut self, token: SetupToken) {
        if self.setup.insert(token) {
            trace!(token = token.name(), "setup token registered");
        }
    }

    pub fn requires_setup(&self, token: SetupToken) -> bool {
        self.setup.contains(&token)
    }

    pub(crate) fn into_setup(self) -> FxHashSet<SetupToken> {
        self.setup
    }

    fn dispatch(&mut self, index: usize, node: &Node) -> ConvertResult<Node> {
        let filters = self.filters;
        match filters.get(index) {
            Some(filter) => filter.rewrite(node, self, Next { index: index + 1 }),
            None => node.try_map_nodes(|child| self.process(child)),
        }
    }
}
