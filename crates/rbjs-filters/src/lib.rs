//! Peripheral rewrite filters for the rbjs converter.
//!
//! Each filter is built only on the public filter protocol of
//! `rbjs-emitter`: it rewrites the node types it cares about, falls through
//! for everything else, and declares the setup tokens it may register.
//!
//! - `node` - maps Ruby's process, file and directory APIs onto Node.js
//! - `underscore` - maps collection idioms onto the Underscore library

mod builders;

pub mod node;
pub use node::NodeFilter;

pub mod underscore;
pub use underscore::UnderscoreFilter;

use rbjs_emitter::SharedFilter;
use std::sync::Arc;

const FILTERS: &[&str] = &["node", "underscore"];

/// Names accepted by [`by_name`].
pub fn available() -> &'static [&'static str] {
    FILTERS
}

/// Look a filter up by its registry name.
pub fn by_name(name: &str) -> Option<SharedFilter> {
    match name {
        "node" => Some(Arc::new(NodeFilter)),
        "underscore" => Some(Arc::new(UnderscoreFilter)),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../tests/registry_tests.rs"]
mod tests;
