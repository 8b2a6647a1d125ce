//! Filter pipeline and JavaScript code generator for the rbjs converter.
//!
//! A conversion runs in two stages over the canonical tree from `rbjs-tree`:
//!
//! 1. **Normalization** - an ordered stack of [`Filter`]s rewrites the tree.
//!    Filters may register [`SetupToken`]s; the declarations for those are
//!    prepended once the pass is done.
//! 2. **Code generation** - [`Converter`] walks the normalized tree and
//!    writes target text, selecting declaration keywords through the
//!    [`ScopeTracker`].
//!
//! Both stages are pure with respect to the input tree. Errors are fatal and
//! no partial output is produced.
//!
//! ```ignore
//! let tree = rbjs_tree::parse_sexp("(send nil :puts (str \"hi\"))")?;
//! let js = rbjs_emitter::convert(&tree, &ConvertOptions::default())?;
//! assert_eq!(js, "puts(\"hi\")");
//! ```

pub mod options;
pub use options::{Comparison, ConvertOptions};

pub mod error;
pub use error::{ConvertError, ConvertResult};

pub mod filter;
pub use filter::{Filter, FilterContext, Next, SetupToken, SharedFilter};

mod setup;

pub mod scope;
pub use scope::ScopeTracker;

mod writer;

pub mod emitter;
pub use emitter::Converter;

pub mod pipeline;
pub use pipeline::Pipeline;

use rbjs_tree::Node;

/// Convert `tree` with no filters.
pub fn convert(tree: &Node, options: &ConvertOptions) -> ConvertResult<String> {
    Pipeline::new(options.clone()).convert(tree)
}
