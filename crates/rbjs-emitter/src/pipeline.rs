//! Conversion driver: filter pass, setup materialization, code generation.

use crate::emitter::Converter;
use crate::error::ConvertResult;
use crate::filter::{FilterContext, SharedFilter};
use crate::options::ConvertOptions;
use crate::setup;
use rbjs_tree::Node;
use tracing::debug;

/// An ordered filter stack plus the options every stage reads.
///
/// A pipeline holds no per-conversion state, so one instance can run any
/// number of conversions, concurrently if needed.
#[derive(Clone, Default)]
pub struct Pipeline {
    filters: Vec<SharedFilter>,
    options: ConvertOptions,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field(
                "filters",
                &self.filters.iter().map(|x| x.name()).collect::<Vec<_>>(),
            )
            .field("options", &self.options)
            .finish()
    }
}

impl Pipeline {
    pub fn new(options: ConvertOptions) -> Self {
        Pipeline {
            filters: Vec::new(),
            options,
        }
    }

    /// Append a filter to the end of the stack.
    pub fn with_filter(mut self, filter: SharedFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn filters(&self) -> &[SharedFilter] {
        &self.filters
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Run the filter stack over `tree` and prepend the setup declarations
    /// the filters asked for.
    #[tracing::instrument(level = "debug", skip_all, fields(filters = self.filters.len()))]
    pub fn normalize(&self, tree: &Node) -> ConvertResult<Node> {
        let mut cx = FilterContext::new(&self.filters, &self.options);
        let normalized = cx.process(tree)?;
        let tokens = cx.into_setup();
        debug!(tokens = tokens.len(), "filter pass finished");
        setup::materialize(&self.filters, &tokens, normalized)
    }

    /// Normalize `tree` and emit it as target text.
    #[tracing::instrument(level = "debug", skip_all, fields(es_level = %self.options.es_level))]
    pub fn convert(&self, tree: &Node) -> ConvertResult<String> {
        let normalized = self.normalize(tree)?;
        Converter::new(&self.options).convert(&normalized)
    }
}
