//! Conversion options.
//!
//! Options are immutable for the duration of a conversion and may be shared
//! between conversions running on different threads.

use rbjs_common::EsLevel;
use rbjs_common::limits::DEFAULT_REGEXP_SLASH_LIMIT;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// How Ruby `==`/`!=` are emitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    /// `==` / `!=`
    #[default]
    Equality,
    /// `===` / `!==`
    Identity,
}

impl Comparison {
    pub fn equal(self) -> &'static str {
        match self {
            Comparison::Equality => "==",
            Comparison::Identity => "===",
        }
    }

    pub fn not_equal(self) -> &'static str {
        match self {
            Comparison::Equality => "!=",
            Comparison::Identity => "!==",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConvertOptions {
    pub es_level: EsLevel,
    pub comparison: Comparison,
    /// Patterns with at most this many unescaped `/` use the `/.../` literal
    /// form; above it they are built with `new RegExp(...)`.
    pub regexp_slash_limit: usize,
    /// Per-filter settings keyed by filter name. Opaque to the core.
    pub filter_options: FxHashMap<String, serde_json::Value>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            es_level: EsLevel::default(),
            comparison: Comparison::default(),
            regexp_slash_limit: DEFAULT_REGEXP_SLASH_LIMIT,
            filter_options: FxHashMap::default(),
        }
    }
}

impl ConvertOptions {
    pub fn with_es_level(es_level: EsLevel) -> Self {
        ConvertOptions {
            es_level,
            ..ConvertOptions::default()
        }
    }

    #[inline]
    pub fn es2015(&self) -> bool {
        self.es_level.is_block_scoped()
    }

    /// Settings a peripheral filter registered under `name`, if any.
    pub fn filter_option(&self, name: &str) -> Option<&serde_json::Value> {
        self.filter_options.get(name)
    }
}
