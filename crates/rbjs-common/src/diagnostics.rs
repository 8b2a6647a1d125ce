//! Diagnostic Infrastructure
//!
//! Conversion is all-or-nothing: the first fatal condition aborts the whole
//! conversion. A `Diagnostic` is the serializable record of that condition,
//! suitable for tooling output. The emitter's typed error converts into it.
//!
//! Name resolution never fails (innermost enclosing body wins), so there is
//! no "ambiguous" category.

use crate::position::SourceLocation;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Diagnostic Category
// =============================================================================

/// What kind of contract a fatal diagnostic reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticCategory {
    /// The node type is understood but has no valid target representation
    /// under the active configuration.
    UnsupportedConstruct,
    /// A node violates a handler's arity or child-type precondition.
    MalformedInput,
}

impl DiagnosticCategory {
    pub fn name(&self) -> &'static str {
        match self {
            DiagnosticCategory::UnsupportedConstruct => "unsupported construct",
            DiagnosticCategory::MalformedInput => "malformed input",
        }
    }
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Stable numeric codes, one per fatal condition.
pub mod codes {
    pub const UNSUPPORTED_CONSTRUCT: u32 = 1001;
    pub const MALFORMED_NODE: u32 = 1002;
    pub const UNRESOLVED_SETUP_TOKEN: u32 = 1003;
    pub const NESTING_TOO_DEEP: u32 = 1004;
}

// =============================================================================
// Diagnostic
// =============================================================================

/// A fatal conversion diagnostic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub message_text: String,
    /// Offending node in s-expression form, when one is known.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub node: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub location: Option<SourceLocation>,
}

impl Diagnostic {
    pub fn new(category: DiagnosticCategory, code: u32, message: impl Into<String>) -> Self {
        Diagnostic {
            category,
            code,
            message_text: message.into(),
            node: None,
            location: None,
        }
    }

    #[must_use]
    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = &self.location {
            write!(f, "{location}: ")?;
        }
        write!(f, "{} RB{}: {}", self.category, self.code, self.message_text)?;
        if let Some(node) = &self.node {
            write!(f, "\n  in {node}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod tests;
