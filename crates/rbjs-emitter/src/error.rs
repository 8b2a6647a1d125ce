//! Fatal conversion errors.
//!
//! There is no recovery: the first error aborts the conversion and no
//! partial output is produced.

use rbjs_common::diagnostics::codes;
use rbjs_common::{Diagnostic, DiagnosticCategory, SourceLocation};
use rbjs_tree::Node;

pub type ConvertResult<T> = Result<T, ConvertError>;

#[derive(Clone, Debug, thiserror::Error)]
pub enum ConvertError {
    /// The node type is understood but cannot be represented under the
    /// active configuration.
    #[error("{message}")]
    Unsupported { message: String, node: Box<Node> },

    /// A node's arity or child types violate a handler's precondition.
    #[error("malformed node, expected {expected}")]
    Malformed { expected: String, node: Box<Node> },

    /// A filter registered a setup token that no filter in the stack knows
    /// how to declare.
    #[error("no filter provides a declaration for setup token '{token}'")]
    UnresolvedSetup { token: &'static str },

    #[error("nesting too deep")]
    TooDeep { node: Box<Node> },
}

impl ConvertError {
    pub fn unsupported(message: impl Into<String>, node: &Node) -> Self {
        ConvertError::Unsupported {
            message: message.into(),
            node: Box::new(node.clone()),
        }
    }

    pub fn malformed(expected: impl Into<String>, node: &Node) -> Self {
        ConvertError::Malformed {
            expected: expected.into(),
            node: Box::new(node.clone()),
        }
    }

    /// The offending node, if the error is tied to one.
    pub fn node(&self) -> Option<&Node> {
        match self {
            ConvertError::Unsupported { node, .. }
            | ConvertError::Malformed { node, .. }
            | ConvertError::TooDeep { node } => Some(node.as_ref()),
            ConvertError::UnresolvedSetup { .. } => None,
        }
    }

    pub fn location(&self) -> Option<SourceLocation> {
        self.node().and_then(Node::location)
    }

    pub fn category(&self) -> DiagnosticCategory {
        match self {
            ConvertError::Unsupported { .. } | ConvertError::TooDeep { .. } => {
                DiagnosticCategory::UnsupportedConstruct
            }
            ConvertError::Malformed { .. } | ConvertError::UnresolvedSetup { .. } => {
                DiagnosticCategory::MalformedInput
            }
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            ConvertError::Unsupported { .. } => codes::UNSUPPORTED_CONSTRUCT,
            ConvertError::Malformed { .. } => codes::MALFORMED_NODE,
            ConvertError::UnresolvedSetup { .. } => codes::UNRESOLVED_SETUP_TOKEN,
            ConvertError::TooDeep { .. } => codes::NESTING_TOO_DEEP,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diagnostic = Diagnostic::new(self.category(), self.code(), self.to_string())
            .with_location(self.location());
        match self.node() {
            Some(node) => diagnostic.with_node(node.to_string()),
            None => diagnostic,
        }
    }
}
