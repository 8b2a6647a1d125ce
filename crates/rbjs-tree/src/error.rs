/// Failure to read a serialized tree.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("unexpected character '{found}' at offset {offset}")]
    UnexpectedChar { found: char, offset: usize },

    #[error("invalid number '{text}' at offset {offset}")]
    InvalidNumber { text: String, offset: usize },

    #[error("invalid escape sequence at offset {offset}")]
    InvalidEscape { offset: usize },

    #[error("invalid location suffix at offset {offset}")]
    InvalidLocation { offset: usize },

    #[error("trailing input at offset {offset}")]
    TrailingInput { offset: usize },

    #[error("{path}: {message}")]
    Json { path: String, message: String },
}

impl TreeError {
    pub(crate) fn json(path: &str, message: impl Into<String>) -> TreeError {
        TreeError::Json {
            path: if path.is_empty() { "$".to_string() } else { path.to_string() },
            message: message.into(),
        }
    }
}
