//! Conversion error types.

use rst_parser::ParseError;

/// Error that aborts a conversion. No partial output is produced.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// The input bytes are not valid UTF-8.
    #[error("input is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// A directive rejected its input (e.g. `sourcecode` without content).
    #[error("line {line}: error in \"{name}\" directive: {message}")]
    Directive {
        name: String,
        line: usize,
        message: String,
    },

    /// The source is not well-formed RST.
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// The document tree has a shape the translator cannot render.
    #[error("unsupported document structure: {0}")]
    Structure(String),
}

impl From<ParseError> for ConvertError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Syntax { line, message } => Self::Syntax { line, message },
            ParseError::Directive {
                name,
                line,
                message,
            } => Self::Directive {
                name,
                line,
                message,
            },
        }
    }
}
