//! Parser error types.

/// Error raised while turning RST source into a document tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The source is not well-formed RST.
    #[error("line {line}: {message}")]
    Syntax {
        /// 1-based source line.
        line: usize,
        message: String,
    },
    /// A directive rejected its arguments, options or content.
    #[error("line {line}: error in \"{name}\" directive: {message}")]
    Directive {
        /// Directive name as written in the source.
        name: String,
        /// 1-based line of the directive marker.
        line: usize,
        message: String,
    },
}

impl ParseError {
    pub(crate) fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }

    /// Source line the error refers to.
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Self::Syntax { line, .. } | Self::Directive { line, .. } => *line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_display() {
        let err = ParseError::syntax(3, "Title level inconsistent.");
        assert_eq!(err.to_string(), "line 3: Title level inconsistent.");
        assert_eq!(err.line(), 3);
    }

    #[test]
    fn test_directive_display() {
        let err = ParseError::Directive {
            name: "sourcecode".to_owned(),
            line: 7,
            message: "Content block expected for the \"sourcecode\" directive; none found."
                .to_owned(),
        };
        assert!(err.to_string().starts_with("line 7: error in \"sourcecode\" directive"));
    }
}
