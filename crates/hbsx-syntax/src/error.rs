use hbsx_cst::CstError;

use crate::source::Source;
use crate::span::Span;

/// A template that is not structurally well formed.
///
/// Parsing stops at the first one found, so there is never more than one per
/// template.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Syntax error at line {line}, column {column} in '{module}': {message}")]
pub struct SyntaxError {
    pub message: String,
    pub span: Span,
    pub line: usize,
    pub column: usize,
    pub module: String,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: Span, source: &Source) -> Self {
        let position = source.position_for(span.start);
        Self {
            message: message.into(),
            span,
            line: position.line,
            column: position.column,
            module: source.module_name().to_string(),
        }
    }

    /// Lift a grammar error into a zero-width error at its position.
    pub(crate) fn from_cst(error: CstError, source: &Source) -> Self {
        let offset = source.offset_for(error.line, error.column);
        Self::new(error.message, Span::empty(offset), source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display() {
        let source = Source::new("<div>\n  <p>").with_module_name("layout");
        let error = SyntaxError::new("Unclosed element `p`", Span::new(8, 11), &source);
        assert_eq!(
            error.to_string(),
            "Syntax error at line 2, column 2 in 'layout': Unclosed element `p`"
        );
    }

    #[test]
    fn test_unknown_module() {
        let source = Source::new("x");
        let error = SyntaxError::new("boom", Span::empty(0), &source);
        assert_eq!(error.module, "an unknown module");
        assert_eq!((error.line, error.column), (1, 0));
    }

    #[test]
    fn test_from_cst() {
        let source = Source::new("ab\n{{#if}}");
        let error = SyntaxError::from_cst(
            CstError {
                message: "Expected an expression, got `}}`".to_string(),
                line: 2,
                column: 5,
            },
            &source,
        );
        assert_eq!(error.span, Span::empty(8));
        assert_eq!((error.line, error.column), (2, 5));
    }
}
