//! HBSX Syntax
//!
//! Turns an HBSX template (HTML with Handlebars mustaches, blocks and
//! partials woven through it) into one [`ast::Template`] where every node
//! carries an exact byte [`Span`].
//!
//! Two grammars share the character stream. [`hbsx_cst`] parses the
//! Handlebars half; the text between mustaches goes through the
//! [`hbsx_tokenizer`] state machine. Where a mustache lands (element child,
//! attribute value, part of a quoted value, or modifier on a tag) depends on
//! the tokenizer state at that point.
//!
//! # Example
//!
//! ```
//! use hbsx_syntax::{preprocess, ast::Statement, ParseOptions};
//!
//! let template = preprocess("<p class={{cls}}>Hi</p>", &ParseOptions::default()).unwrap();
//! let Statement::Element(p) = &template.body[0] else { panic!() };
//! assert_eq!(p.tag, "p");
//! assert_eq!(p.attributes[0].name, "class");
//! ```

pub mod ast;
pub mod builders;
mod element_stack;
mod error;
mod events;
mod offsets;
mod options;
mod path;
mod source;
mod span;
mod visitor;

pub use element_stack::{ElementFrame, ElementStack, Frame, FrameId};
pub use error::SyntaxError;
pub use offsets::{right_stripped_offsets, StrippedOffsets};
pub use options::{ParseMode, ParseOptions};
pub use source::Source;
pub use span::Span;

use visitor::TemplateParser;

/// Parse template text into an AST.
///
/// The first structural error aborts the parse.
pub fn preprocess(text: &str, options: &ParseOptions) -> Result<ast::Template, SyntaxError> {
    let mut source = Source::new(text);
    if let Some(name) = &options.module_name {
        source = source.with_module_name(name.clone());
    }
    tracing::debug!(module = source.module_name(), len = text.len(), "parsing template");

    let cst_options = hbsx_cst::ParseOptions {
        ignore_standalone: options.ignore_standalone,
    };
    let program =
        hbsx_cst::parse(text, &cst_options).map_err(|error| SyntaxError::from_cst(error, &source))?;

    let template = TemplateParser::new(source, options.mode.into()).parse(&program, options.locals.clone())?;
    tracing::debug!(nodes = template.body.len(), "parsed template");
    Ok(template)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AttrValue, Statement};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_locals_become_block_params() {
        let options = ParseOptions::new().with_locals(["Button", "t"]);
        let template = preprocess("<Button />", &options).unwrap();
        assert_eq!(template.block_params, vec!["Button", "t"]);
        assert_eq!(template.span, Span::new(0, 10));
    }

    #[test]
    fn test_module_name_in_errors() {
        let options = ParseOptions::new().with_module_name("app/card.hbs");
        let error = preprocess("<div>", &options).unwrap_err();
        assert_eq!(error.module, "app/card.hbs");
        assert_eq!(
            error.to_string(),
            "Syntax error at line 1, column 0 in 'app/card.hbs': Unclosed element `div`"
        );
    }

    #[test]
    fn test_grammar_errors_are_syntax_errors() {
        let error = preprocess("{{#if a}}", &ParseOptions::default()).unwrap_err();
        assert!(error.message.contains("{{/if}}"));
        assert_eq!(error.module, "an unknown module");
    }

    // ====================================================================
    // Modes
    // ====================================================================

    #[test]
    fn test_precompile_decodes_entities() {
        let template = preprocess("a &amp; b", &ParseOptions::default()).unwrap();
        match &template.body[0] {
            Statement::Text(text) => {
                assert_eq!(text.chars, "a & b");
                assert_eq!(text.span, Span::new(0, 9));
            }
            other => panic!("Expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_codemod_keeps_text() {
        let options = ParseOptions::new().with_mode(ParseMode::Codemod);
        let template = preprocess(r#"<a title="&lt;">&amp;</a>"#, &options).unwrap();
        let Statement::Element(a) = &template.body[0] else {
            panic!("Expected element");
        };
        match &a.attributes[0].value {
            AttrValue::Text(text) => assert_eq!(text.chars, "&lt;"),
            other => panic!("Expected text value, got {other:?}"),
        }
        match &a.children[0] {
            Statement::Text(text) => assert_eq!(text.chars, "&amp;"),
            other => panic!("Expected text, got {other:?}"),
        }
    }
}
