//! HBSX CST
//!
//! Parses the Handlebars half of an HBSX template into a concrete syntax tree.
//! HTML is not interpreted here: everything between mustaches is kept as
//! [`ContentStatement`] text for a later stage to tokenize.
//!
//! Every node carries a [`SourceLocation`] with 1-indexed lines and 0-indexed
//! columns (counted in characters). Empty bodies carry no location.
//! Whitespace control (`~` and standalone lines) has already been applied to
//! the returned tree.
//!
//! # Example
//!
//! ```
//! use hbsx_cst::{parse, ParseOptions, Statement};
//!
//! let program = parse("Hello {{name}}!", &ParseOptions::default()).unwrap();
//! assert_eq!(program.body.len(), 3);
//! assert!(matches!(program.body[1], Statement::Mustache(_)));
//! ```

pub mod cst;
mod lexer;
mod parser;
mod whitespace;

pub use cst::*;

/// Handlebars grammar error with position information.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Parse error at line {line}, column {column}: {message}")]
pub struct CstError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

/// Options for [`parse`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Keep lines around standalone block tags, comments and partials.
    pub ignore_standalone: bool,
}

/// Parse template text into a CST.
pub fn parse(text: &str, options: &ParseOptions) -> Result<Program, CstError> {
    let tokens = lexer::Lexer::tokenize(text)?;
    parser::Parser::new(tokens, options).parse()
}
