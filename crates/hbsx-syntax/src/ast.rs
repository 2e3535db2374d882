//! Unified AST for HBSX templates.
//!
//! HTML structure (elements, text, HTML comments) and Handlebars constructs
//! (mustaches, blocks, partials) live in one tree. Every node carries a
//! byte-offset [`Span`] into the template source.

use std::fmt;

use crate::span::Span;

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

/// The root of a parsed template.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Template {
    pub body: Vec<Statement>,
    /// Names the embedding environment puts in scope.
    pub block_params: Vec<String>,
    pub span: Span,
}

/// The body of a block or partial block.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Block {
    pub body: Vec<Statement>,
    pub block_params: Vec<String>,
    /// Set when this body only wraps an `{{else if ...}}` block.
    pub chained: bool,
    pub span: Span,
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Statement {
    /// `{{helper arg key=value}}`
    Mustache(MustacheStatement),
    /// `{{"literal"}}`: a value that is printed, never called.
    ContentMustache(ContentMustache),
    /// `{{#helper}}...{{else}}...{{/helper}}`
    Block(BlockStatement),
    /// `{{* decorator}}`
    Decorator(MustacheStatement),
    /// `{{#* decorator}}...{{/decorator}}`
    DecoratorBlock(BlockStatement),
    /// `{{> partial}}`
    Partial(PartialStatement),
    /// `{{#> partial}}...{{/partial}}`
    PartialBlock(PartialBlockStatement),
    /// `{{! ... }}`
    MustacheComment(MustacheCommentStatement),
    /// `<!-- ... -->`
    Comment(CommentStatement),
    Element(ElementNode),
    Text(TextNode),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Mustache(m) | Statement::Decorator(m) => m.span,
            Statement::ContentMustache(m) => m.span,
            Statement::Block(b) | Statement::DecoratorBlock(b) => b.span,
            Statement::Partial(p) => p.span,
            Statement::PartialBlock(p) => p.span,
            Statement::MustacheComment(c) => c.span,
            Statement::Comment(c) => c.span,
            Statement::Element(e) => e.span,
            Statement::Text(t) => t.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MustacheStatement {
    pub path: Expression,
    pub params: Vec<Expression>,
    pub hash: Hash,
    /// Output is inserted as raw HTML (`{{{ }}}` or `{{& }}`).
    pub trusting: bool,
    pub strip: StripFlags,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ContentMustache {
    pub value: Literal,
    /// Always empty, zero-width at the end of the literal.
    pub hash: Hash,
    pub trusting: bool,
    pub strip: StripFlags,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BlockStatement {
    pub path: Expression,
    pub params: Vec<Expression>,
    pub hash: Hash,
    pub program: Block,
    pub inverse: Option<Block>,
    pub open_strip: StripFlags,
    pub inverse_strip: StripFlags,
    pub close_strip: StripFlags,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PartialStatement {
    pub name: Expression,
    pub params: Vec<Expression>,
    pub hash: Hash,
    /// Indentation of a standalone partial, applied to each line it renders.
    pub indent: String,
    pub strip: StripFlags,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PartialBlockStatement {
    pub name: Expression,
    pub params: Vec<Expression>,
    pub hash: Hash,
    pub program: Block,
    pub open_strip: StripFlags,
    pub close_strip: StripFlags,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MustacheCommentStatement {
    pub value: String,
    pub span: Span,
}

/// An HTML comment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CommentStatement {
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TextNode {
    pub chars: String,
    pub span: Span,
}

/// Whitespace-control markers (`~`) on the two sides of a mustache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StripFlags {
    pub open: bool,
    pub close: bool,
}

impl From<hbsx_cst::StripFlags> for StripFlags {
    fn from(flags: hbsx_cst::StripFlags) -> Self {
        Self {
            open: flags.open,
            close: flags.close,
        }
    }
}

// ---------------------------------------------------------------------------
// Elements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ElementNode {
    pub tag: String,
    /// Written as `<tag />`.
    pub self_closing: bool,
    pub attributes: Vec<AttrNode>,
    /// Names from `as |a b|` in the start tag.
    pub block_params: Vec<String>,
    pub modifiers: Vec<ElementModifierStatement>,
    /// `{{! }}` comments written inside the start tag.
    pub comments: Vec<MustacheCommentStatement>,
    pub children: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AttrNode {
    pub name: String,
    pub value: AttrValue,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AttrValue {
    /// `class="static"`, `class=static` or a bare `disabled`.
    Text(TextNode),
    /// `class={{value}}`
    Mustache(MustacheStatement),
    /// `class={{"literal"}}`
    ContentMustache(ContentMustache),
    /// `class="a {{b}} c"`
    Concat(ConcatStatement),
}

impl AttrValue {
    pub fn span(&self) -> Span {
        match self {
            AttrValue::Text(t) => t.span,
            AttrValue::Mustache(m) => m.span,
            AttrValue::ContentMustache(m) => m.span,
            AttrValue::Concat(c) => c.span,
        }
    }
}

impl From<AttrPart> for AttrValue {
    fn from(part: AttrPart) -> Self {
        match part {
            AttrPart::Text(t) => AttrValue::Text(t),
            AttrPart::Mustache(m) => AttrValue::Mustache(m),
            AttrPart::ContentMustache(m) => AttrValue::ContentMustache(m),
        }
    }
}

/// A quoted attribute value mixing text and mustaches.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ConcatStatement {
    pub parts: Vec<AttrPart>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AttrPart {
    Text(TextNode),
    Mustache(MustacheStatement),
    ContentMustache(ContentMustache),
}

impl AttrPart {
    pub fn span(&self) -> Span {
        match self {
            AttrPart::Text(t) => t.span,
            AttrPart::Mustache(m) => m.span,
            AttrPart::ContentMustache(m) => m.span,
        }
    }
}

/// A mustache in tag position: `<div {{on "click" this.save}}>`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ElementModifierStatement {
    pub path: Expression,
    pub params: Vec<Expression>,
    pub hash: Hash,
    pub span: Span,
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Expression {
    Path(PathExpression),
    SubExpression(SubExpression),
    Literal(Literal),
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Path(p) => p.span,
            Expression::SubExpression(s) => s.span,
            Expression::Literal(l) => l.span,
        }
    }
}

impl From<PathExpression> for Expression {
    fn from(path: PathExpression) -> Self {
        Expression::Path(path)
    }
}

impl From<SubExpression> for Expression {
    fn from(sexpr: SubExpression) -> Self {
        Expression::SubExpression(sexpr)
    }
}

impl From<Literal> for Expression {
    fn from(literal: Literal) -> Self {
        Expression::Literal(literal)
    }
}

/// `(helper arg key=value)`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SubExpression {
    pub path: Box<Expression>,
    pub params: Vec<Expression>,
    pub hash: Hash,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PathExpression {
    /// The path as written, e.g. `this.user.name`.
    pub original: String,
    pub head: PathHead,
    /// Segments after the head; empty when there are none.
    pub tail: Vec<String>,
    pub span: Span,
}

/// What the first segment of a path refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum PathHead {
    /// `this`
    This { span: Span },
    /// `@name`; `name` excludes the sigil, `span` includes it.
    Arg { name: String, span: Span },
    /// A bare identifier.
    Local { name: String, span: Span },
}

impl PathHead {
    pub fn span(&self) -> Span {
        match self {
            PathHead::This { span } | PathHead::Arg { span, .. } | PathHead::Local { span, .. } => {
                *span
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Literal {
    pub kind: LiteralKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum LiteralKind {
    String(String),
    Number { value: f64, original: String },
    Boolean(bool),
    Null,
    Undefined,
}

impl Literal {
    /// Node name used in diagnostics, e.g. `StringLiteral`.
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            LiteralKind::String(_) => "StringLiteral",
            LiteralKind::Number { .. } => "NumberLiteral",
            LiteralKind::Boolean(_) => "BooleanLiteral",
            LiteralKind::Null => "NullLiteral",
            LiteralKind::Undefined => "UndefinedLiteral",
        }
    }
}

/// Prints the literal the way it would be written in a template.
impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LiteralKind::String(value) => write!(f, "{value:?}"),
            LiteralKind::Number { original, .. } => f.write_str(original),
            LiteralKind::Boolean(value) => write!(f, "{value}"),
            LiteralKind::Null => f.write_str("null"),
            LiteralKind::Undefined => f.write_str("undefined"),
        }
    }
}

/// `key=value` pairs of a call. Duplicate keys are kept.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Hash {
    pub pairs: Vec<HashPair>,
    pub span: Span,
}

impl Hash {
    /// A hash with no pairs, zero-width at `offset`.
    pub fn empty(offset: usize) -> Self {
        Self {
            pairs: Vec::new(),
            span: Span::empty(offset),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HashPair {
    pub key: String,
    pub value: Expression,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn literal(kind: LiteralKind) -> Literal {
        Literal {
            kind,
            span: Span::new(0, 1),
        }
    }

    #[test]
    fn test_literal_display() {
        assert_eq!(literal(LiteralKind::String("a\"b".into())).to_string(), "\"a\\\"b\"");
        let number = LiteralKind::Number {
            value: 1.5,
            original: "1.50".into(),
        };
        assert_eq!(literal(number).to_string(), "1.50");
        assert_eq!(literal(LiteralKind::Boolean(false)).to_string(), "false");
        assert_eq!(literal(LiteralKind::Null).to_string(), "null");
        assert_eq!(literal(LiteralKind::Undefined).type_name(), "UndefinedLiteral");
    }

    #[test]
    fn test_attr_part_becomes_value() {
        let text = TextNode {
            chars: "x".into(),
            span: Span::new(4, 5),
        };
        let value = AttrValue::from(AttrPart::Text(text.clone()));
        assert_eq!(value, AttrValue::Text(text));
        assert_eq!(value.span(), Span::new(4, 5));
    }

    #[test]
    fn test_head_span() {
        let head = PathHead::Arg {
            name: "title".into(),
            span: Span::new(2, 8),
        };
        assert_eq!(head.span(), Span::new(2, 8));
    }
}
