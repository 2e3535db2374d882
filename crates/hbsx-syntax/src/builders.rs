//! Build AST nodes by writing the template they come from.
//!
//! [`AstBuilder`] appends the text of each construct to an internal buffer
//! and gives every node the span between the cursor before and after it.
//! The result is the tree [`crate::preprocess`] would produce for
//! [`AstBuilder::source`], built without the tokenizer or the CST.
//!
//! ```
//! use hbsx_syntax::builders::AstBuilder;
//!
//! let mut b = AstBuilder::new();
//! let hello = b.text("Hello ");
//! let name = b.mustache("name", |_| {});
//! let template = b.template(vec![hello, name]);
//!
//! assert_eq!(b.source(), "Hello {{name}}");
//! assert_eq!(template.body[1].span().start, 6);
//! ```

use hbsx_tokenizer::is_void_element;

use crate::ast::{
    AttrNode, AttrValue, Block, BlockStatement, ContentMustache, ElementNode, Expression, Hash,
    HashPair, Literal, LiteralKind, MustacheStatement, PathExpression, PathHead, Statement,
    StripFlags, SubExpression, Template, TextNode,
};
use crate::span::Span;

#[derive(Debug, Clone, Default)]
pub struct AstBuilder {
    source: String,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The template text written so far.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn offset(&self) -> usize {
        self.source.len()
    }

    /// Append `text` and return the span it occupies.
    pub fn consume(&mut self, text: &str) -> Span {
        let start = self.offset();
        self.source.push_str(text);
        Span::new(start, self.offset())
    }

    /// Wrap `body` in a template spanning everything written.
    pub fn template(&self, body: Vec<Statement>) -> Template {
        Template {
            body,
            block_params: Vec::new(),
            span: Span::new(0, self.offset()),
        }
    }

    // ====================================================================
    // HTML
    // ====================================================================

    pub fn text(&mut self, chars: &str) -> Statement {
        let span = self.consume(chars);
        Statement::Text(TextNode {
            chars: chars.to_string(),
            span,
        })
    }

    /// `<tag name="value" ...>children</tag>`. Void tags get no children and
    /// no end tag.
    pub fn element(
        &mut self,
        tag: &str,
        attributes: &[(&str, &str)],
        children: impl FnOnce(&mut Self) -> Vec<Statement>,
    ) -> Statement {
        let start = self.offset();
        self.consume("<");
        self.consume(tag);

        let attributes: Vec<AttrNode> = attributes
            .iter()
            .map(|(name, value)| {
                self.consume(" ");
                let name_span = self.consume(name);
                self.consume("=");
                let value_span = self.consume(&format!("\"{value}\""));
                AttrNode {
                    name: name.to_string(),
                    value: AttrValue::Text(TextNode {
                        chars: value.to_string(),
                        span: value_span,
                    }),
                    span: name_span.merge(value_span),
                }
            })
            .collect();
        self.consume(">");

        let children = if is_void_element(tag) {
            Vec::new()
        } else {
            let children = children(self);
            self.consume(&format!("</{tag}>"));
            children
        };

        Statement::Element(ElementNode {
            tag: tag.to_string(),
            self_closing: false,
            attributes,
            block_params: Vec::new(),
            modifiers: Vec::new(),
            comments: Vec::new(),
            children,
            span: Span::new(start, self.offset()),
        })
    }

    // ====================================================================
    // Mustaches
    // ====================================================================

    /// `{{path args}}`
    pub fn mustache(&mut self, path: &str, args: impl FnOnce(&mut CallBuilder<'_>)) -> Statement {
        Statement::Mustache(self.mustache_with("{{", "}}", path, args))
    }

    /// `{{{path args}}}`
    pub fn trusting_mustache(
        &mut self,
        path: &str,
        args: impl FnOnce(&mut CallBuilder<'_>),
    ) -> Statement {
        Statement::Mustache(self.mustache_with("{{{", "}}}", path, args))
    }

    fn mustache_with(
        &mut self,
        open: &str,
        close: &str,
        path: &str,
        args: impl FnOnce(&mut CallBuilder<'_>),
    ) -> MustacheStatement {
        let start = self.offset();
        self.consume(open);
        let (path, params, hash, _) = self.call(path, args);
        self.consume(close);
        MustacheStatement {
            path,
            params,
            hash,
            trusting: open == "{{{",
            strip: StripFlags::default(),
            span: Span::new(start, self.offset()),
        }
    }

    /// `{{"literal"}}`
    pub fn content_mustache(&mut self, literal: impl FnOnce(&mut Self) -> Literal) -> Statement {
        let start = self.offset();
        self.consume("{{");
        let value = literal(self);
        self.consume("}}");
        Statement::ContentMustache(ContentMustache {
            hash: Hash::empty(value.span.end),
            value,
            trusting: false,
            strip: StripFlags::default(),
            span: Span::new(start, self.offset()),
        })
    }

    // ====================================================================
    // Blocks
    // ====================================================================

    /// `{{#path args}}body{{/path}}`
    pub fn block(
        &mut self,
        path: &str,
        args: impl FnOnce(&mut CallBuilder<'_>),
        body: impl FnOnce(&mut Self) -> Vec<Statement>,
    ) -> Statement {
        self.block_inner(path, args, body, None::<fn(&mut Self) -> Vec<Statement>>)
    }

    /// `{{#path args}}body{{else}}inverse{{/path}}`
    pub fn block_with_inverse(
        &mut self,
        path: &str,
        args: impl FnOnce(&mut CallBuilder<'_>),
        body: impl FnOnce(&mut Self) -> Vec<Statement>,
        inverse: impl FnOnce(&mut Self) -> Vec<Statement>,
    ) -> Statement {
        self.block_inner(path, args, body, Some(inverse))
    }

    fn block_inner(
        &mut self,
        path: &str,
        args: impl FnOnce(&mut CallBuilder<'_>),
        body: impl FnOnce(&mut Self) -> Vec<Statement>,
        inverse: Option<impl FnOnce(&mut Self) -> Vec<Statement>>,
    ) -> Statement {
        let start = self.offset();
        self.consume("{{#");
        let (callee, params, hash, block_params) = self.call(path, args);
        self.consume("}}");

        let program = self.body(start, block_params, body);
        let inverse = inverse.map(|inverse| {
            self.consume("{{else}}");
            self.body(start, Vec::new(), inverse)
        });
        self.consume(&format!("{{{{/{path}}}}}"));

        Statement::Block(BlockStatement {
            path: callee,
            params,
            hash,
            program,
            inverse,
            open_strip: StripFlags::default(),
            inverse_strip: StripFlags::default(),
            close_strip: StripFlags::default(),
            span: Span::new(start, self.offset()),
        })
    }

    /// A block body spanning its first to last statement, or empty at the
    /// start of the block.
    fn body(
        &mut self,
        block_start: usize,
        block_params: Vec<String>,
        build: impl FnOnce(&mut Self) -> Vec<Statement>,
    ) -> Block {
        let body = build(self);
        let span = match (body.first(), body.last()) {
            (Some(first), Some(last)) => first.span().merge(last.span()),
            _ => Span::empty(block_start),
        };
        Block {
            body,
            block_params,
            chained: false,
            span,
        }
    }

    // ====================================================================
    // Expressions
    // ====================================================================

    /// `(path args)`
    pub fn sexpr(&mut self, path: &str, args: impl FnOnce(&mut CallBuilder<'_>)) -> SubExpression {
        let start = self.offset();
        self.consume("(");
        let (path, params, hash, _) = self.call(path, args);
        self.consume(")");
        SubExpression {
            path: Box::new(path),
            params,
            hash,
            span: Span::new(start, self.offset()),
        }
    }

    /// A dotted path; `this` and `@name` heads are recognised.
    pub fn path(&mut self, original: &str) -> PathExpression {
        let span = self.consume(original);
        let mut segments = original.split('.').map(str::to_string);
        let first = segments.next().unwrap_or_default();

        let head = if first == "this" {
            PathHead::This {
                span: Span::new(span.start, span.start + first.len()),
            }
        } else if let Some(name) = first.strip_prefix('@') {
            PathHead::Arg {
                name: name.to_string(),
                span: Span::new(span.start, span.start + first.len()),
            }
        } else {
            PathHead::Local {
                span: Span::new(span.start, span.start + first.len()),
                name: first,
            }
        };

        PathExpression {
            original: original.to_string(),
            head,
            tail: segments.collect(),
            span,
        }
    }

    pub fn string(&mut self, value: &str) -> Literal {
        let span = self.consume(&format!("\"{value}\""));
        Literal {
            kind: LiteralKind::String(value.to_string()),
            span,
        }
    }

    pub fn number(&mut self, value: f64) -> Literal {
        let original = value.to_string();
        let span = self.consume(&original);
        Literal {
            kind: LiteralKind::Number { value, original },
            span,
        }
    }

    pub fn boolean(&mut self, value: bool) -> Literal {
        let span = self.consume(if value { "true" } else { "false" });
        Literal {
            kind: LiteralKind::Boolean(value),
            span,
        }
    }

    pub fn null(&mut self) -> Literal {
        let span = self.consume("null");
        Literal {
            kind: LiteralKind::Null,
            span,
        }
    }

    pub fn undefined(&mut self) -> Literal {
        let span = self.consume("undefined");
        Literal {
            kind: LiteralKind::Undefined,
            span,
        }
    }

    /// Write a call target followed by its arguments.
    fn call(
        &mut self,
        path: &str,
        args: impl FnOnce(&mut CallBuilder<'_>),
    ) -> (Expression, Vec<Expression>, Hash, Vec<String>) {
        let callee = Expression::Path(self.path(path));
        let mut call = CallBuilder {
            builder: self,
            params: Vec::new(),
            pairs: Vec::new(),
            block_params: Vec::new(),
        };
        args(&mut call);
        let CallBuilder {
            params,
            pairs,
            block_params,
            ..
        } = call;

        let hash = match (pairs.first(), pairs.last()) {
            (Some(first), Some(last)) => Hash {
                span: first.span.merge(last.span),
                pairs,
            },
            _ => Hash::empty(params.last().map_or(callee.span(), Expression::span).end),
        };
        (callee, params, hash, block_params)
    }
}

/// Collects the params, hash pairs and block params of one call.
///
/// Each method writes a leading space, so arguments come out as
/// `path a b key=value as |x|`.
pub struct CallBuilder<'a> {
    builder: &'a mut AstBuilder,
    params: Vec<Expression>,
    pairs: Vec<HashPair>,
    block_params: Vec<String>,
}

impl CallBuilder<'_> {
    /// A path param.
    pub fn path(&mut self, original: &str) -> &mut Self {
        self.param(|b| b.path(original))
    }

    pub fn param<E: Into<Expression>>(&mut self, build: impl FnOnce(&mut AstBuilder) -> E) -> &mut Self {
        self.builder.consume(" ");
        let param = build(self.builder).into();
        self.params.push(param);
        self
    }

    /// `key=value`
    pub fn pair<E: Into<Expression>>(
        &mut self,
        key: &str,
        build: impl FnOnce(&mut AstBuilder) -> E,
    ) -> &mut Self {
        self.builder.consume(" ");
        let start = self.builder.offset();
        self.builder.consume(key);
        self.builder.consume("=");
        let value = build(self.builder).into();
        self.pairs.push(HashPair {
            key: key.to_string(),
            span: Span::new(start, value.span().end),
            value,
        });
        self
    }

    /// `as |a b|`
    pub fn block_params(&mut self, names: &[&str]) -> &mut Self {
        self.builder.consume(" as |");
        self.builder.consume(&names.join(" "));
        self.builder.consume("|");
        self.block_params
            .extend(names.iter().map(|name| name.to_string()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ====================================================================
    // Spans
    // ====================================================================

    #[test]
    fn test_consume_tracks_offsets() {
        let mut b = AstBuilder::new();
        assert_eq!(b.consume("ab"), Span::new(0, 2));
        assert_eq!(b.consume("ü"), Span::new(2, 4));
        assert_eq!(b.offset(), 4);
    }

    #[test]
    fn test_mustache_with_params_and_hash() {
        let mut b = AstBuilder::new();
        let statement = b.mustache("foo", |call| {
            call.path("bar").pair("k", |b| b.number(1.0));
        });
        assert_eq!(b.source(), "{{foo bar k=1}}");

        let Statement::Mustache(mustache) = statement else {
            panic!("Expected mustache");
        };
        assert_eq!(mustache.span, Span::new(0, 15));
        assert_eq!(mustache.params[0].span(), Span::new(6, 9));
        assert_eq!(mustache.hash.span, Span::new(10, 13));
    }

    #[test]
    fn test_hash_defaults_after_last_param() {
        let mut b = AstBuilder::new();
        let statement = b.mustache("foo", |call| {
            call.param(|b| b.string("x"));
        });
        assert_eq!(b.source(), r#"{{foo "x"}}"#);
        let Statement::Mustache(mustache) = statement else {
            panic!("Expected mustache");
        };
        assert_eq!(mustache.hash, Hash::empty(9));
    }

    #[test]
    fn test_path_heads() {
        let mut b = AstBuilder::new();
        let this = b.path("this.a.b");
        assert_eq!(this.head, PathHead::This { span: Span::new(0, 4) });
        assert_eq!(this.tail, vec!["a", "b"]);

        let arg = b.path("@title");
        assert_eq!(
            arg.head,
            PathHead::Arg {
                name: "title".into(),
                span: Span::new(8, 14)
            }
        );
        assert!(arg.tail.is_empty());
    }

    // ====================================================================
    // Structure
    // ====================================================================

    #[test]
    fn test_element_attributes() {
        let mut b = AstBuilder::new();
        let statement = b.element("a", &[("href", "/x")], |b| vec![b.text("go")]);
        assert_eq!(b.source(), r#"<a href="/x">go</a>"#);

        let Statement::Element(element) = statement else {
            panic!("Expected element");
        };
        assert_eq!(element.span, Span::new(0, 19));
        assert_eq!(element.attributes[0].span, Span::new(3, 12));
        assert_eq!(element.attributes[0].value.span(), Span::new(8, 12));
        assert_eq!(element.children[0].span(), Span::new(13, 15));
    }

    #[test]
    fn test_void_element_has_no_end_tag() {
        let mut b = AstBuilder::new();
        b.element("br", &[], |b| vec![b.text("ignored")]);
        assert_eq!(b.source(), "<br>");
    }

    #[test]
    fn test_block_with_inverse_and_params() {
        let mut b = AstBuilder::new();
        let statement = b.block_with_inverse(
            "each",
            |call| {
                call.path("xs").block_params(&["x"]);
            },
            |b| vec![b.mustache("x", |_| {})],
            |_| Vec::new(),
        );
        assert_eq!(b.source(), "{{#each xs as |x|}}{{x}}{{else}}{{/each}}");

        let Statement::Block(block) = statement else {
            panic!("Expected block");
        };
        assert_eq!(block.program.block_params, vec!["x"]);
        assert_eq!(block.program.span, Span::new(19, 24));
        assert_eq!(block.inverse.unwrap().span, Span::empty(0));
        assert_eq!(block.hash, Hash::empty(10));
        assert_eq!(block.span, Span::new(0, 41));
    }
}
