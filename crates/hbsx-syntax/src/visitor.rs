//! Walks the Handlebars CST and merges it with the HTML tokenizer.
//!
//! Content text is fed to the tokenizer, which builds HTML nodes through
//! [`TokenizerEventHandlers`]. Every other CST node is translated here and
//! placed according to the tokenizer state at that point of the stream: a
//! mustache after `<div ` is a modifier, after `class=` it is an attribute
//! value, between tags it is a child.

use hbsx_cst as cst;
use hbsx_tokenizer::{Tokenizer, TokenizerDelegate, TokenizerMode, TokenizerState};

use crate::ast::{
    AttrPart, Block, BlockStatement, ContentMustache, ElementModifierStatement, Expression, Hash,
    HashPair, Literal, LiteralKind, MustacheCommentStatement, MustacheStatement,
    PartialBlockStatement, PartialStatement, Statement, SubExpression, Template,
};
use crate::error::SyntaxError;
use crate::events::TokenizerEventHandlers;
use crate::offsets::right_stripped_offsets;
use crate::path::resolve_path;
use crate::source::Source;
use crate::span::Span;

/// A translated mustache waiting to be placed.
#[derive(Debug)]
enum Dynamic {
    Mustache(MustacheStatement),
    Content(ContentMustache),
}

impl Dynamic {
    fn span(&self) -> Span {
        match self {
            Dynamic::Mustache(m) => m.span,
            Dynamic::Content(m) => m.span,
        }
    }

    fn into_statement(self) -> Statement {
        match self {
            Dynamic::Mustache(m) => Statement::Mustache(m),
            Dynamic::Content(m) => Statement::ContentMustache(m),
        }
    }

    fn into_part(self) -> AttrPart {
        match self {
            Dynamic::Mustache(m) => AttrPart::Mustache(m),
            Dynamic::Content(m) => AttrPart::ContentMustache(m),
        }
    }
}

/// A resolved call: target, positional params and hash.
struct Call {
    path: Expression,
    params: Vec<Expression>,
    hash: Hash,
}

/// One template being translated.
pub(crate) struct TemplateParser {
    tokenizer: Tokenizer,
    handlers: TokenizerEventHandlers,
}

impl TemplateParser {
    pub fn new(source: Source, mode: TokenizerMode) -> Self {
        Self {
            tokenizer: Tokenizer::with_mode(mode),
            handlers: TokenizerEventHandlers::new(source),
        }
    }

    /// Translate the root program.
    pub fn parse(mut self, program: &cst::Program, locals: Vec<String>) -> Result<Template, SyntaxError> {
        let body = self.handlers.push_body();
        for statement in &program.body {
            self.statement(statement)?;
        }
        self.tokenizer.tokenize_eof(&mut self.handlers)?;
        self.handlers.finish_template(self.tokenizer.state())?;

        Ok(Template {
            body: self.handlers.pop_body(body)?,
            block_params: locals,
            span: self.handlers.source().full_span(),
        })
    }

    fn source(&self) -> &Source {
        self.handlers.source()
    }

    fn error(&self, message: impl Into<String>, span: Span) -> SyntaxError {
        self.handlers.error(message, span)
    }

    fn span_for(&self, loc: &cst::SourceLocation) -> Span {
        self.source().span_for(loc)
    }

    // ====================================================================
    // Dispatch
    // ====================================================================

    fn statement(&mut self, statement: &cst::Statement) -> Result<(), SyntaxError> {
        match statement {
            cst::Statement::Content(content) => {
                tracing::trace!(len = content.value.len(), "content");
                self.content(content)
            }
            cst::Statement::Mustache(mustache) => {
                tracing::trace!(path = %mustache.path.original(), "mustache");
                self.mustache(mustache)
            }
            cst::Statement::Block(block) => {
                tracing::trace!(path = %block.path.original(), "block");
                self.block(block, false)
            }
            cst::Statement::DecoratorBlock(block) => {
                tracing::trace!(path = %block.path.original(), "decorator block");
                self.block(block, true)
            }
            cst::Statement::Decorator(decorator) => {
                tracing::trace!(path = %decorator.path.original(), "decorator");
                self.decorator(decorator)
            }
            cst::Statement::Comment(comment) => {
                tracing::trace!("mustache comment");
                self.mustache_comment(comment)
            }
            cst::Statement::Partial(partial) => {
                tracing::trace!(name = %partial.name.original(), "partial");
                self.partial(partial)
            }
            cst::Statement::PartialBlock(partial) => {
                tracing::trace!(name = %partial.name.original(), "partial block");
                self.partial_block(partial)
            }
        }
    }

    /// Inside an HTML comment, a mustache construct is just comment text.
    ///
    /// Returns `true` when the node was consumed that way.
    fn in_comment(&mut self, loc: &cst::SourceLocation) -> Result<bool, SyntaxError> {
        if !self.tokenizer.state().is_comment() {
            return Ok(false);
        }
        let text = self.source().slice(self.span_for(loc)).to_string();
        self.tokenizer.append_to_comment(&text, &mut self.handlers)?;
        Ok(true)
    }

    // ====================================================================
    // Content
    // ====================================================================

    fn content(&mut self, content: &cst::ContentStatement) -> Result<(), SyntaxError> {
        let offsets = right_stripped_offsets(&content.original, &content.value);
        let start = content.loc.start;
        self.tokenizer.line = start.line + offsets.lines;
        self.tokenizer.column = if offsets.lines > 0 {
            offsets.columns
        } else {
            start.column + offsets.columns
        };

        self.tokenizer.tokenize_part(&content.value, &mut self.handlers)?;
        self.tokenizer.flush_data(&mut self.handlers)
    }

    // ====================================================================
    // Blocks
    // ====================================================================

    fn block(&mut self, block: &cst::BlockStatement, decorator: bool) -> Result<(), SyntaxError> {
        if self.in_comment(&block.loc)? {
            return Ok(());
        }
        let span = self.span_for(&block.loc);
        if !self.tokenizer.state().is_data() {
            return Err(self.error(
                "A block may only be used inside an HTML element or another block.",
                span,
            ));
        }

        let call = self.call(&block.path, &block.params, block.hash.as_ref())?;
        let program = self.block_body(&block.program, span.start)?;
        let inverse = match &block.inverse {
            Some(inverse) => Some(self.block_body(inverse, span.start)?),
            None => None,
        };

        let statement = BlockStatement {
            path: call.path,
            params: call.params,
            hash: call.hash,
            program,
            inverse,
            open_strip: block.open_strip.into(),
            inverse_strip: block.inverse_strip.into(),
            close_strip: block.close_strip.into(),
            span,
        };
        self.handlers.append(if decorator {
            Statement::DecoratorBlock(statement)
        } else {
            Statement::Block(statement)
        });
        Ok(())
    }

    /// Translate a block body. An empty body sits at `fallback`.
    fn block_body(&mut self, program: &cst::Program, fallback: usize) -> Result<Block, SyntaxError> {
        let frame = self.handlers.push_body();
        for statement in &program.body {
            self.statement(statement)?;
        }
        self.handlers
            .finish_block_body(self.tokenizer.state(), self.tokenizer.position())?;
        let body = self.handlers.pop_body(frame)?;

        let loc = program.loc.unwrap_or(cst::SourceLocation::NON_EXISTENT);
        let span = if loc.is_non_existent() {
            Span::empty(fallback)
        } else {
            self.span_for(&loc)
        };

        Ok(Block {
            body,
            block_params: program.block_params.clone(),
            chained: program.chained,
            span,
        })
    }

    // ====================================================================
    // Mustaches
    // ====================================================================

    fn mustache(&mut self, mustache: &cst::MustacheStatement) -> Result<(), SyntaxError> {
        if self.in_comment(&mustache.loc)? {
            return Ok(());
        }
        let dynamic = self.translate_mustache(mustache)?;
        self.inject(dynamic)
    }

    fn translate_mustache(&self, mustache: &cst::MustacheStatement) -> Result<Dynamic, SyntaxError> {
        let span = self.span_for(&mustache.loc);
        let trusting = !mustache.escaped;
        let strip = mustache.strip.into();

        if let Expression::Literal(value) = self.expression(&mustache.path)? {
            if !mustache.params.is_empty() || mustache.hash.is_some() {
                return Err(self.not_callable(&value));
            }
            return Ok(Dynamic::Content(ContentMustache {
                hash: Hash::empty(value.span.end),
                value,
                trusting,
                strip,
                span,
            }));
        }

        let call = self.call(&mustache.path, &mustache.params, mustache.hash.as_ref())?;
        Ok(Dynamic::Mustache(MustacheStatement {
            path: call.path,
            params: call.params,
            hash: call.hash,
            trusting,
            strip,
            span,
        }))
    }

    fn decorator(&mut self, decorator: &cst::MustacheStatement) -> Result<(), SyntaxError> {
        if self.in_comment(&decorator.loc)? {
            return Ok(());
        }
        let span = self.span_for(&decorator.loc);
        if !self.tokenizer.state().is_data() {
            return Err(self.error(
                "A decorator may only be used inside an HTML element or another block.",
                span,
            ));
        }

        let call = self.call(&decorator.path, &decorator.params, decorator.hash.as_ref())?;
        self.handlers.append(Statement::Decorator(MustacheStatement {
            path: call.path,
            params: call.params,
            hash: call.hash,
            trusting: !decorator.escaped,
            strip: decorator.strip.into(),
            span,
        }));
        Ok(())
    }

    /// Place a mustache according to where the tokenizer stands.
    fn inject(&mut self, dynamic: Dynamic) -> Result<(), SyntaxError> {
        match self.tokenizer.state() {
            TokenizerState::TagOpen | TokenizerState::TagName => Err(self.error(
                "Cannot use mustaches in an elements tagname",
                dynamic.span(),
            )),
            TokenizerState::BeforeAttributeName => self.add_modifier(dynamic),
            TokenizerState::AttributeName | TokenizerState::AfterAttributeName => {
                let position = self.tokenizer.position();
                self.handlers.begin_attribute_value(false, position)?;
                self.handlers.finish_attribute_value(position)?;
                self.add_modifier(dynamic)?;
                self.tokenizer.transition_to(TokenizerState::BeforeAttributeName);
                Ok(())
            }
            TokenizerState::AfterAttributeValueQuoted => {
                self.add_modifier(dynamic)?;
                self.tokenizer.transition_to(TokenizerState::BeforeAttributeName);
                Ok(())
            }
            TokenizerState::BeforeAttributeValue => {
                let position = self.tokenizer.position();
                self.handlers.begin_attribute_value(false, position)?;
                self.handlers.append_dynamic_attribute_value_part(dynamic.into_part());
                self.tokenizer.transition_to(TokenizerState::AttributeValueUnquoted);
                Ok(())
            }
            state if state.is_attribute_value() => {
                self.handlers.append_dynamic_attribute_value_part(dynamic.into_part());
                Ok(())
            }
            _ => {
                self.handlers.append(dynamic.into_statement());
                Ok(())
            }
        }
    }

    fn add_modifier(&mut self, dynamic: Dynamic) -> Result<(), SyntaxError> {
        let modifier = match dynamic {
            Dynamic::Mustache(m) => ElementModifierStatement {
                path: m.path,
                params: m.params,
                hash: m.hash,
                span: m.span,
            },
            Dynamic::Content(m) => {
                let tag = self.handlers.start_tag_name().unwrap_or_default();
                let written = format!("{{{{{}}}}}", m.value);
                return Err(self.error(
                    format!("In <{tag} ... {written} ..., {written} is not a valid modifier"),
                    m.span,
                ));
            }
        };
        self.handlers.add_modifier(modifier)
    }

    // ====================================================================
    // Comments and partials
    // ====================================================================

    fn mustache_comment(&mut self, comment: &cst::CommentStatement) -> Result<(), SyntaxError> {
        if self.in_comment(&comment.loc)? {
            return Ok(());
        }
        let node = MustacheCommentStatement {
            value: comment.value.clone(),
            span: self.span_for(&comment.loc),
        };

        match self.tokenizer.state() {
            TokenizerState::BeforeAttributeName => self.handlers.add_tag_comment(node),
            TokenizerState::AfterAttributeName => {
                let position = self.tokenizer.position();
                self.handlers.begin_attribute_value(false, position)?;
                self.handlers.finish_attribute_value(position)?;
                self.handlers.add_tag_comment(node)?;
                self.tokenizer.transition_to(TokenizerState::BeforeAttributeName);
                Ok(())
            }
            TokenizerState::BeforeData | TokenizerState::Data => {
                self.handlers.append(Statement::MustacheComment(node));
                Ok(())
            }
            state => Err(self.error(
                format!("Using a Handlebars comment when in the `{state}` state is not supported"),
                node.span,
            )),
        }
    }

    fn partial(&mut self, partial: &cst::PartialStatement) -> Result<(), SyntaxError> {
        if self.in_comment(&partial.loc)? {
            return Ok(());
        }
        let name = self.expression(&partial.name)?;
        let (params, hash) = self.arguments(&name, &partial.params, partial.hash.as_ref())?;
        self.handlers.append(Statement::Partial(PartialStatement {
            name,
            params,
            hash,
            indent: partial.indent.clone(),
            strip: partial.strip.into(),
            span: self.span_for(&partial.loc),
        }));
        Ok(())
    }

    fn partial_block(&mut self, partial: &cst::PartialBlockStatement) -> Result<(), SyntaxError> {
        if self.in_comment(&partial.loc)? {
            return Ok(());
        }
        let span = self.span_for(&partial.loc);
        let name = self.expression(&partial.name)?;
        let (params, hash) = self.arguments(&name, &partial.params, partial.hash.as_ref())?;
        let program = self.block_body(&partial.program, span.start)?;

        self.handlers.append(Statement::PartialBlock(PartialBlockStatement {
            name,
            params,
            hash,
            program,
            open_strip: partial.open_strip.into(),
            close_strip: partial.close_strip.into(),
            span,
        }));
        Ok(())
    }

    // ====================================================================
    // Expressions
    // ====================================================================

    fn expression(&self, expression: &cst::Expression) -> Result<Expression, SyntaxError> {
        let literal = |kind: LiteralKind, loc: &cst::SourceLocation| -> Result<Expression, SyntaxError> {
            Ok(Expression::Literal(Literal {
                kind,
                span: self.span_for(loc),
            }))
        };

        match expression {
            cst::Expression::Path(path) => Ok(resolve_path(path, self.source())?.into()),
            cst::Expression::SubExpression(sexpr) => {
                let call = self.call(&sexpr.path, &sexpr.params, sexpr.hash.as_ref())?;
                Ok(Expression::SubExpression(SubExpression {
                    path: Box::new(call.path),
                    params: call.params,
                    hash: call.hash,
                    span: self.span_for(&sexpr.loc),
                }))
            }
            cst::Expression::String(s) => literal(LiteralKind::String(s.value.clone()), &s.loc),
            cst::Expression::Number(n) => literal(
                LiteralKind::Number {
                    value: n.value,
                    original: n.original.clone(),
                },
                &n.loc,
            ),
            cst::Expression::Boolean(b) => literal(LiteralKind::Boolean(b.value), &b.loc),
            cst::Expression::Null(loc) => literal(LiteralKind::Null, loc),
            cst::Expression::Undefined(loc) => literal(LiteralKind::Undefined, loc),
        }
    }

    /// Resolve a call whose target must be invocable.
    fn call(
        &self,
        path: &cst::Expression,
        params: &[cst::Expression],
        hash: Option<&cst::Hash>,
    ) -> Result<Call, SyntaxError> {
        let path = match self.expression(path)? {
            Expression::Literal(literal) => return Err(self.not_callable(&literal)),
            path => path,
        };
        let (params, hash) = self.arguments(&path, params, hash)?;
        Ok(Call { path, params, hash })
    }

    /// Translate params and hash. A missing hash is empty and sits right
    /// after the last param, or after the target when there are none.
    fn arguments(
        &self,
        target: &Expression,
        params: &[cst::Expression],
        hash: Option<&cst::Hash>,
    ) -> Result<(Vec<Expression>, Hash), SyntaxError> {
        let params = params
            .iter()
            .map(|param| self.expression(param))
            .collect::<Result<Vec<_>, _>>()?;

        let hash = match hash {
            Some(hash) => Hash {
                pairs: hash
                    .pairs
                    .iter()
                    .map(|pair| {
                        Ok(HashPair {
                            key: pair.key.clone(),
                            value: self.expression(&pair.value)?,
                            span: self.span_for(&pair.loc),
                        })
                    })
                    .collect::<Result<Vec<_>, SyntaxError>>()?,
                span: self.span_for(&hash.loc),
            },
            None => {
                let end = params.last().map_or(target.span(), Expression::span).end;
                Hash::empty(end)
            }
        };
        Ok((params, hash))
    }

    fn not_callable(&self, literal: &Literal) -> SyntaxError {
        let shown = match &literal.kind {
            LiteralKind::String(value) => value.clone(),
            _ => literal.to_string(),
        };
        self.error(
            format!(
                "{} \"{shown}\" cannot be called as a sub-expression, replace ({literal}) with {literal}",
                literal.type_name()
            ),
            literal.span,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AttrValue, ElementNode, PathHead};
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> Result<Template, SyntaxError> {
        let program = cst::parse(text, &cst::ParseOptions::default())
            .unwrap_or_else(|error| panic!("CST parse failed: {error}"));
        TemplateParser::new(Source::new(text), TokenizerMode::Precompile).parse(&program, Vec::new())
    }

    fn body(text: &str) -> Vec<Statement> {
        parse(text).unwrap().body
    }

    fn message(text: &str) -> String {
        parse(text).unwrap_err().message
    }

    fn element(statement: &Statement) -> &ElementNode {
        match statement {
            Statement::Element(element) => element,
            other => panic!("Expected element, got {other:?}"),
        }
    }

    // ====================================================================
    // Content and children
    // ====================================================================

    #[test]
    fn test_text_around_mustache() {
        let body = body("Hello {{name}}!");
        assert_eq!(body.len(), 3);
        assert_eq!(body[0].span(), Span::new(0, 6));
        assert_eq!(body[1].span(), Span::new(6, 14));
        assert_eq!(body[2].span(), Span::new(14, 15));
        match &body[1] {
            Statement::Mustache(m) => {
                assert!(!m.trusting);
                assert_eq!(m.hash, Hash::empty(12));
            }
            other => panic!("Expected mustache, got {other:?}"),
        }
    }

    #[test]
    fn test_mustache_child_of_element() {
        let body = body("<p>{{this.name}}</p>");
        let p = element(&body[0]);
        assert_eq!(p.span, Span::new(0, 20));
        match &p.children[0] {
            Statement::Mustache(m) => match &m.path {
                Expression::Path(path) => {
                    assert_eq!(path.head, PathHead::This { span: Span::new(5, 9) });
                    assert_eq!(path.tail, vec!["name"]);
                }
                other => panic!("Expected path, got {other:?}"),
            },
            other => panic!("Expected mustache, got {other:?}"),
        }
    }

    #[test]
    fn test_literal_mustache() {
        let body = body(r#"{{"hi"}}"#);
        match &body[0] {
            Statement::ContentMustache(m) => {
                assert_eq!(m.value.kind, LiteralKind::String("hi".into()));
                assert_eq!(m.hash, Hash::empty(6));
                assert_eq!(m.span, Span::new(0, 8));
            }
            other => panic!("Expected content mustache, got {other:?}"),
        }
    }

    // ====================================================================
    // Context injection
    // ====================================================================

    #[test]
    fn test_modifier_positions() {
        let body = body(r#"<div {{a}} class="x"{{b}} hidden {{c}}></div>"#);
        let div = element(&body[0]);
        assert_eq!(div.modifiers.len(), 3);
        let names: Vec<&str> = div.attributes.iter().map(|attr| attr.name.as_str()).collect();
        assert_eq!(names, vec!["class", "hidden"]);
    }

    #[test]
    fn test_unquoted_mustache_value() {
        let body = body("<div class={{cls}}></div>");
        let div = element(&body[0]);
        assert_eq!(div.attributes[0].span, Span::new(5, 18));
        match &div.attributes[0].value {
            AttrValue::Mustache(m) => assert_eq!(m.span, Span::new(11, 18)),
            other => panic!("Expected mustache value, got {other:?}"),
        }
    }

    #[test]
    fn test_quoted_concat_value() {
        let body = body(r#"<div class="a {{b}} c"></div>"#);
        let div = element(&body[0]);
        match &div.attributes[0].value {
            AttrValue::Concat(concat) => {
                assert_eq!(concat.span, Span::new(11, 22));
                assert_eq!(concat.parts.len(), 3);
                assert_eq!(concat.parts[0].span(), Span::new(12, 14));
                assert_eq!(concat.parts[1].span(), Span::new(14, 19));
                assert_eq!(concat.parts[2].span(), Span::new(19, 21));
            }
            other => panic!("Expected concat, got {other:?}"),
        }
    }

    #[test]
    fn test_mustache_in_tag_name() {
        assert_eq!(message("<div{{x}}></div>"), "Cannot use mustaches in an elements tagname");
    }

    #[test]
    fn test_literal_modifier() {
        assert_eq!(
            message(r#"<div {{"x"}}></div>"#),
            r#"In <div ... {{"x"}} ..., {{"x"}} is not a valid modifier"#
        );
    }

    #[test]
    fn test_mixed_unquoted_value() {
        assert!(message("<div class=a{{b}}></div>").starts_with("An unquoted attribute value"));
    }

    // ====================================================================
    // Comments
    // ====================================================================

    #[test]
    fn test_mustache_inside_html_comment() {
        let body = body("<!-- {{foo}} -->");
        assert_eq!(body.len(), 1);
        match &body[0] {
            Statement::Comment(comment) => assert_eq!(comment.value, " {{foo}} "),
            other => panic!("Expected comment, got {other:?}"),
        }
    }

    #[test]
    fn test_mustache_comment_placement() {
        let body = body("<div {{! tag }}>{{! child }}</div>");
        let div = element(&body[0]);
        assert_eq!(div.comments.len(), 1);
        assert_eq!(div.comments[0].value, " tag ");
        assert!(matches!(div.children[0], Statement::MustacheComment(_)));
    }

    #[test]
    fn test_mustache_comment_ends_valueless_attribute() {
        let body = body("<div a {{!c}} b></div>");
        let div = element(&body[0]);
        assert_eq!(div.comments[0].span, Span::new(7, 13));

        let names: Vec<&str> = div.attributes.iter().map(|attr| attr.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(div.attributes[0].span, Span::new(5, 7));
        assert_eq!(div.attributes[0].value.span(), Span::empty(7));
        assert!(!div.attributes[0].span.contains(div.comments[0].span));
    }

    #[test]
    fn test_mustache_comment_in_attribute_value() {
        assert_eq!(
            message(r#"<div class="{{! no }}"></div>"#),
            "Using a Handlebars comment when in the `attributeValueDoubleQuoted` state is not supported"
        );
    }

    // ====================================================================
    // Blocks
    // ====================================================================

    #[test]
    fn test_block_bodies() {
        let body = body("{{#if a}}<b>x</b>{{else}}y{{/if}}");
        match &body[0] {
            Statement::Block(block) => {
                assert_eq!(block.span, Span::new(0, 33));
                assert_eq!(block.program.span, Span::new(9, 17));
                assert!(matches!(block.program.body[0], Statement::Element(_)));
                let inverse = block.inverse.as_ref().unwrap();
                assert_eq!(inverse.span, Span::new(25, 26));
            }
            other => panic!("Expected block, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_block_body_sits_at_block_start() {
        let body = body("ab{{#if a}}{{/if}}");
        match &body[1] {
            Statement::Block(block) => assert_eq!(block.program.span, Span::empty(2)),
            other => panic!("Expected block, got {other:?}"),
        }
    }

    #[test]
    fn test_block_inside_tag() {
        assert_eq!(
            message("<div {{#if a}}{{/if}}></div>"),
            "A block may only be used inside an HTML element or another block."
        );
    }

    #[test]
    fn test_element_left_open_in_block() {
        assert_eq!(message("{{#if a}}<div>{{/if}}</div>"), "Unclosed element `div`");
    }

    #[test]
    fn test_markup_cut_by_block_boundary() {
        let cases = [
            ("{{#if a}}<p {{/if}}></p>", "Unclosed element `p`", Span::new(9, 12)),
            ("{{#if a}}<div{{else}}></div>{{/if}}", "Unclosed element `div`", Span::new(9, 13)),
            ("{{#if a}}<!-- {{/if}} -->", "Unclosed comment", Span::new(9, 14)),
            ("<p>{{#if a}}</p{{/if}}>", "Unclosed end tag `</p`", Span::new(12, 15)),
        ];
        for (text, expected, span) in cases {
            let error = parse(text).unwrap_err();
            assert_eq!(error.message, expected, "template: {text:?}");
            assert_eq!(error.span, span, "template: {text:?}");
        }
    }

    #[test]
    fn test_markup_cut_by_partial_block_boundary() {
        assert_eq!(message("{{#> layout}}<p {{/layout}}></p>"), "Unclosed element `p`");
    }

    #[test]
    fn test_literal_sub_expression_target() {
        assert_eq!(
            message(r#"{{foo ("bar")}}"#),
            r#"StringLiteral "bar" cannot be called as a sub-expression, replace ("bar") with "bar""#
        );
    }
}
