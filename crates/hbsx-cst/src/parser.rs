//! Recursive-descent parser over the Handlebars token stream.
//!
//! Produces the located CST. Whitespace control runs as each body is
//! completed, so the tree handed back is final.

use crate::cst::*;
use crate::lexer::{Token, TokenKind, TokenValue};
use crate::whitespace::{self, StripInfo};
use crate::{CstError, ParseOptions};

/// The `{{#name params hash as |x|}}` part of a block.
struct BlockOpen {
    path: Expression,
    params: Vec<Expression>,
    hash: Option<Hash>,
    block_params: Vec<String>,
    strip: StripFlags,
    loc: SourceLocation,
}

/// The `{{/name}}` part of a block.
struct BlockClose {
    strip: StripFlags,
    loc: SourceLocation,
}

pub(crate) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    ignore_standalone: bool,
}

impl Parser {
    pub fn new(tokens: Vec<Token>, options: &ParseOptions) -> Self {
        Self {
            tokens,
            pos: 0,
            ignore_standalone: options.ignore_standalone,
        }
    }

    /// Parse the whole template.
    pub fn parse(&mut self) -> Result<Program, CstError> {
        let program = self.parse_program(true)?;

        let token = self.peek();
        match token.kind {
            TokenKind::Eof => Ok(program),
            TokenKind::OpenEndBlock => {
                Err(self.error(token, "Unexpected closing block without an open block"))
            }
            TokenKind::Inverse | TokenKind::OpenInverseChain => {
                Err(self.error(token, "Unexpected `{{else}}` outside of a block"))
            }
            _ => Err(self.unexpected(token, "a statement")),
        }
    }

    // ====================================================================
    // Statements
    // ====================================================================

    fn parse_program(&mut self, is_root: bool) -> Result<Program, CstError> {
        let mut body = Vec::new();
        let mut strips = Vec::new();

        loop {
            match self.peek().kind {
                TokenKind::Eof
                | TokenKind::OpenEndBlock
                | TokenKind::Inverse
                | TokenKind::OpenInverseChain => break,
                _ => {
                    let (statement, strip) = self.parse_statement()?;
                    body.push(statement);
                    strips.push(strip);
                }
            }
        }

        whitespace::strip_body(&mut body, &strips, is_root, self.ignore_standalone);
        Ok(Program::new(body))
    }

    fn parse_statement(&mut self) -> Result<(Statement, Option<StripInfo>), CstError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Content => {
                let text = text_of(&token);
                let content = ContentStatement {
                    value: text.clone(),
                    original: text,
                    left_stripped: false,
                    right_stripped: false,
                    loc: token.loc,
                };
                Ok((Statement::Content(content), None))
            }
            TokenKind::Comment => {
                let raw = text_of(&token);
                let strip = comment_strip(&raw);
                let comment = CommentStatement {
                    value: strip_comment(&raw),
                    strip,
                    loc: token.loc,
                };
                Ok((Statement::Comment(comment), Some(StripInfo::inline(strip))))
            }
            TokenKind::Open
            | TokenKind::OpenUnescaped
            | TokenKind::OpenAmpersand
            | TokenKind::OpenDecorator => self.parse_mustache(token),
            TokenKind::OpenPartial => self.parse_partial(token),
            TokenKind::OpenBlock | TokenKind::OpenDecoratorBlock | TokenKind::OpenInverse => {
                self.parse_block(token)
            }
            TokenKind::OpenPartialBlock => self.parse_partial_block(token),
            _ => Err(self.unexpected(&token, "a statement")),
        }
    }

    fn parse_mustache(&mut self, open: Token) -> Result<(Statement, Option<StripInfo>), CstError> {
        let path = self.parse_expression()?;
        let params = self.parse_params()?;
        let hash = self.parse_hash()?;

        let close_kind = if open.kind == TokenKind::OpenUnescaped {
            TokenKind::CloseUnescaped
        } else {
            TokenKind::Close
        };
        let close = self.expect(close_kind)?;

        let strip = StripFlags::new(open.strip.open, close.strip.close);
        let mustache = MustacheStatement {
            path,
            params,
            hash,
            escaped: !matches!(open.kind, TokenKind::OpenUnescaped | TokenKind::OpenAmpersand),
            strip,
            loc: SourceLocation::new(open.loc.start, close.loc.end),
        };

        let statement = if open.kind == TokenKind::OpenDecorator {
            Statement::Decorator(mustache)
        } else {
            Statement::Mustache(mustache)
        };
        Ok((statement, Some(StripInfo::mustache(strip))))
    }

    fn parse_partial(&mut self, open: Token) -> Result<(Statement, Option<StripInfo>), CstError> {
        let name = self.parse_expression()?;
        let params = self.parse_params()?;
        let hash = self.parse_hash()?;
        let close = self.expect(TokenKind::Close)?;

        let strip = StripFlags::new(open.strip.open, close.strip.close);
        let partial = PartialStatement {
            name,
            params,
            hash,
            indent: String::new(),
            strip,
            loc: SourceLocation::new(open.loc.start, close.loc.end),
        };
        Ok((Statement::Partial(partial), Some(StripInfo::inline(strip))))
    }

    fn parse_partial_block(
        &mut self,
        open: Token,
    ) -> Result<(Statement, Option<StripInfo>), CstError> {
        let opener = self.parse_block_open(&open)?;
        let mut program = self.parse_program(false)?;
        let close = self.parse_block_close(&opener)?;

        let strip = whitespace::strip_block(
            Some(&mut program),
            None,
            opener.strip,
            StripFlags::default(),
            close.strip,
            self.ignore_standalone,
        );

        let partial = PartialBlockStatement {
            name: opener.path,
            params: opener.params,
            hash: opener.hash,
            program,
            open_strip: opener.strip,
            close_strip: close.strip,
            loc: SourceLocation::new(opener.loc.start, close.loc.end),
        };
        Ok((Statement::PartialBlock(partial), Some(strip)))
    }

    fn parse_block(&mut self, open: Token) -> Result<(Statement, Option<StripInfo>), CstError> {
        let decorator = open.kind == TokenKind::OpenDecoratorBlock;
        let inverted = open.kind == TokenKind::OpenInverse;

        let opener = self.parse_block_open(&open)?;
        let main = self.parse_program(false)?;

        let mut chain = Vec::new();
        let mut final_inverse = None;
        loop {
            let token = self.peek().clone();
            match token.kind {
                TokenKind::OpenInverseChain => {
                    if inverted {
                        let message = "Unexpected `{{else if}}` in an inverse section";
                        return Err(self.error(&token, message));
                    }
                    self.advance();
                    let segment = self.parse_block_open(&token)?;
                    let program = self.parse_program(false)?;
                    chain.push((segment, program));
                }
                TokenKind::Inverse => {
                    self.advance();
                    let program = self.parse_program(false)?;
                    final_inverse = Some((token.strip, program));
                    break;
                }
                _ => break,
            }
        }

        let close = self.parse_block_close(&opener)?;

        if decorator && (final_inverse.is_some() || !chain.is_empty()) {
            return Err(self.error_at(opener.loc.start, "Unexpected inverse block on decorator"));
        }

        // Build `{{else if}}` links innermost first; each becomes the inverse
        // of the one before it.
        let mut tail = final_inverse;
        for (index, (segment, program)) in chain.into_iter().enumerate().rev() {
            let (inverse_strip, inverse) = match tail.take() {
                Some((strip, program)) => (strip, Some(program)),
                None => (StripFlags::default(), None),
            };
            let close_strip = if index == 0 { close.strip } else { inverse_strip };
            let segment_strip = segment.strip;
            let loc = SourceLocation::new(segment.loc.start, close.loc.start);

            let (block, _) = self.build_block(
                segment,
                program,
                inverse,
                inverse_strip,
                close_strip,
                false,
                false,
                loc,
            );
            let mut wrapper = Program::new(vec![block]);
            wrapper.chained = true;
            tail = Some((segment_strip, wrapper));
        }

        let (inverse_strip, inverse) = match tail {
            Some((strip, program)) => (strip, Some(program)),
            None => (StripFlags::default(), None),
        };
        let loc = SourceLocation::new(opener.loc.start, close.loc.end);
        let (block, strip) = self.build_block(
            opener,
            main,
            inverse,
            inverse_strip,
            close.strip,
            inverted,
            decorator,
            loc,
        );
        Ok((block, Some(strip)))
    }

    #[allow(clippy::too_many_arguments)]
    fn build_block(
        &self,
        opener: BlockOpen,
        mut main: Program,
        inverse: Option<Program>,
        inverse_strip: StripFlags,
        close_strip: StripFlags,
        inverted: bool,
        decorator: bool,
        loc: SourceLocation,
    ) -> (Statement, StripInfo) {
        main.block_params = opener.block_params;

        let (mut program, mut inverse) = if inverted {
            (inverse, Some(main))
        } else {
            (Some(main), inverse)
        };

        let strip = whitespace::strip_block(
            program.as_mut(),
            inverse.as_mut(),
            opener.strip,
            inverse_strip,
            close_strip,
            self.ignore_standalone,
        );

        let block = BlockStatement {
            path: opener.path,
            params: opener.params,
            hash: opener.hash,
            program: program.unwrap_or_else(Program::empty),
            inverse,
            open_strip: opener.strip,
            inverse_strip,
            close_strip,
            loc,
        };

        let statement = if decorator {
            Statement::DecoratorBlock(block)
        } else {
            Statement::Block(block)
        };
        (statement, strip)
    }

    fn parse_block_open(&mut self, open: &Token) -> Result<BlockOpen, CstError> {
        let path = self.parse_expression()?;
        let params = self.parse_params()?;
        let hash = self.parse_hash()?;
        let block_params = self.parse_block_params()?;
        let close = self.expect(TokenKind::Close)?;

        Ok(BlockOpen {
            path,
            params,
            hash,
            block_params,
            strip: StripFlags::new(open.strip.open, close.strip.close),
            loc: SourceLocation::new(open.loc.start, close.loc.end),
        })
    }

    fn parse_block_close(&mut self, opener: &BlockOpen) -> Result<BlockClose, CstError> {
        let name = opener.path.original();
        let open = self.peek().clone();
        if open.kind != TokenKind::OpenEndBlock {
            let message = format!(
                "Expected `{{{{/{name}}}}}` to close the block opened on line {}, got {}",
                opener.loc.start.line,
                open.kind.describe()
            );
            return Err(self.error(&open, &message));
        }
        self.advance();

        let path = self.parse_expression()?;
        let close = self.expect(TokenKind::Close)?;

        let closing = path.original();
        if closing != name {
            let loc = opener.path.loc();
            return Err(self.error_at(loc.start, &format!("{name} doesn't match {closing}")));
        }

        Ok(BlockClose {
            strip: StripFlags::new(open.strip.open, close.strip.close),
            loc: SourceLocation::new(open.loc.start, close.loc.end),
        })
    }

    fn parse_block_params(&mut self) -> Result<Vec<String>, CstError> {
        if self.peek().kind != TokenKind::OpenBlockParams {
            return Ok(Vec::new());
        }
        self.advance();

        let mut names = Vec::new();
        while self.peek().kind == TokenKind::Id {
            let token = self.advance();
            names.push(id_name(&token));
        }
        if names.is_empty() {
            let token = self.peek().clone();
            return Err(self.unexpected(&token, "a block parameter name"));
        }
        self.expect(TokenKind::CloseBlockParams)?;
        Ok(names)
    }

    // ====================================================================
    // Expressions
    // ====================================================================

    fn parse_expression(&mut self) -> Result<Expression, CstError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::OpenSexpr => self.parse_sexpr(),
            TokenKind::Id | TokenKind::Data => self.parse_path(),
            TokenKind::String => {
                self.advance();
                Ok(Expression::String(StringLiteral {
                    value: text_of(&token),
                    loc: token.loc,
                }))
            }
            TokenKind::Number => {
                self.advance();
                let (value, original) = match token.value {
                    TokenValue::Number { value, text } => (value, text),
                    _ => (f64::NAN, String::new()),
                };
                Ok(Expression::Number(NumberLiteral {
                    value,
                    original,
                    loc: token.loc,
                }))
            }
            TokenKind::Boolean => {
                self.advance();
                Ok(Expression::Boolean(BooleanLiteral {
                    value: token.value == TokenValue::Boolean(true),
                    loc: token.loc,
                }))
            }
            TokenKind::Undefined => {
                self.advance();
                Ok(Expression::Undefined(token.loc))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expression::Null(token.loc))
            }
            _ => Err(self.unexpected(&token, "an expression")),
        }
    }

    fn parse_sexpr(&mut self) -> Result<Expression, CstError> {
        let open = self.expect(TokenKind::OpenSexpr)?;
        let path = self.parse_expression()?;
        let params = self.parse_params()?;
        let hash = self.parse_hash()?;
        let close = self.expect(TokenKind::CloseSexpr)?;

        Ok(Expression::SubExpression(SubExpression {
            path: Box::new(path),
            params,
            hash,
            loc: SourceLocation::new(open.loc.start, close.loc.end),
        }))
    }

    fn parse_params(&mut self) -> Result<Vec<Expression>, CstError> {
        let mut params = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::Id if self.peek_at(1).kind == TokenKind::Equals => break,
                TokenKind::Close
                | TokenKind::CloseUnescaped
                | TokenKind::CloseSexpr
                | TokenKind::OpenBlockParams
                | TokenKind::Eof => break,
                _ => params.push(self.parse_expression()?),
            }
        }
        Ok(params)
    }

    fn parse_hash(&mut self) -> Result<Option<Hash>, CstError> {
        let mut pairs = Vec::new();
        while self.peek().kind == TokenKind::Id && self.peek_at(1).kind == TokenKind::Equals {
            let key = self.advance();
            self.advance();
            let value = self.parse_expression()?;
            let loc = SourceLocation::new(key.loc.start, value.loc().end);
            pairs.push(HashPair {
                key: id_name(&key),
                value,
                loc,
            });
        }

        let (Some(first), Some(last)) = (pairs.first(), pairs.last()) else {
            return Ok(None);
        };
        let loc = SourceLocation::new(first.loc.start, last.loc.end);
        Ok(Some(Hash { pairs, loc }))
    }

    fn parse_path(&mut self) -> Result<Expression, CstError> {
        let first = self.peek().clone();
        let data = first.kind == TokenKind::Data;
        if data {
            self.advance();
        }

        let mut original = if data { "@".to_string() } else { String::new() };
        let mut parts = Vec::new();
        let mut depth = 0;
        let mut end = first.loc.end;

        let mut separator = None;
        while self.peek().kind == TokenKind::Id {
            let token = self.advance();
            let (name, literal) = match &token.value {
                TokenValue::Id { name, literal } => (name.clone(), *literal),
                _ => (String::new(), false),
            };

            if let Some(sep) = separator.take() {
                original.push_str(sep);
            }
            original.push_str(&name);
            end = token.loc.end;

            if !literal && matches!(name.as_str(), ".." | "." | "this") {
                if !parts.is_empty() {
                    return Err(self.error_at(first.loc.start, &format!("Invalid path: {original}")));
                }
                if name == ".." {
                    depth += 1;
                }
            } else {
                parts.push(name);
            }

            if self.peek().kind == TokenKind::Sep && self.peek_at(1).kind == TokenKind::Id {
                let sep = self.advance();
                separator = Some(if text_of(&sep) == "/" { "/" } else { "." });
            } else {
                break;
            }
        }

        Ok(Expression::Path(PathExpression {
            data,
            depth,
            parts,
            original,
            loc: SourceLocation::new(first.loc.start, end),
        }))
    }

    // ====================================================================
    // Token helpers
    // ====================================================================

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.pos + offset).min(last)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len().saturating_sub(1) {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, CstError> {
        let token = self.peek().clone();
        if token.kind == kind {
            self.advance();
            Ok(token)
        } else {
            Err(self.unexpected(&token, kind.describe()))
        }
    }

    fn unexpected(&self, token: &Token, expected: &str) -> CstError {
        self.error(token, &format!("Expected {expected}, got {}", token.kind.describe()))
    }

    fn error(&self, token: &Token, message: &str) -> CstError {
        self.error_at(token.loc.start, message)
    }

    fn error_at(&self, at: Position, message: &str) -> CstError {
        CstError {
            message: message.to_string(),
            line: at.line,
            column: at.column,
        }
    }
}

fn text_of(token: &Token) -> String {
    match &token.value {
        TokenValue::Text(text) => text.clone(),
        TokenValue::Id { name, .. } => name.clone(),
        _ => String::new(),
    }
}

fn id_name(token: &Token) -> String {
    text_of(token)
}

fn comment_strip(raw: &str) -> StripFlags {
    let chars: Vec<char> = raw.chars().collect();
    let open = chars.get(2) == Some(&'~');
    let close = chars.len() >= 3 && chars[chars.len() - 3] == '~';
    StripFlags::new(open, close)
}

/// The text of `{{! ... }}` / `{{!-- ... --}}` without its delimiters.
fn strip_comment(raw: &str) -> String {
    let mut text = raw.strip_prefix("{{").unwrap_or(raw);
    text = text.strip_prefix('~').unwrap_or(text);
    text = text.strip_prefix('!').unwrap_or(text);
    for _ in 0..2 {
        text = text.strip_prefix('-').unwrap_or(text);
    }

    text = text.strip_suffix("}}").unwrap_or(text);
    text = text.strip_suffix('~').unwrap_or(text);
    for _ in 0..2 {
        text = text.strip_suffix('-').unwrap_or(text);
    }
    text.to_string()
}
