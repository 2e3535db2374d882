//! Lexer for the Handlebars grammar.
//!
//! Runs in two modes. Outside mustaches everything up to the next `{{` is one
//! content token (with `\{{` escapes); inside a mustache it produces the
//! path, literal and punctuation tokens up to the matching close.

use crate::cst::{Position, SourceLocation, StripFlags};
use crate::CstError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub loc: SourceLocation,
    pub value: TokenValue,
    /// `~` markers: `open` on opening delimiters, `close` on closing ones.
    pub strip: StripFlags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Content,
    Comment,

    // Mustache openers
    Open,
    OpenUnescaped,
    OpenAmpersand,
    OpenBlock,
    OpenDecorator,
    OpenDecoratorBlock,
    OpenPartial,
    OpenPartialBlock,
    OpenEndBlock,
    OpenInverse,
    OpenInverseChain,
    /// A complete `{{else}}` or `{{^}}`.
    Inverse,

    // Closers
    Close,
    CloseUnescaped,

    // Inside a mustache
    OpenSexpr,
    CloseSexpr,
    Equals,
    Data,
    Sep,
    Id,
    OpenBlockParams,
    CloseBlockParams,
    String,
    Number,
    Boolean,
    Undefined,
    Null,

    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenValue {
    None,
    Text(String),
    Number { value: f64, text: String },
    Boolean(bool),
    /// `literal` is set for `[bracketed]` segments.
    Id { name: String, literal: bool },
}

impl TokenKind {
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Content => "content",
            TokenKind::Comment => "a comment",
            TokenKind::Open
            | TokenKind::OpenUnescaped
            | TokenKind::OpenAmpersand
            | TokenKind::OpenBlock
            | TokenKind::OpenDecorator
            | TokenKind::OpenDecoratorBlock
            | TokenKind::OpenPartial
            | TokenKind::OpenPartialBlock
            | TokenKind::OpenEndBlock
            | TokenKind::OpenInverse => "an opening `{{`",
            TokenKind::OpenInverseChain => "`{{else ...`",
            TokenKind::Inverse => "`{{else}}`",
            TokenKind::Close => "`}}`",
            TokenKind::CloseUnescaped => "`}}}`",
            TokenKind::OpenSexpr => "`(`",
            TokenKind::CloseSexpr => "`)`",
            TokenKind::Equals => "`=`",
            TokenKind::Data => "`@`",
            TokenKind::Sep => "a path separator",
            TokenKind::Id => "an identifier",
            TokenKind::OpenBlockParams => "`as |`",
            TokenKind::CloseBlockParams => "`|`",
            TokenKind::String => "a string",
            TokenKind::Number => "a number",
            TokenKind::Boolean => "a boolean",
            TokenKind::Undefined => "`undefined`",
            TokenKind::Null => "`null`",
            TokenKind::Eof => "end of input",
        }
    }
}

fn is_id_char(ch: char) -> bool {
    !ch.is_whitespace()
        && !matches!(
            ch,
            '!' | '"'
                | '#'
                | '%'
                | '&'
                | '\''
                | '('
                | ')'
                | '*'
                | '+'
                | ','
                | '.'
                | '/'
                | ';'
                | '<'
                | '='
                | '>'
                | '@'
                | '['
                | '\\'
                | ']'
                | '^'
                | '`'
                | '{'
                | '|'
                | '}'
                | '~'
        )
}

/// Characters that may follow a `.` used as a whole path segment.
fn is_lookahead(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '=' | '~' | '}' | '/' | '.' | ')' | '|')
}

/// Characters that may follow a literal.
fn is_literal_lookahead(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '~' | '}' | ')')
}

pub(crate) struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    in_mustache: bool,
    triple: bool,
}

#[derive(Clone, Copy)]
struct Mark {
    pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 0,
            in_mustache: false,
            triple: false,
        }
    }

    /// Tokenize the entire source. The last token is always `Eof`.
    pub fn tokenize(source: &str) -> Result<Vec<Token>, CstError> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();

        loop {
            let token = lexer.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, CstError> {
        if self.in_mustache {
            return self.lex_mustache_token();
        }
        if self.is_at_end() {
            let here = self.position();
            return Ok(self.token(TokenKind::Eof, here, TokenValue::None));
        }
        if self.starts_with("{{") {
            return self.lex_open();
        }
        if self.starts_with("\\{{") {
            self.advance();
            return Ok(self.lex_escaped_content());
        }
        Ok(self.lex_content())
    }

    // ====================================================================
    // Content
    // ====================================================================

    fn lex_content(&mut self) -> Token {
        let start = self.position();
        let mut text = String::new();

        while !self.is_at_end() {
            if self.starts_with("{{") || self.starts_with("\\{{") {
                break;
            }
            if self.starts_with("\\\\{{") {
                // `\\{{` is a literal backslash before a real mustache.
                text.push('\\');
                self.advance();
                self.advance();
                break;
            }
            if let Some(ch) = self.advance() {
                text.push(ch);
            }
        }

        self.token(TokenKind::Content, start, TokenValue::Text(text))
    }

    /// Text after `\{{`, taken literally up to the next mustache or escape.
    fn lex_escaped_content(&mut self) -> Token {
        let start = self.position();
        let mut text = String::new();
        for _ in 0..2 {
            if let Some(ch) = self.advance() {
                text.push(ch);
            }
        }

        while !self.is_at_end() {
            if self.starts_with("{{") || self.starts_with("\\{{") || self.starts_with("\\\\{{") {
                break;
            }
            if let Some(ch) = self.advance() {
                text.push(ch);
            }
        }

        self.token(TokenKind::Content, start, TokenValue::Text(text))
    }

    // ====================================================================
    // Openers
    // ====================================================================

    fn lex_open(&mut self) -> Result<Token, CstError> {
        let start = self.position();
        let begin = self.pos;
        self.advance();
        self.advance();
        let strip_left = self.eat('~');

        let kind = match self.current() {
            Some('{') => {
                self.advance();
                self.triple = true;
                TokenKind::OpenUnescaped
            }
            Some('&') => {
                self.advance();
                TokenKind::OpenAmpersand
            }
            Some('!') => return self.lex_comment(start, begin),
            Some('#') => {
                self.advance();
                if self.eat('>') {
                    TokenKind::OpenPartialBlock
                } else if self.eat('*') {
                    TokenKind::OpenDecoratorBlock
                } else {
                    TokenKind::OpenBlock
                }
            }
            Some('/') => {
                self.advance();
                TokenKind::OpenEndBlock
            }
            Some('^') => {
                self.advance();
                if let Some(strip_right) = self.try_close() {
                    let mut token = self.token(TokenKind::Inverse, start, TokenValue::None);
                    token.strip = StripFlags::new(strip_left, strip_right);
                    return Ok(token);
                }
                TokenKind::OpenInverse
            }
            Some('>') => {
                self.advance();
                TokenKind::OpenPartial
            }
            Some('*') => {
                self.advance();
                TokenKind::OpenDecorator
            }
            _ => {
                let mark = self.mark();
                self.skip_whitespace();
                let is_else = self.starts_with("else")
                    && self
                        .peek_at(4)
                        .map_or(true, |ch| ch.is_whitespace() || ch == '~' || ch == '}');
                if is_else {
                    for _ in 0..4 {
                        self.advance();
                    }
                    if let Some(strip_right) = self.try_close() {
                        let mut token = self.token(TokenKind::Inverse, start, TokenValue::None);
                        token.strip = StripFlags::new(strip_left, strip_right);
                        return Ok(token);
                    }
                    TokenKind::OpenInverseChain
                } else {
                    self.reset(mark);
                    TokenKind::Open
                }
            }
        };

        self.in_mustache = true;
        let mut token = self.token(kind, start, TokenValue::None);
        token.strip = StripFlags::new(strip_left, false);
        Ok(token)
    }

    /// Consume `}}` or `~}}` after optional whitespace, reporting the `~`.
    fn try_close(&mut self) -> Option<bool> {
        let mark = self.mark();
        self.skip_whitespace();
        if self.starts_with("~}}") {
            for _ in 0..3 {
                self.advance();
            }
            return Some(true);
        }
        if self.starts_with("}}") {
            self.advance();
            self.advance();
            return Some(false);
        }
        self.reset(mark);
        None
    }

    fn lex_comment(&mut self, start: Position, begin: usize) -> Result<Token, CstError> {
        if self.starts_with("!--") {
            for _ in 0..3 {
                self.advance();
            }
            loop {
                if self.is_at_end() {
                    return Err(self.error_at(start, "Unterminated comment"));
                }
                if self.starts_with("--}}") {
                    for _ in 0..4 {
                        self.advance();
                    }
                    break;
                }
                if self.starts_with("--~}}") {
                    for _ in 0..5 {
                        self.advance();
                    }
                    break;
                }
                self.advance();
            }
        } else {
            loop {
                if self.is_at_end() {
                    return Err(self.error_at(start, "Unterminated comment"));
                }
                if self.starts_with("}}") {
                    self.advance();
                    self.advance();
                    break;
                }
                self.advance();
            }
        }

        let raw: String = self.chars[begin..self.pos].iter().collect();
        Ok(self.token(TokenKind::Comment, start, TokenValue::Text(raw)))
    }

    // ====================================================================
    // Mustache interior
    // ====================================================================

    fn lex_mustache_token(&mut self) -> Result<Token, CstError> {
        self.skip_whitespace();
        let start = self.position();

        let Some(ch) = self.current() else {
            return Err(self.error_at(start, "Expected `}}` but the template ended"));
        };

        match ch {
            '}' | '~' => self.lex_close(start),
            '(' => Ok(self.single(TokenKind::OpenSexpr, start)),
            ')' => Ok(self.single(TokenKind::CloseSexpr, start)),
            '=' => Ok(self.single(TokenKind::Equals, start)),
            '|' => Ok(self.single(TokenKind::CloseBlockParams, start)),
            '@' => Ok(self.single(TokenKind::Data, start)),
            '/' => {
                self.advance();
                Ok(self.token(TokenKind::Sep, start, TokenValue::Text("/".to_string())))
            }
            '.' => {
                if self.starts_with("..") {
                    self.advance();
                    self.advance();
                    return Ok(self.id_token(start, "..".to_string(), false));
                }
                self.advance();
                if self.current().map_or(true, is_lookahead) {
                    Ok(self.id_token(start, ".".to_string(), false))
                } else {
                    Ok(self.token(TokenKind::Sep, start, TokenValue::Text(".".to_string())))
                }
            }
            '"' | '\'' => self.lex_string(start, ch),
            '[' => self.lex_bracketed(start),
            _ => self.lex_word(start, ch),
        }
    }

    fn lex_close(&mut self, start: Position) -> Result<Token, CstError> {
        let (kind, strip_right, len) = if self.triple && self.starts_with("}~}}") {
            (TokenKind::CloseUnescaped, true, 4)
        } else if self.triple && self.starts_with("}}}") {
            (TokenKind::CloseUnescaped, false, 3)
        } else if self.starts_with("~}}") {
            (TokenKind::Close, true, 3)
        } else if self.starts_with("}}") {
            (TokenKind::Close, false, 2)
        } else {
            let ch = self.current().unwrap_or('}');
            return Err(self.error_at(start, &format!("Unexpected character `{ch}`")));
        };

        for _ in 0..len {
            self.advance();
        }
        self.in_mustache = false;
        self.triple = false;

        let mut token = self.token(kind, start, TokenValue::None);
        token.strip = StripFlags::new(false, strip_right);
        Ok(token)
    }

    fn lex_string(&mut self, start: Position, quote: char) -> Result<Token, CstError> {
        self.advance();
        let mut value = String::new();
        loop {
            match self.advance() {
                None => return Err(self.error_at(start, "Unterminated string")),
                Some('\\') if self.current() == Some(quote) => {
                    self.advance();
                    value.push(quote);
                }
                Some(ch) if ch == quote => break,
                Some(ch) => value.push(ch),
            }
        }
        Ok(self.token(TokenKind::String, start, TokenValue::Text(value)))
    }

    /// `[segment with any characters]`, with `\]` and `\\` escapes.
    fn lex_bracketed(&mut self, start: Position) -> Result<Token, CstError> {
        self.advance();
        let mut name = String::new();
        loop {
            match self.advance() {
                None => return Err(self.error_at(start, "Unterminated `[` segment")),
                Some('\\') if matches!(self.current(), Some(']') | Some('\\')) => {
                    if let Some(ch) = self.advance() {
                        name.push(ch);
                    }
                }
                Some(']') => break,
                Some(ch) => name.push(ch),
            }
        }
        Ok(self.id_token(start, name, true))
    }

    fn lex_word(&mut self, start: Position, ch: char) -> Result<Token, CstError> {
        if self.starts_with("as") && self.peek_at(2).is_some_and(char::is_whitespace) {
            let mark = self.mark();
            self.advance();
            self.advance();
            self.skip_whitespace();
            if self.eat('|') {
                return Ok(self.token(TokenKind::OpenBlockParams, start, TokenValue::None));
            }
            self.reset(mark);
        }

        if let Some(len) = self.number_len() {
            let text: String = self.chars[self.pos..self.pos + len].iter().collect();
            for _ in 0..len {
                self.advance();
            }
            let value = text.parse::<f64>().unwrap_or(f64::NAN);
            return Ok(self.token(TokenKind::Number, start, TokenValue::Number { value, text }));
        }

        let mut word = String::new();
        while let Some(c) = self.current() {
            if !is_id_char(c) {
                break;
            }
            word.push(c);
            self.advance();
        }
        if word.is_empty() {
            return Err(self.error_at(start, &format!("Unexpected character `{ch}`")));
        }

        if self.current().map_or(true, is_literal_lookahead) {
            match word.as_str() {
                "true" | "false" => {
                    let value = TokenValue::Boolean(word == "true");
                    return Ok(self.token(TokenKind::Boolean, start, value));
                }
                "undefined" => return Ok(self.token(TokenKind::Undefined, start, TokenValue::None)),
                "null" => return Ok(self.token(TokenKind::Null, start, TokenValue::None)),
                _ => {}
            }
        }

        Ok(self.id_token(start, word, false))
    }

    /// Length of a number literal at the cursor: `-?\d+(\.\d+)?` followed by
    /// a literal terminator.
    fn number_len(&self) -> Option<usize> {
        let mut i = self.pos;
        if self.chars.get(i) == Some(&'-') {
            i += 1;
        }
        let digits_start = i;
        while self.chars.get(i).is_some_and(char::is_ascii_digit) {
            i += 1;
        }
        if i == digits_start {
            return None;
        }
        if self.chars.get(i) == Some(&'.')
            && self.chars.get(i + 1).is_some_and(char::is_ascii_digit)
        {
            i += 1;
            while self.chars.get(i).is_some_and(char::is_ascii_digit) {
                i += 1;
            }
        }
        match self.chars.get(i) {
            Some(&c) if !is_literal_lookahead(c) => None,
            _ => Some(i - self.pos),
        }
    }

    // ====================================================================
    // Cursor helpers
    // ====================================================================

    fn token(&self, kind: TokenKind, start: Position, value: TokenValue) -> Token {
        Token {
            kind,
            loc: SourceLocation::new(start, self.position()),
            value,
            strip: StripFlags::default(),
        }
    }

    fn single(&mut self, kind: TokenKind, start: Position) -> Token {
        self.advance();
        self.token(kind, start, TokenValue::None)
    }

    fn id_token(&self, start: Position, name: String, literal: bool) -> Token {
        self.token(TokenKind::Id, start, TokenValue::Id { name, literal })
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    fn reset(&mut self, mark: Mark) {
        self.pos = mark.pos;
        self.line = mark.line;
        self.column = mark.column;
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn starts_with(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, ch)| self.chars.get(self.pos + i) == Some(&ch))
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.current() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.current().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn error_at(&self, at: Position, message: &str) -> CstError {
        CstError {
            message: message.to_string(),
            line: at.line,
            column: at.column,
        }
    }
}
