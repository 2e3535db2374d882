use crate::entities;
use crate::state::{Position, TokenizerState};

/// How character references and layout-sensitive newlines are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenizerMode {
    /// Decode character references and drop the newline right after `<pre>`
    /// and `<textarea>`, as a browser would.
    #[default]
    Precompile,
    /// Keep the text exactly as written.
    Codemod,
}

/// Receives the events produced by [`Tokenizer`].
///
/// Every method may fail; the first error aborts tokenization and is handed
/// back to the caller of [`Tokenizer::tokenize_part`].
pub trait TokenizerDelegate {
    type Error;

    fn reset(&mut self) {}

    /// A start tag begins; `pos` is the position of its `<`.
    fn begin_start_tag(&mut self, pos: Position) -> Result<(), Self::Error>;
    /// An end tag begins; `pos` is the position of its `<`.
    fn begin_end_tag(&mut self, pos: Position) -> Result<(), Self::Error>;
    fn append_to_tag_name(&mut self, ch: char) -> Result<(), Self::Error>;
    fn mark_tag_as_self_closing(&mut self) -> Result<(), Self::Error>;
    /// The current tag is complete; `pos` is just past its `>`.
    fn finish_tag(&mut self, pos: Position) -> Result<(), Self::Error>;

    fn begin_attribute(&mut self, pos: Position) -> Result<(), Self::Error>;
    fn append_to_attribute_name(&mut self, ch: char) -> Result<(), Self::Error>;
    fn begin_attribute_value(&mut self, quoted: bool, pos: Position) -> Result<(), Self::Error>;
    /// `start` and `end` delimit the source text that produced `text`.
    fn append_to_attribute_value(
        &mut self,
        text: &str,
        start: Position,
        end: Position,
    ) -> Result<(), Self::Error>;
    fn finish_attribute_value(&mut self, pos: Position) -> Result<(), Self::Error>;

    fn begin_data(&mut self, pos: Position) -> Result<(), Self::Error>;
    fn append_to_data(&mut self, text: &str) -> Result<(), Self::Error>;
    fn finish_data(&mut self, pos: Position) -> Result<(), Self::Error>;

    /// A comment begins; `pos` is the position of its `<`.
    fn begin_comment(&mut self, pos: Position) -> Result<(), Self::Error>;
    fn append_to_comment_data(&mut self, text: &str) -> Result<(), Self::Error>;
    fn finish_comment(&mut self, pos: Position) -> Result<(), Self::Error>;

    fn report_syntax_error(&mut self, message: &str, pos: Position) -> Result<(), Self::Error>;
}

/// Evented HTML tokenizer.
///
/// Input can arrive in several chunks. Between chunks the caller may inspect
/// [`state`](Tokenizer::state), move the position by assigning `line` and
/// `column`, force a state with [`transition_to`](Tokenizer::transition_to),
/// or inject raw comment text.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    state: TokenizerState,
    mode: TokenizerMode,
    pub line: usize,
    pub column: usize,
    tag_start: Position,
    tag_name_buffer: String,
}

/// One chunk of input being consumed.
struct Chunk {
    chars: Vec<char>,
    index: usize,
}

impl Chunk {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            index: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn rest(&self) -> &[char] {
        &self.chars[self.index..]
    }

    fn starts_with(&self, text: &str) -> bool {
        let rest = self.rest();
        let mut count = 0;
        for (i, ch) in text.chars().enumerate() {
            if rest.get(i) != Some(&ch) {
                return false;
            }
            count += 1;
        }
        count > 0
    }
}

fn is_space(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '\u{c}')
}

fn is_tag_name_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '@' || ch == ':'
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::with_mode(TokenizerMode::Precompile)
    }

    pub fn with_mode(mode: TokenizerMode) -> Self {
        Self {
            state: TokenizerState::BeforeData,
            mode,
            line: 1,
            column: 0,
            tag_start: Position::default(),
            tag_name_buffer: String::new(),
        }
    }

    pub fn state(&self) -> TokenizerState {
        self.state
    }

    pub fn mode(&self) -> TokenizerMode {
        self.mode
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Force the tokenizer into `state`.
    pub fn transition_to(&mut self, state: TokenizerState) {
        tracing::trace!(from = %self.state, to = %state, "tokenizer transition");
        self.state = state;
    }

    /// Return to the initial state at line 1, column 0.
    pub fn reset<D: TokenizerDelegate>(&mut self, delegate: &mut D) {
        self.state = TokenizerState::BeforeData;
        self.line = 1;
        self.column = 0;
        self.tag_start = Position::default();
        self.tag_name_buffer.clear();
        delegate.reset();
    }

    /// Tokenize a complete document.
    pub fn tokenize<D: TokenizerDelegate>(
        &mut self,
        input: &str,
        delegate: &mut D,
    ) -> Result<(), D::Error> {
        self.reset(delegate);
        self.tokenize_part(input, delegate)?;
        self.tokenize_eof(delegate)
    }

    /// Feed one chunk of input, continuing from the current state and position.
    pub fn tokenize_part<D: TokenizerDelegate>(
        &mut self,
        input: &str,
        delegate: &mut D,
    ) -> Result<(), D::Error> {
        let mut chunk = Chunk::new(input);
        while chunk.peek().is_some() {
            self.step(&mut chunk, delegate)?;
        }
        Ok(())
    }

    pub fn tokenize_eof<D: TokenizerDelegate>(&mut self, delegate: &mut D) -> Result<(), D::Error> {
        self.flush_data(delegate)
    }

    /// Close a text run in progress, if any.
    pub fn flush_data<D: TokenizerDelegate>(&mut self, delegate: &mut D) -> Result<(), D::Error> {
        if self.state == TokenizerState::Data {
            delegate.finish_data(self.position())?;
            self.state = TokenizerState::BeforeData;
        }
        Ok(())
    }

    /// Inject raw text into the comment currently open.
    ///
    /// Dashes held back while looking for the closing `-->` are released
    /// first, so the comment reads exactly like its source.
    pub fn append_to_comment<D: TokenizerDelegate>(
        &mut self,
        text: &str,
        delegate: &mut D,
    ) -> Result<(), D::Error> {
        match self.state {
            TokenizerState::CommentStartDash | TokenizerState::CommentEndDash => {
                delegate.append_to_comment_data("-")?;
            }
            TokenizerState::CommentEnd => delegate.append_to_comment_data("--")?,
            _ => {}
        }
        self.state = TokenizerState::Comment;
        delegate.append_to_comment_data(text)
    }

    fn consume(&mut self, chunk: &mut Chunk) -> Option<char> {
        let ch = chunk.peek()?;
        chunk.index += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Consume a character reference after `&`, if one is there.
    fn consume_char_ref(&mut self, chunk: &mut Chunk) -> Option<String> {
        if self.mode == TokenizerMode::Codemod {
            return None;
        }
        let (text, len) = entities::decode(chunk.rest())?;
        for _ in 0..len {
            self.consume(chunk);
        }
        Some(text)
    }

    fn is_ignored_end_tag(&self, chunk: &Chunk) -> bool {
        let tag = self.tag_name_buffer.as_str();
        matches!(tag, "title" | "style" | "script") && !chunk.starts_with(&format!("</{tag}>"))
    }

    fn step<D: TokenizerDelegate>(
        &mut self,
        chunk: &mut Chunk,
        delegate: &mut D,
    ) -> Result<(), D::Error> {
        let Some(ch) = chunk.peek() else {
            return Ok(());
        };

        match self.state {
            TokenizerState::BeforeData => {
                if ch == '<' && !self.is_ignored_end_tag(chunk) {
                    self.tag_start = self.position();
                    self.state = TokenizerState::TagOpen;
                    self.consume(chunk);
                } else if self.mode == TokenizerMode::Precompile
                    && ch == '\n'
                    && matches!(self.tag_name_buffer.as_str(), "pre" | "textarea")
                {
                    self.tag_name_buffer.clear();
                    self.consume(chunk);
                } else {
                    self.state = TokenizerState::Data;
                    delegate.begin_data(self.position())?;
                }
            }
            TokenizerState::Data => {
                if ch == '<' && !self.is_ignored_end_tag(chunk) {
                    delegate.finish_data(self.position())?;
                    self.tag_start = self.position();
                    self.state = TokenizerState::TagOpen;
                    self.consume(chunk);
                } else if ch == '&' && !matches!(self.tag_name_buffer.as_str(), "script" | "style") {
                    self.consume(chunk);
                    let text = self.consume_char_ref(chunk).unwrap_or_else(|| "&".to_string());
                    delegate.append_to_data(&text)?;
                } else {
                    self.consume(chunk);
                    delegate.append_to_data(ch.encode_utf8(&mut [0; 4]))?;
                }
            }
            TokenizerState::TagOpen => {
                self.consume(chunk);
                if ch == '!' {
                    self.state = TokenizerState::MarkupDeclarationOpen;
                } else if ch == '/' {
                    self.state = TokenizerState::EndTagOpen;
                } else if is_tag_name_start(ch) {
                    self.state = TokenizerState::TagName;
                    self.tag_name_buffer.clear();
                    delegate.begin_start_tag(self.tag_start)?;
                    self.append_to_tag_name(ch, delegate)?;
                } else {
                    // Not a tag after all: `<` followed by text.
                    self.state = TokenizerState::Data;
                    delegate.begin_data(self.tag_start)?;
                    delegate.append_to_data("<")?;
                    delegate.append_to_data(ch.encode_utf8(&mut [0; 4]))?;
                }
            }
            TokenizerState::MarkupDeclarationOpen => {
                self.consume(chunk);
                if ch == '-' && chunk.peek() == Some('-') {
                    self.consume(chunk);
                    self.state = TokenizerState::CommentStart;
                    delegate.begin_comment(self.tag_start)?;
                } else {
                    delegate.report_syntax_error(
                        "Markup declarations other than comments are not supported",
                        self.tag_start,
                    )?;
                    self.state = TokenizerState::BeforeData;
                }
            }
            TokenizerState::CommentStart => {
                self.consume(chunk);
                if ch == '-' {
                    self.state = TokenizerState::CommentStartDash;
                } else if ch == '>' {
                    delegate.finish_comment(self.position())?;
                    self.state = TokenizerState::BeforeData;
                } else {
                    delegate.append_to_comment_data(ch.encode_utf8(&mut [0; 4]))?;
                    self.state = TokenizerState::Comment;
                }
            }
            TokenizerState::CommentStartDash => {
                self.consume(chunk);
                if ch == '-' {
                    self.state = TokenizerState::CommentEnd;
                } else if ch == '>' {
                    delegate.finish_comment(self.position())?;
                    self.state = TokenizerState::BeforeData;
                } else {
                    delegate.append_to_comment_data("-")?;
                    self.state = TokenizerState::Comment;
                }
            }
            TokenizerState::Comment => {
                self.consume(chunk);
                if ch == '-' {
                    self.state = TokenizerState::CommentEndDash;
                } else {
                    delegate.append_to_comment_data(ch.encode_utf8(&mut [0; 4]))?;
                }
            }
            TokenizerState::CommentEndDash => {
                self.consume(chunk);
                if ch == '-' {
                    self.state = TokenizerState::CommentEnd;
                } else {
                    delegate.append_to_comment_data("-")?;
                    delegate.append_to_comment_data(ch.encode_utf8(&mut [0; 4]))?;
                    self.state = TokenizerState::Comment;
                }
            }
            TokenizerState::CommentEnd => {
                self.consume(chunk);
                if ch == '>' {
                    delegate.finish_comment(self.position())?;
                    self.state = TokenizerState::BeforeData;
                } else {
                    delegate.append_to_comment_data("--")?;
                    delegate.append_to_comment_data(ch.encode_utf8(&mut [0; 4]))?;
                    self.state = TokenizerState::Comment;
                }
            }
            TokenizerState::TagName => {
                self.consume(chunk);
                if is_space(ch) {
                    self.state = TokenizerState::BeforeAttributeName;
                } else if ch == '/' {
                    self.state = TokenizerState::SelfClosingStartTag;
                } else if ch == '>' {
                    delegate.finish_tag(self.position())?;
                    self.state = TokenizerState::BeforeData;
                } else {
                    self.append_to_tag_name(ch, delegate)?;
                }
            }
            TokenizerState::EndTagOpen => {
                self.consume(chunk);
                if is_tag_name_start(ch) {
                    self.state = TokenizerState::EndTagName;
                    self.tag_name_buffer.clear();
                    delegate.begin_end_tag(self.tag_start)?;
                    self.append_to_tag_name(ch, delegate)?;
                } else {
                    delegate.report_syntax_error("Invalid end tag", self.tag_start)?;
                    self.state = TokenizerState::BeforeData;
                }
            }
            TokenizerState::EndTagName => {
                self.consume(chunk);
                if is_space(ch) {
                    self.state = TokenizerState::BeforeAttributeName;
                    self.tag_name_buffer.clear();
                } else if ch == '/' {
                    self.state = TokenizerState::SelfClosingStartTag;
                    self.tag_name_buffer.clear();
                } else if ch == '>' {
                    delegate.finish_tag(self.position())?;
                    self.state = TokenizerState::BeforeData;
                    self.tag_name_buffer.clear();
                } else {
                    self.append_to_tag_name(ch, delegate)?;
                }
            }
            TokenizerState::BeforeAttributeName => {
                if is_space(ch) {
                    self.consume(chunk);
                } else if ch == '/' {
                    self.state = TokenizerState::SelfClosingStartTag;
                    self.consume(chunk);
                } else if ch == '>' {
                    self.consume(chunk);
                    delegate.finish_tag(self.position())?;
                    self.state = TokenizerState::BeforeData;
                } else if ch == '=' {
                    delegate.report_syntax_error(
                        "attribute name cannot start with equals sign",
                        self.position(),
                    )?;
                    self.state = TokenizerState::AttributeName;
                    delegate.begin_attribute(self.position())?;
                    self.consume(chunk);
                    delegate.append_to_attribute_name(ch)?;
                } else {
                    self.state = TokenizerState::AttributeName;
                    delegate.begin_attribute(self.position())?;
                }
            }
            TokenizerState::AttributeName => {
                if is_space(ch) {
                    self.state = TokenizerState::AfterAttributeName;
                    self.consume(chunk);
                } else if ch == '/' {
                    delegate.begin_attribute_value(false, self.position())?;
                    delegate.finish_attribute_value(self.position())?;
                    self.consume(chunk);
                    self.state = TokenizerState::SelfClosingStartTag;
                } else if ch == '=' {
                    self.state = TokenizerState::BeforeAttributeValue;
                    self.consume(chunk);
                } else if ch == '>' {
                    delegate.begin_attribute_value(false, self.position())?;
                    delegate.finish_attribute_value(self.position())?;
                    self.consume(chunk);
                    delegate.finish_tag(self.position())?;
                    self.state = TokenizerState::BeforeData;
                } else if matches!(ch, '"' | '\'' | '<') {
                    delegate.report_syntax_error(
                        &format!("{ch} is not a valid character within attribute names"),
                        self.position(),
                    )?;
                    self.consume(chunk);
                    delegate.append_to_attribute_name(ch)?;
                } else {
                    self.consume(chunk);
                    delegate.append_to_attribute_name(ch)?;
                }
            }
            TokenizerState::AfterAttributeName => {
                if is_space(ch) {
                    self.consume(chunk);
                } else if ch == '/' {
                    delegate.begin_attribute_value(false, self.position())?;
                    delegate.finish_attribute_value(self.position())?;
                    self.consume(chunk);
                    self.state = TokenizerState::SelfClosingStartTag;
                } else if ch == '=' {
                    self.consume(chunk);
                    self.state = TokenizerState::BeforeAttributeValue;
                } else if ch == '>' {
                    delegate.begin_attribute_value(false, self.position())?;
                    delegate.finish_attribute_value(self.position())?;
                    self.consume(chunk);
                    delegate.finish_tag(self.position())?;
                    self.state = TokenizerState::BeforeData;
                } else {
                    delegate.begin_attribute_value(false, self.position())?;
                    delegate.finish_attribute_value(self.position())?;
                    self.state = TokenizerState::AttributeName;
                    delegate.begin_attribute(self.position())?;
                    self.consume(chunk);
                    delegate.append_to_attribute_name(ch)?;
                }
            }
            TokenizerState::BeforeAttributeValue => {
                if is_space(ch) {
                    self.consume(chunk);
                } else if ch == '"' {
                    self.state = TokenizerState::AttributeValueDoubleQuoted;
                    delegate.begin_attribute_value(true, self.position())?;
                    self.consume(chunk);
                } else if ch == '\'' {
                    self.state = TokenizerState::AttributeValueSingleQuoted;
                    delegate.begin_attribute_value(true, self.position())?;
                    self.consume(chunk);
                } else if ch == '>' {
                    delegate.begin_attribute_value(false, self.position())?;
                    delegate.finish_attribute_value(self.position())?;
                    self.consume(chunk);
                    delegate.finish_tag(self.position())?;
                    self.state = TokenizerState::BeforeData;
                } else {
                    self.state = TokenizerState::AttributeValueUnquoted;
                    delegate.begin_attribute_value(false, self.position())?;
                    self.append_attribute_value_char(chunk, delegate)?;
                }
            }
            TokenizerState::AttributeValueDoubleQuoted | TokenizerState::AttributeValueSingleQuoted => {
                let quote = if self.state == TokenizerState::AttributeValueDoubleQuoted {
                    '"'
                } else {
                    '\''
                };
                if ch == quote {
                    self.consume(chunk);
                    delegate.finish_attribute_value(self.position())?;
                    self.state = TokenizerState::AfterAttributeValueQuoted;
                } else {
                    self.append_attribute_value_char(chunk, delegate)?;
                }
            }
            TokenizerState::AttributeValueUnquoted => {
                if is_space(ch) {
                    delegate.finish_attribute_value(self.position())?;
                    self.consume(chunk);
                    self.state = TokenizerState::BeforeAttributeName;
                } else if ch == '/' {
                    delegate.finish_attribute_value(self.position())?;
                    self.consume(chunk);
                    self.state = TokenizerState::SelfClosingStartTag;
                } else if ch == '>' {
                    delegate.finish_attribute_value(self.position())?;
                    self.consume(chunk);
                    delegate.finish_tag(self.position())?;
                    self.state = TokenizerState::BeforeData;
                } else {
                    self.append_attribute_value_char(chunk, delegate)?;
                }
            }
            TokenizerState::AfterAttributeValueQuoted => {
                if is_space(ch) {
                    self.consume(chunk);
                    self.state = TokenizerState::BeforeAttributeName;
                } else if ch == '/' {
                    self.consume(chunk);
                    self.state = TokenizerState::SelfClosingStartTag;
                } else if ch == '>' {
                    self.consume(chunk);
                    delegate.finish_tag(self.position())?;
                    self.state = TokenizerState::BeforeData;
                } else {
                    self.state = TokenizerState::BeforeAttributeName;
                }
            }
            TokenizerState::SelfClosingStartTag => {
                if ch == '>' {
                    self.consume(chunk);
                    delegate.mark_tag_as_self_closing()?;
                    delegate.finish_tag(self.position())?;
                    self.state = TokenizerState::BeforeData;
                } else {
                    self.state = TokenizerState::BeforeAttributeName;
                }
            }
        }

        Ok(())
    }

    fn append_to_tag_name<D: TokenizerDelegate>(
        &mut self,
        ch: char,
        delegate: &mut D,
    ) -> Result<(), D::Error> {
        self.tag_name_buffer.push(ch);
        delegate.append_to_tag_name(ch)
    }

    fn append_attribute_value_char<D: TokenizerDelegate>(
        &mut self,
        chunk: &mut Chunk,
        delegate: &mut D,
    ) -> Result<(), D::Error> {
        let start = self.position();
        let Some(ch) = self.consume(chunk) else {
            return Ok(());
        };
        let text = if ch == '&' {
            self.consume_char_ref(chunk).unwrap_or_else(|| "&".to_string())
        } else {
            ch.to_string()
        };
        delegate.append_to_attribute_value(&text, start, self.position())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Records every event as a line of text.
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl Recorder {
        fn push(&mut self, event: String) -> Result<(), String> {
            // Merge consecutive data/comment/name appends for readable assertions.
            if let (Some(last), Some(rest)) = (self.events.last_mut(), event.strip_prefix("+")) {
                if let Some(prev) = last.strip_prefix("+") {
                    if prev.split_once(' ').map(|p| p.0) == rest.split_once(' ').map(|p| p.0) {
                        let (_, text) = rest.split_once(' ').unwrap_or(("", ""));
                        last.push_str(text);
                        return Ok(());
                    }
                }
            }
            self.events.push(event);
            Ok(())
        }
    }

    fn pos(p: Position) -> String {
        format!("{}:{}", p.line, p.column)
    }

    impl TokenizerDelegate for Recorder {
        type Error = String;

        fn begin_start_tag(&mut self, p: Position) -> Result<(), String> {
            self.push(format!("start-tag@{}", pos(p)))
        }
        fn begin_end_tag(&mut self, p: Position) -> Result<(), String> {
            self.push(format!("end-tag@{}", pos(p)))
        }
        fn append_to_tag_name(&mut self, ch: char) -> Result<(), String> {
            self.push(format!("+name {ch}"))
        }
        fn mark_tag_as_self_closing(&mut self) -> Result<(), String> {
            self.push("self-closing".to_string())
        }
        fn finish_tag(&mut self, p: Position) -> Result<(), String> {
            self.push(format!("finish-tag@{}", pos(p)))
        }
        fn begin_attribute(&mut self, p: Position) -> Result<(), String> {
            self.push(format!("attr@{}", pos(p)))
        }
        fn append_to_attribute_name(&mut self, ch: char) -> Result<(), String> {
            self.push(format!("+attr-name {ch}"))
        }
        fn begin_attribute_value(&mut self, quoted: bool, p: Position) -> Result<(), String> {
            self.push(format!("value(quoted={quoted})@{}", pos(p)))
        }
        fn append_to_attribute_value(
            &mut self,
            text: &str,
            _start: Position,
            _end: Position,
        ) -> Result<(), String> {
            self.push(format!("+value {text}"))
        }
        fn finish_attribute_value(&mut self, p: Position) -> Result<(), String> {
            self.push(format!("finish-value@{}", pos(p)))
        }
        fn begin_data(&mut self, p: Position) -> Result<(), String> {
            self.push(format!("data@{}", pos(p)))
        }
        fn append_to_data(&mut self, text: &str) -> Result<(), String> {
            self.push(format!("+data {text}"))
        }
        fn finish_data(&mut self, p: Position) -> Result<(), String> {
            self.push(format!("finish-data@{}", pos(p)))
        }
        fn begin_comment(&mut self, p: Position) -> Result<(), String> {
            self.push(format!("comment@{}", pos(p)))
        }
        fn append_to_comment_data(&mut self, text: &str) -> Result<(), String> {
            self.push(format!("+comment {text}"))
        }
        fn finish_comment(&mut self, p: Position) -> Result<(), String> {
            self.push(format!("finish-comment@{}", pos(p)))
        }
        fn report_syntax_error(&mut self, message: &str, _p: Position) -> Result<(), String> {
            Err(message.to_string())
        }
    }

    fn tokenize(input: &str) -> Vec<String> {
        let mut recorder = Recorder::default();
        Tokenizer::new()
            .tokenize(input, &mut recorder)
            .expect("tokenize failed");
        recorder.events
    }

    // ====================================================================
    // Text and elements
    // ====================================================================

    #[test]
    fn test_plain_text() {
        assert_eq!(tokenize("hello"), vec!["data@1:0", "+data hello", "finish-data@1:5"]);
    }

    #[test]
    fn test_element_with_text() {
        assert_eq!(
            tokenize("<p>hi</p>"),
            vec![
                "start-tag@1:0",
                "+name p",
                "finish-tag@1:3",
                "data@1:3",
                "+data hi",
                "finish-data@1:5",
                "end-tag@1:5",
                "+name p",
                "finish-tag@1:9",
            ]
        );
    }

    #[test]
    fn test_self_closing_tag() {
        assert_eq!(
            tokenize("<br/>"),
            vec!["start-tag@1:0", "+name br", "self-closing", "finish-tag@1:5"]
        );
    }

    #[test]
    fn test_newlines_move_position() {
        let events = tokenize("a\nb<i>");
        assert_eq!(events[2], "finish-data@2:1");
        assert_eq!(events[3], "start-tag@2:1");
    }

    #[test]
    fn test_lone_angle_bracket_is_text() {
        assert_eq!(tokenize("a < b"), vec![
            "data@1:0",
            "+data a ",
            "finish-data@1:2",
            "data@1:2",
            "+data < b",
            "finish-data@1:5",
        ]);
    }

    // ====================================================================
    // Attributes
    // ====================================================================

    #[test]
    fn test_quoted_attribute() {
        assert_eq!(
            tokenize(r#"<a href="x">"#),
            vec![
                "start-tag@1:0",
                "+name a",
                "attr@1:3",
                "+attr-name href",
                "value(quoted=true)@1:8",
                "+value x",
                "finish-value@1:11",
                "finish-tag@1:12",
            ]
        );
    }

    #[test]
    fn test_valueless_attribute() {
        assert_eq!(
            tokenize("<input disabled>"),
            vec![
                "start-tag@1:0",
                "+name input",
                "attr@1:7",
                "+attr-name disabled",
                "value(quoted=false)@1:15",
                "finish-value@1:15",
                "finish-tag@1:16",
            ]
        );
    }

    #[test]
    fn test_unquoted_attribute() {
        let events = tokenize("<a b=c d>");
        assert!(events.contains(&"value(quoted=false)@1:5".to_string()));
        assert!(events.contains(&"finish-value@1:6".to_string()));
        assert!(events.contains(&"attr@1:7".to_string()));
    }

    #[test]
    fn test_invalid_attribute_name_character() {
        let mut recorder = Recorder::default();
        let err = Tokenizer::new()
            .tokenize(r#"<a b"c>"#, &mut recorder)
            .unwrap_err();
        assert_eq!(err, "\" is not a valid character within attribute names");
    }

    // ====================================================================
    // Comments
    // ====================================================================

    #[test]
    fn test_comment() {
        assert_eq!(
            tokenize("<!-- a-b -->"),
            vec!["comment@1:0", "+comment  a-b ", "finish-comment@1:12"]
        );
    }

    #[test]
    fn test_injected_comment_text_releases_dashes() {
        let mut recorder = Recorder::default();
        let mut tokenizer = Tokenizer::new();
        tokenizer.tokenize_part("<!-- x -", &mut recorder).unwrap();
        assert_eq!(tokenizer.state(), TokenizerState::CommentEndDash);
        tokenizer.append_to_comment("{{y}}", &mut recorder).unwrap();
        tokenizer.tokenize_part(" -->", &mut recorder).unwrap();
        assert_eq!(
            recorder.events,
            vec!["comment@1:0", "+comment  x -{{y}} ", "finish-comment@1:12"]
        );
    }

    // ====================================================================
    // Chunked input and modes
    // ====================================================================

    #[test]
    fn test_state_survives_chunks() {
        let mut recorder = Recorder::default();
        let mut tokenizer = Tokenizer::new();
        tokenizer.tokenize_part("<div class=\"a ", &mut recorder).unwrap();
        assert_eq!(tokenizer.state(), TokenizerState::AttributeValueDoubleQuoted);
        tokenizer.tokenize_part("b\">", &mut recorder).unwrap();
        assert_eq!(tokenizer.state(), TokenizerState::BeforeData);
    }

    #[test]
    fn test_position_can_be_moved() {
        let mut recorder = Recorder::default();
        let mut tokenizer = Tokenizer::new();
        tokenizer.line = 3;
        tokenizer.column = 7;
        tokenizer.tokenize_part("x", &mut recorder).unwrap();
        tokenizer.flush_data(&mut recorder).unwrap();
        assert_eq!(recorder.events, vec!["data@3:7", "+data x", "finish-data@3:8"]);
    }

    #[test]
    fn test_char_refs_decoded_in_precompile_mode() {
        assert_eq!(tokenize("a&amp;b")[1], "+data a&b");
    }

    #[test]
    fn test_char_refs_kept_in_codemod_mode() {
        let mut recorder = Recorder::default();
        Tokenizer::with_mode(TokenizerMode::Codemod)
            .tokenize("a&amp;b", &mut recorder)
            .unwrap();
        assert_eq!(recorder.events[1], "+data a&amp;b");
    }

    #[test]
    fn test_leading_newline_in_pre_dropped() {
        let events = tokenize("<pre>\nx</pre>");
        assert!(events.contains(&"+data x".to_string()));
        assert!(events.contains(&"data@2:0".to_string()));
    }

    #[test]
    fn test_style_content_is_raw_text() {
        let events = tokenize("<style>a<b</style>");
        assert!(events.contains(&"+data a<b".to_string()));
    }
}
