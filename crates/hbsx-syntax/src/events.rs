//! Builds HTML nodes from the events of the HTML tokenizer.
//!
//! The tokenizer only sees the text between mustaches. Everything it reports
//! lands on the shared [`ElementStack`]; the visitor splices mustaches into
//! the same structures through the `pub(crate)` methods here.

use hbsx_tokenizer::{is_void_element, Position, TokenizerDelegate, TokenizerState};

use crate::ast::{
    AttrNode, AttrPart, AttrValue, CommentStatement, ConcatStatement, ElementModifierStatement,
    MustacheCommentStatement, Statement, TextNode,
};
use crate::element_stack::{ElementFrame, ElementStack, Frame, FrameId};
use crate::error::SyntaxError;
use crate::source::Source;
use crate::span::Span;

/// The node the tokenizer is in the middle of.
#[derive(Debug)]
enum Current {
    Text { chars: String, start: usize },
    Comment { value: String, start: usize },
    StartTag(StartTag),
    EndTag(EndTag),
}

#[derive(Debug, Default)]
struct StartTag {
    name: String,
    start: usize,
    attributes: Vec<AttrNode>,
    modifiers: Vec<ElementModifierStatement>,
    comments: Vec<MustacheCommentStatement>,
    self_closing: bool,
}

#[derive(Debug, Default)]
struct EndTag {
    name: String,
    start: usize,
}

/// An attribute between its name and the end of its value.
#[derive(Debug)]
struct PendingAttribute {
    name: String,
    start: usize,
    value_start: usize,
    quoted: bool,
    dynamic: bool,
    parts: Vec<AttrPart>,
    /// Text run not yet pushed to `parts`.
    text: Option<TextNode>,
}

impl PendingAttribute {
    fn finalize_text_part(&mut self) {
        if let Some(text) = self.text.take() {
            self.parts.push(AttrPart::Text(text));
        }
    }
}

pub(crate) struct TokenizerEventHandlers {
    source: Source,
    stack: ElementStack,
    current: Option<Current>,
    attribute: Option<PendingAttribute>,
}

impl TokenizerEventHandlers {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            stack: ElementStack::new(),
            current: None,
            attribute: None,
        }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn error(&self, message: impl Into<String>, span: Span) -> SyntaxError {
        SyntaxError::new(message, span, &self.source)
    }

    fn offset(&self, pos: Position) -> usize {
        self.source.offset_for(pos.line, pos.column)
    }

    // ====================================================================
    // Bodies
    // ====================================================================

    pub fn push_body(&mut self) -> FrameId {
        self.stack.push(Frame::Body(Vec::new()))
    }

    pub fn pop_body(&mut self, id: FrameId) -> Result<Vec<Statement>, SyntaxError> {
        let frame = self.stack.pop_expecting(id, &self.source)?;
        Ok(frame.into_children())
    }

    /// Add a finished node to the innermost open element or body.
    pub fn append(&mut self, statement: Statement) {
        self.stack.append(statement);
    }

    /// Fail if the template ended inside a tag or an HTML comment.
    pub fn finish_template(&self, state: TokenizerState) -> Result<(), SyntaxError> {
        self.finish_markup(state, "template", self.source.len())
    }

    /// Fail if a block body ended inside a tag or an HTML comment.
    pub fn finish_block_body(&self, state: TokenizerState, pos: Position) -> Result<(), SyntaxError> {
        self.finish_markup(state, "block", self.offset(pos))
    }

    fn finish_markup(&self, state: TokenizerState, what: &str, end: usize) -> Result<(), SyntaxError> {
        if state.is_data() {
            return Ok(());
        }
        let (message, start) = match &self.current {
            Some(Current::Comment { start, .. }) => ("Unclosed comment".to_string(), *start),
            Some(Current::StartTag(tag)) => (format!("Unclosed element `{}`", tag.name), tag.start),
            Some(Current::EndTag(tag)) => (format!("Unclosed end tag `</{}`", tag.name), tag.start),
            _ => (
                format!("Unexpected end of {what} in the `{state}` state"),
                end,
            ),
        };
        Err(self.error(message, Span::new(start.min(end), end)))
    }

    // ====================================================================
    // Tag pieces injected by the visitor
    // ====================================================================

    /// Name of the start tag being read, if any.
    pub fn start_tag_name(&self) -> Option<&str> {
        match &self.current {
            Some(Current::StartTag(tag)) => Some(&tag.name),
            _ => None,
        }
    }

    fn start_tag_mut(&mut self, span: Span) -> Result<&mut StartTag, SyntaxError> {
        let source = &self.source;
        match self.current.as_mut() {
            Some(Current::StartTag(tag)) => Ok(tag),
            _ => Err(SyntaxError::new(
                "Invalid end tag: closing tag must not have attributes",
                span,
                source,
            )),
        }
    }

    pub fn add_modifier(&mut self, modifier: ElementModifierStatement) -> Result<(), SyntaxError> {
        let tag = self.start_tag_mut(modifier.span)?;
        tag.modifiers.push(modifier);
        Ok(())
    }

    pub fn add_tag_comment(&mut self, comment: MustacheCommentStatement) -> Result<(), SyntaxError> {
        let tag = self.start_tag_mut(comment.span)?;
        tag.comments.push(comment);
        Ok(())
    }

    /// Add a mustache to the attribute value being read.
    pub fn append_dynamic_attribute_value_part(&mut self, part: AttrPart) {
        if let Some(attribute) = self.attribute.as_mut() {
            attribute.finalize_text_part();
            attribute.dynamic = true;
            attribute.parts.push(part);
        }
    }

    // ====================================================================
    // Elements
    // ====================================================================

    fn finish_start_tag(&mut self, tag: StartTag, end: usize) -> Result<(), SyntaxError> {
        let start_tag = Span::new(tag.start, end);
        if tag.name == ":" {
            return Err(self.error(
                "Invalid named block: a named block needs a name that starts with a lower case letter",
                start_tag,
            ));
        }

        let mut attributes = tag.attributes;
        let block_params = self.element_block_params(&mut attributes, start_tag)?;
        let closes_itself = tag.self_closing || is_void_element(&tag.name);

        self.stack.push(Frame::Element(ElementFrame {
            tag: tag.name.clone(),
            self_closing: tag.self_closing,
            attributes,
            block_params,
            modifiers: tag.modifiers,
            comments: tag.comments,
            children: Vec::new(),
            start_tag,
        }));

        if closes_itself {
            self.close_element(&tag.name, start_tag, true)?;
        }
        Ok(())
    }

    /// Pop the element `name` and attach it to its parent.
    fn close_element(&mut self, name: &str, tag_span: Span, implicit: bool) -> Result<(), SyntaxError> {
        if is_void_element(name) && !implicit {
            return Err(self.error(
                format!("<{name}> elements do not need end tags. You should remove it"),
                tag_span,
            ));
        }

        match self.stack.top() {
            Some(Frame::Element(open)) if open.tag == name => {}
            Some(Frame::Element(open)) => {
                let line = self.source.position_for(open.start_tag.start).line;
                return Err(self.error(
                    format!(
                        "Closing tag </{name}> did not match last open tag <{}> (on line {line})",
                        open.tag
                    ),
                    tag_span,
                ));
            }
            _ => {}
        }

        let Some(element) = self.stack.pop_element() else {
            return Err(self.error(
                format!("Closing tag </{name}> without an open tag"),
                tag_span,
            ));
        };
        self.stack.append(Statement::Element(element.finish(tag_span.end)));
        Ok(())
    }

    /// Pull `as |a b|` out of the attribute list.
    fn element_block_params(
        &self,
        attributes: &mut Vec<AttrNode>,
        start_tag: Span,
    ) -> Result<Vec<String>, SyntaxError> {
        let names: Vec<&str> = attributes.iter().map(|attr| attr.name.as_str()).collect();
        let as_index = names.iter().position(|name| *name == "as");

        let Some(as_index) =
            as_index.filter(|&index| names.get(index + 1).is_some_and(|n| n.starts_with('|')))
        else {
            if as_index.is_none() && names.last().is_some_and(|n| n.starts_with('|')) {
                return Err(self.error(
                    "Block parameters must be preceded by the `as` keyword, detected block parameters without `as`",
                    start_tag,
                ));
            }
            return Ok(Vec::new());
        };

        let written = names[as_index..].join(" ");
        if !written.ends_with('|') || written.matches('|').count() != 2 {
            return Err(self.error(
                format!("Invalid block parameters syntax, '{written}'"),
                start_tag,
            ));
        }

        let mut params = Vec::new();
        for name in &names[as_index + 1..] {
            let param = name.replace('|', "");
            if param.is_empty() {
                continue;
            }
            if param.chars().any(is_invalid_identifier_char) {
                return Err(self.error(
                    format!("Invalid identifier for block parameters, '{param}'"),
                    start_tag,
                ));
            }
            params.push(param);
        }
        if params.is_empty() {
            return Err(self.error("Cannot use zero block parameters", start_tag));
        }

        attributes.truncate(as_index);
        Ok(params)
    }

    // ====================================================================
    // Attribute values
    // ====================================================================

    fn assemble_attribute_value(
        &self,
        attribute: PendingAttribute,
        span: Span,
        value_span: Span,
    ) -> Result<AttrValue, SyntaxError> {
        if !attribute.dynamic {
            let chars = match attribute.parts.into_iter().next() {
                Some(AttrPart::Text(text)) => text.chars,
                _ => String::new(),
            };
            return Ok(AttrValue::Text(TextNode {
                chars,
                span: value_span,
            }));
        }

        if attribute.quoted {
            return Ok(AttrValue::Concat(ConcatStatement {
                parts: attribute.parts,
                span: value_span,
            }));
        }

        let mut parts = attribute.parts.into_iter();
        match (parts.next(), parts.next()) {
            (Some(part), None) => Ok(part.into()),
            _ => Err(self.error(
                "An unquoted attribute value must be a string or a mustache, preceded by whitespace or a '=' character, and followed by whitespace, a '>' character, or '/>'",
                span,
            )),
        }
    }
}

/// Characters that cannot appear in a block parameter name.
fn is_invalid_identifier_char(ch: char) -> bool {
    matches!(
        ch,
        '!' | '"'
            | '#'
            | '%'..=','
            | '.'
            | '/'
            | ';'..='>'
            | '@'
            | '['..='^'
            | '`'
            | '{'..='~'
    )
}

impl TokenizerDelegate for TokenizerEventHandlers {
    type Error = SyntaxError;

    fn reset(&mut self) {
        self.current = None;
        self.attribute = None;
    }

    fn begin_start_tag(&mut self, pos: Position) -> Result<(), SyntaxError> {
        self.current = Some(Current::StartTag(StartTag {
            start: self.offset(pos),
            ..StartTag::default()
        }));
        Ok(())
    }

    fn begin_end_tag(&mut self, pos: Position) -> Result<(), SyntaxError> {
        self.current = Some(Current::EndTag(EndTag {
            name: String::new(),
            start: self.offset(pos),
        }));
        Ok(())
    }

    fn append_to_tag_name(&mut self, ch: char) -> Result<(), SyntaxError> {
        match self.current.as_mut() {
            Some(Current::StartTag(tag)) => tag.name.push(ch),
            Some(Current::EndTag(tag)) => tag.name.push(ch),
            _ => {}
        }
        Ok(())
    }

    fn mark_tag_as_self_closing(&mut self) -> Result<(), SyntaxError> {
        match self.current.as_mut() {
            Some(Current::StartTag(tag)) => {
                tag.self_closing = true;
                Ok(())
            }
            Some(Current::EndTag(tag)) => {
                let span = Span::new(tag.start, tag.start);
                Err(self.error(
                    "Invalid end tag: closing tag must not be self-closing",
                    span,
                ))
            }
            _ => Ok(()),
        }
    }

    fn finish_tag(&mut self, pos: Position) -> Result<(), SyntaxError> {
        let end = self.offset(pos);
        match self.current.take() {
            Some(Current::StartTag(tag)) => self.finish_start_tag(tag, end),
            Some(Current::EndTag(tag)) => {
                self.close_element(&tag.name, Span::new(tag.start, end), false)
            }
            other => {
                self.current = other;
                Ok(())
            }
        }
    }

    fn begin_attribute(&mut self, pos: Position) -> Result<(), SyntaxError> {
        let start = self.offset(pos);
        self.attribute = Some(PendingAttribute {
            name: String::new(),
            start,
            value_start: start,
            quoted: false,
            dynamic: false,
            parts: Vec::new(),
            text: None,
        });
        Ok(())
    }

    fn append_to_attribute_name(&mut self, ch: char) -> Result<(), SyntaxError> {
        if let Some(attribute) = self.attribute.as_mut() {
            attribute.name.push(ch);
        }
        Ok(())
    }

    fn begin_attribute_value(&mut self, quoted: bool, pos: Position) -> Result<(), SyntaxError> {
        let offset = self.offset(pos);
        if let Some(attribute) = self.attribute.as_mut() {
            attribute.quoted = quoted;
            attribute.value_start = offset;
            attribute.text = None;
        }
        Ok(())
    }

    fn append_to_attribute_value(
        &mut self,
        text: &str,
        start: Position,
        end: Position,
    ) -> Result<(), SyntaxError> {
        let (start, end) = (self.offset(start), self.offset(end));
        if let Some(attribute) = self.attribute.as_mut() {
            match attribute.text.as_mut() {
                Some(part) => {
                    part.chars.push_str(text);
                    part.span = Span::new(part.span.start, end);
                }
                None => {
                    attribute.text = Some(TextNode {
                        chars: text.to_string(),
                        span: Span::new(start, end),
                    });
                }
            }
        }
        Ok(())
    }

    fn finish_attribute_value(&mut self, pos: Position) -> Result<(), SyntaxError> {
        let end = self.offset(pos);
        let Some(mut attribute) = self.attribute.take() else {
            return Ok(());
        };
        attribute.finalize_text_part();

        let span = Span::new(attribute.start, end);
        if matches!(self.current, Some(Current::EndTag(_))) {
            return Err(self.error(
                "Invalid end tag: closing tag must not have attributes",
                span,
            ));
        }

        let name = attribute.name.clone();
        let value_span = Span::new(attribute.value_start, end);
        let value = self.assemble_attribute_value(attribute, span, value_span)?;
        let tag = self.start_tag_mut(span)?;
        tag.attributes.push(AttrNode { name, value, span });
        Ok(())
    }

    fn begin_data(&mut self, pos: Position) -> Result<(), SyntaxError> {
        self.current = Some(Current::Text {
            chars: String::new(),
            start: self.offset(pos),
        });
        Ok(())
    }

    fn append_to_data(&mut self, text: &str) -> Result<(), SyntaxError> {
        if let Some(Current::Text { chars, .. }) = self.current.as_mut() {
            chars.push_str(text);
        }
        Ok(())
    }

    fn finish_data(&mut self, pos: Position) -> Result<(), SyntaxError> {
        let end = self.offset(pos);
        match self.current.take() {
            Some(Current::Text { chars, start }) => {
                self.stack.append(Statement::Text(TextNode {
                    chars,
                    span: Span::new(start, end),
                }));
            }
            other => self.current = other,
        }
        Ok(())
    }

    fn begin_comment(&mut self, pos: Position) -> Result<(), SyntaxError> {
        self.current = Some(Current::Comment {
            value: String::new(),
            start: self.offset(pos),
        });
        Ok(())
    }

    fn append_to_comment_data(&mut self, text: &str) -> Result<(), SyntaxError> {
        if let Some(Current::Comment { value, .. }) = self.current.as_mut() {
            value.push_str(text);
        }
        Ok(())
    }

    fn finish_comment(&mut self, pos: Position) -> Result<(), SyntaxError> {
        let end = self.offset(pos);
        match self.current.take() {
            Some(Current::Comment { value, start }) => {
                self.stack.append(Statement::Comment(CommentStatement {
                    value,
                    span: Span::new(start, end),
                }));
            }
            other => self.current = other,
        }
        Ok(())
    }

    fn report_syntax_error(&mut self, message: &str, pos: Position) -> Result<(), SyntaxError> {
        Err(self.error(message, Span::empty(self.offset(pos))))
    }
}
