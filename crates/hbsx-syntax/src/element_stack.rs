//! The stack of bodies and elements that are still being filled.
//!
//! Frames are addressed by [`FrameId`]. Whoever pushes a body keeps its id
//! and hands it back on pop; if anything else is on top at that point, an
//! element was left open.

use crate::ast::{
    AttrNode, ElementModifierStatement, ElementNode, MustacheCommentStatement, Statement,
};
use crate::error::SyntaxError;
use crate::source::Source;
use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(usize);

#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// The body of the template, a block or a partial block.
    Body(Vec<Statement>),
    Element(ElementFrame),
}

impl Frame {
    pub fn children(&self) -> &[Statement] {
        match self {
            Frame::Body(children) => children,
            Frame::Element(element) => &element.children,
        }
    }

    pub fn children_mut(&mut self) -> &mut Vec<Statement> {
        match self {
            Frame::Body(children) => children,
            Frame::Element(element) => &mut element.children,
        }
    }

    pub fn into_children(self) -> Vec<Statement> {
        match self {
            Frame::Body(children) => children,
            Frame::Element(element) => element.children,
        }
    }
}

/// An element whose start tag is complete and whose end tag is not.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementFrame {
    pub tag: String,
    pub self_closing: bool,
    pub attributes: Vec<AttrNode>,
    pub block_params: Vec<String>,
    pub modifiers: Vec<ElementModifierStatement>,
    pub comments: Vec<MustacheCommentStatement>,
    pub children: Vec<Statement>,
    /// The start tag, from `<` to `>`.
    pub start_tag: Span,
}

impl ElementFrame {
    /// Close the element at byte offset `end`.
    pub fn finish(self, end: usize) -> ElementNode {
        ElementNode {
            tag: self.tag,
            self_closing: self.self_closing,
            attributes: self.attributes,
            block_params: self.block_params,
            modifiers: self.modifiers,
            comments: self.comments,
            children: self.children,
            span: Span::new(self.start_tag.start, end),
        }
    }
}

#[derive(Debug, Default)]
pub struct ElementStack {
    frames: Vec<(FrameId, Frame)>,
    next_id: usize,
}

impl ElementStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: Frame) -> FrameId {
        let id = FrameId(self.next_id);
        self.next_id += 1;
        self.frames.push((id, frame));
        id
    }

    pub fn pop(&mut self) -> Option<(FrameId, Frame)> {
        self.frames.pop()
    }

    /// Pop the top frame if it is an element.
    pub fn pop_element(&mut self) -> Option<ElementFrame> {
        match self.frames.last() {
            Some((_, Frame::Element(_))) => match self.frames.pop() {
                Some((_, Frame::Element(element))) => Some(element),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn top(&self) -> Option<&Frame> {
        self.frames.last().map(|(_, frame)| frame)
    }

    pub fn top_mut(&mut self) -> Option<&mut Frame> {
        self.frames.last_mut().map(|(_, frame)| frame)
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Add a finished node to the frame on top.
    pub fn append(&mut self, statement: Statement) {
        debug_assert!(!self.frames.is_empty(), "appending to an empty element stack");
        if let Some(frame) = self.top_mut() {
            frame.children_mut().push(statement);
        }
    }

    /// Pop the frame pushed as `id`.
    ///
    /// Fails with `Unclosed element` when an element opened after that frame
    /// is still on top.
    pub fn pop_expecting(&mut self, id: FrameId, source: &Source) -> Result<Frame, SyntaxError> {
        match self.frames.last() {
            Some((top, _)) if *top == id => {}
            Some((_, Frame::Element(element))) => {
                let message = format!("Unclosed element `{}`", element.tag);
                return Err(SyntaxError::new(message, element.start_tag, source));
            }
            _ => {
                let end = Span::empty(source.len());
                return Err(SyntaxError::new("Unbalanced template body", end, source));
            }
        }

        match self.frames.pop() {
            Some((_, frame)) => Ok(frame),
            None => Err(SyntaxError::new(
                "Unbalanced template body",
                Span::empty(source.len()),
                source,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TextNode;
    use pretty_assertions::assert_eq;

    fn element(tag: &str, start: usize, end: usize) -> Frame {
        Frame::Element(ElementFrame {
            tag: tag.to_string(),
            self_closing: false,
            attributes: Vec::new(),
            block_params: Vec::new(),
            modifiers: Vec::new(),
            comments: Vec::new(),
            children: Vec::new(),
            start_tag: Span::new(start, end),
        })
    }

    fn text(chars: &str) -> Statement {
        Statement::Text(TextNode {
            chars: chars.to_string(),
            span: Span::new(0, chars.len()),
        })
    }

    #[test]
    fn test_balanced_push_pop() {
        let source = Source::new("");
        let mut stack = ElementStack::new();
        let body = stack.push(Frame::Body(Vec::new()));
        stack.append(text("hi"));

        let frame = stack.pop_expecting(body, &source).unwrap();
        assert_eq!(frame.children().len(), 1);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut stack = ElementStack::new();
        let a = stack.push(Frame::Body(Vec::new()));
        let b = stack.push(Frame::Body(Vec::new()));
        assert_ne!(a, b);
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn test_unclosed_element_is_reported() {
        let source = Source::new("<div><p>");
        let mut stack = ElementStack::new();
        let body = stack.push(Frame::Body(Vec::new()));
        stack.push(element("div", 0, 5));

        let error = stack.pop_expecting(body, &source).unwrap_err();
        assert_eq!(error.message, "Unclosed element `div`");
        assert_eq!(error.span, Span::new(0, 5));
    }

    #[test]
    fn test_pop_element_only_pops_elements() {
        let mut stack = ElementStack::new();
        stack.push(Frame::Body(Vec::new()));
        assert!(stack.pop_element().is_none());
        assert_eq!(stack.len(), 1);

        stack.push(element("span", 0, 6));
        stack.append(text("x"));
        let frame = stack.pop_element().unwrap();
        assert_eq!(frame.tag, "span");
        assert_eq!(frame.finish(14).span, Span::new(0, 14));
    }
}
