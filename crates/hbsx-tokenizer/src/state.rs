use std::fmt;

/// A position in template text: 1-indexed line, 0-indexed column counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 0)
    }
}

/// Lexical state of the HTML tokenizer.
///
/// The state is observable from outside so that a caller interleaving another
/// grammar with the HTML stream can decide where its own nodes belong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenizerState {
    BeforeData,
    Data,
    TagOpen,
    MarkupDeclarationOpen,
    CommentStart,
    CommentStartDash,
    Comment,
    CommentEndDash,
    CommentEnd,
    TagName,
    EndTagOpen,
    EndTagName,
    BeforeAttributeName,
    AttributeName,
    AfterAttributeName,
    BeforeAttributeValue,
    AttributeValueDoubleQuoted,
    AttributeValueSingleQuoted,
    AttributeValueUnquoted,
    AfterAttributeValueQuoted,
    SelfClosingStartTag,
}

impl TokenizerState {
    /// The camelCase name used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenizerState::BeforeData => "beforeData",
            TokenizerState::Data => "data",
            TokenizerState::TagOpen => "tagOpen",
            TokenizerState::MarkupDeclarationOpen => "markupDeclarationOpen",
            TokenizerState::CommentStart => "commentStart",
            TokenizerState::CommentStartDash => "commentStartDash",
            TokenizerState::Comment => "comment",
            TokenizerState::CommentEndDash => "commentEndDash",
            TokenizerState::CommentEnd => "commentEnd",
            TokenizerState::TagName => "tagName",
            TokenizerState::EndTagOpen => "endTagOpen",
            TokenizerState::EndTagName => "endTagName",
            TokenizerState::BeforeAttributeName => "beforeAttributeName",
            TokenizerState::AttributeName => "attributeName",
            TokenizerState::AfterAttributeName => "afterAttributeName",
            TokenizerState::BeforeAttributeValue => "beforeAttributeValue",
            TokenizerState::AttributeValueDoubleQuoted => "attributeValueDoubleQuoted",
            TokenizerState::AttributeValueSingleQuoted => "attributeValueSingleQuoted",
            TokenizerState::AttributeValueUnquoted => "attributeValueUnquoted",
            TokenizerState::AfterAttributeValueQuoted => "afterAttributeValueQuoted",
            TokenizerState::SelfClosingStartTag => "selfClosingStartTag",
        }
    }

    /// Inside an HTML comment (`<!-- ... -->`), at any stage of its delimiters.
    pub fn is_comment(self) -> bool {
        matches!(
            self,
            TokenizerState::CommentStart
                | TokenizerState::CommentStartDash
                | TokenizerState::Comment
                | TokenizerState::CommentEndDash
                | TokenizerState::CommentEnd
        )
    }

    /// Between tags, where text and child nodes go.
    pub fn is_data(self) -> bool {
        matches!(self, TokenizerState::BeforeData | TokenizerState::Data)
    }

    /// Inside an attribute value, quoted or not.
    pub fn is_attribute_value(self) -> bool {
        matches!(
            self,
            TokenizerState::AttributeValueDoubleQuoted
                | TokenizerState::AttributeValueSingleQuoted
                | TokenizerState::AttributeValueUnquoted
        )
    }
}

impl fmt::Display for TokenizerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTML5 void elements (no end tag, no children).
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Check if a tag name is an HTML5 void element.
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_names() {
        assert_eq!(TokenizerState::BeforeAttributeName.to_string(), "beforeAttributeName");
        assert_eq!(TokenizerState::AttributeValueUnquoted.as_str(), "attributeValueUnquoted");
    }

    #[test]
    fn test_state_classes() {
        assert!(TokenizerState::CommentEndDash.is_comment());
        assert!(!TokenizerState::Data.is_comment());
        assert!(TokenizerState::BeforeData.is_data());
        assert!(TokenizerState::AttributeValueSingleQuoted.is_attribute_value());
        assert!(!TokenizerState::AfterAttributeValueQuoted.is_attribute_value());
    }

    #[test]
    fn test_void_elements() {
        assert!(is_void_element("input"));
        assert!(is_void_element("br"));
        assert!(!is_void_element("div"));
    }
}
