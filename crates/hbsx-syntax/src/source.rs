//! Template text plus the line table used to move between coordinate systems.
//!
//! The CST and the HTML tokenizer both report `line`/`column` pairs (lines
//! from 1, columns in characters from 0). The AST speaks byte offsets only;
//! [`Source`] converts one into the other.

use hbsx_cst::{Position, SourceLocation};

use crate::span::Span;

const UNKNOWN_MODULE: &str = "an unknown module";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    text: String,
    module_name: Option<String>,
    /// Byte offset where each line begins.
    line_starts: Vec<usize>,
}

impl Source {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(index, _)| index + 1))
            .collect();
        Self {
            text,
            module_name: None,
            line_starts,
        }
    }

    pub fn with_module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = Some(name.into());
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Name used in diagnostics.
    pub fn module_name(&self) -> &str {
        self.module_name.as_deref().unwrap_or(UNKNOWN_MODULE)
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The span of the whole template.
    pub fn full_span(&self) -> Span {
        Span::new(0, self.text.len())
    }

    /// Byte offset of a line/column position. A column past the end of its
    /// line clamps to that line's newline; a line past the end clamps to the
    /// end of the text.
    pub fn offset_for(&self, line: usize, column: usize) -> usize {
        let index = line.max(1) - 1;
        let Some(&line_start) = self.line_starts.get(index) else {
            return self.text.len();
        };
        let line_end = self
            .line_starts
            .get(index + 1)
            .map_or(self.text.len(), |next| next - 1);
        self.text[line_start..line_end]
            .char_indices()
            .nth(column)
            .map_or(line_end, |(offset, _)| line_start + offset)
    }

    pub fn span_for(&self, loc: &SourceLocation) -> Span {
        let start = self.offset_for(loc.start.line, loc.start.column);
        let end = self.offset_for(loc.end.line, loc.end.column);
        Span::new(start, end.max(start))
    }

    /// Line/column of a byte offset.
    pub fn position_for(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let line_index = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let line_start = self.line_starts[line_index];
        let column = self.text[line_start..]
            .char_indices()
            .take_while(|(index, _)| line_start + index < offset)
            .count();
        Position::new(line_index + 1, column)
    }

    pub fn slice(&self, span: Span) -> &str {
        self.text.get(span.start..span.end).unwrap_or("")
    }
}
