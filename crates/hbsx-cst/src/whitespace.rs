//! Whitespace control: `~` markers and standalone lines.
//!
//! A `~` next to a mustache delimiter trims all whitespace on that side up to
//! the neighbouring mustache. A block tag, `{{else}}`, comment or partial that
//! sits alone on its line (a "standalone" tag) removes the whole line.
//!
//! The passes run while the parser assembles each body, innermost first, so
//! nested bodies are final before the statements around them are examined.

use crate::cst::{Program, Statement, StripFlags};

/// Which body of a block a standalone open or close tag borders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Side {
    #[default]
    Program,
    Inverse,
}

/// Whitespace facts about one statement, as seen by its parent body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct StripInfo {
    pub open: bool,
    pub close: bool,
    pub open_standalone: bool,
    pub close_standalone: bool,
    pub inline_standalone: bool,
    pub leading: Side,
    pub trailing: Side,
}

impl StripInfo {
    pub fn mustache(strip: StripFlags) -> Self {
        Self {
            open: strip.open,
            close: strip.close,
            ..Self::default()
        }
    }

    /// Comments and partials: standalone when alone on their line.
    pub fn inline(strip: StripFlags) -> Self {
        Self {
            inline_standalone: true,
            ..Self::mustache(strip)
        }
    }
}

/// Apply `~` markers and standalone rules to one body.
pub(crate) fn strip_body(
    body: &mut [Statement],
    strips: &[Option<StripInfo>],
    is_root: bool,
    ignore_standalone: bool,
) {
    for (i, strip) in strips.iter().enumerate() {
        let Some(strip) = *strip else {
            continue;
        };

        let prev_whitespace = is_prev_whitespace(body, Some(i), is_root);
        let next_whitespace = is_next_whitespace(body, Some(i), is_root);

        let open_standalone = strip.open_standalone && prev_whitespace;
        let close_standalone = strip.close_standalone && next_whitespace;
        let inline_standalone = strip.inline_standalone && prev_whitespace && next_whitespace;

        if strip.close {
            omit_right(body, Some(i), true);
        }
        if strip.open {
            omit_left(body, Some(i), true);
        }

        if ignore_standalone {
            continue;
        }

        if inline_standalone {
            omit_right(body, Some(i), false);
            if omit_left(body, Some(i), false) {
                // A standalone partial keeps the indentation it replaced.
                let indent = match &body[i - 1] {
                    Statement::Content(content) => trailing_indent(&content.original).to_string(),
                    _ => String::new(),
                };
                if let Statement::Partial(partial) = &mut body[i] {
                    partial.indent = indent;
                }
            }
        }
        if open_standalone {
            if let Some(inner) = block_body_mut(&mut body[i], strip.leading) {
                omit_right(inner, None, false);
            }
            omit_left(body, Some(i), false);
        }
        if close_standalone {
            omit_right(body, Some(i), false);
            if let Some(inner) = block_body_mut(&mut body[i], strip.trailing) {
                omit_left(inner, None, false);
            }
        }
    }
}

/// Trim inside a block's own bodies and report how its tags look from outside.
///
/// `program` is `None` for an inverse section (`{{^x}}`) without `{{else}}`.
pub(crate) fn strip_block(
    program: Option<&mut Program>,
    inverse: Option<&mut Program>,
    open_strip: StripFlags,
    inverse_strip: StripFlags,
    close_strip: StripFlags,
    ignore_standalone: bool,
) -> StripInfo {
    let leading = if program.is_some() { Side::Program } else { Side::Inverse };
    let trailing = if inverse.is_some() { Side::Inverse } else { Side::Program };

    let (program, inverse) = match (program, inverse) {
        (Some(program), inverse) => (program, inverse),
        (None, Some(inverse)) => (inverse, None),
        (None, None) => return StripInfo::default(),
    };

    let close_standalone = match inverse.as_deref() {
        Some(inverse) => is_prev_whitespace(&first_inverse(inverse).body, None, false),
        None => is_prev_whitespace(&program.body, None, false),
    };
    let info = StripInfo {
        open: open_strip.open,
        close: close_strip.close,
        open_standalone: is_next_whitespace(&program.body, None, false),
        close_standalone,
        inline_standalone: false,
        leading,
        trailing,
    };

    if open_strip.close {
        omit_right(&mut program.body, None, true);
    }

    match inverse {
        Some(inverse) => {
            if inverse_strip.open {
                omit_left(&mut program.body, None, true);
            }
            if inverse_strip.close {
                with_first_inverse(inverse, |body| omit_right(body, None, true));
            }
            if close_strip.open {
                with_last_inverse(inverse, |body| omit_left(body, None, true));
            }

            // `{{else}}` alone on its line
            if !ignore_standalone
                && is_prev_whitespace(&program.body, None, false)
                && is_next_whitespace(&first_inverse(inverse).body, None, false)
            {
                omit_left(&mut program.body, None, false);
                with_first_inverse(inverse, |body| omit_right(body, None, false));
            }
        }
        None => {
            if close_strip.open {
                omit_left(&mut program.body, None, true);
            }
        }
    }

    info
}

fn block_body_mut(statement: &mut Statement, side: Side) -> Option<&mut Vec<Statement>> {
    match statement {
        Statement::Block(block) | Statement::DecoratorBlock(block) => match side {
            Side::Program => Some(&mut block.program.body),
            Side::Inverse => block.inverse.as_mut().map(|inverse| &mut inverse.body),
        },
        Statement::PartialBlock(block) => Some(&mut block.program.body),
        _ => None,
    }
}

/// The `{{else if}}` block wrapped by a chained program.
fn chained_block(program: &Program) -> Option<&crate::cst::BlockStatement> {
    match program.body.first() {
        Some(Statement::Block(block)) if program.chained => Some(block),
        _ => None,
    }
}

fn chained_block_mut(program: &mut Program) -> Option<&mut crate::cst::BlockStatement> {
    if !program.chained {
        return None;
    }
    match program.body.first_mut() {
        Some(Statement::Block(block)) => Some(block),
        _ => None,
    }
}

/// The body right after `{{else}}` / `{{else if ...}}`.
fn first_inverse(inverse: &Program) -> &Program {
    match chained_block(inverse) {
        Some(block) => &block.program,
        None => inverse,
    }
}

fn with_first_inverse<R>(inverse: &mut Program, f: impl FnOnce(&mut Vec<Statement>) -> R) -> R {
    match chained_block_mut(inverse) {
        Some(block) => f(&mut block.program.body),
        None => f(&mut inverse.body),
    }
}

/// The body right before the closing `{{/x}}`, following `{{else if}}` chains.
fn with_last_inverse<R>(inverse: &mut Program, f: impl FnOnce(&mut Vec<Statement>) -> R) -> R {
    match chained_block_mut(inverse) {
        Some(block) => match block.inverse.as_mut() {
            Some(next) => with_last_inverse(next, f),
            None => f(&mut block.program.body),
        },
        None => f(&mut inverse.body),
    }
}

fn leading_whitespace(text: &str) -> &str {
    &text[..text.len() - text.trim_start().len()]
}

fn trailing_whitespace(text: &str) -> &str {
    &text[text.trim_end().len()..]
}

fn trailing_indent(text: &str) -> &str {
    &text[text.trim_end_matches([' ', '\t']).len()..]
}

/// Whether the statement before `i` (or the end of `body`) ends a line.
fn is_prev_whitespace(body: &[Statement], i: Option<usize>, is_root: bool) -> bool {
    let i = i.unwrap_or(body.len());
    let Some(prev) = i.checked_sub(1).and_then(|j| body.get(j)) else {
        return is_root;
    };
    let has_sibling = i.checked_sub(2).and_then(|j| body.get(j)).is_some();

    let Statement::Content(prev) = prev else {
        return false;
    };
    let ends_line = trailing_whitespace(&prev.original).contains('\n');
    if has_sibling || !is_root {
        ends_line
    } else {
        ends_line || prev.original.trim_end().is_empty()
    }
}

/// Whether the statement after `i` (or the start of `body`) begins a new line.
fn is_next_whitespace(body: &[Statement], i: Option<usize>, is_root: bool) -> bool {
    let next_index = i.map_or(0, |i| i + 1);
    let Some(next) = body.get(next_index) else {
        return is_root;
    };
    let has_sibling = body.get(next_index + 1).is_some();

    let Statement::Content(next) = next else {
        return false;
    };
    let starts_line = leading_whitespace(&next.original).contains('\n');
    if has_sibling || !is_root {
        starts_line
    } else {
        starts_line || next.original.trim_start().is_empty()
    }
}

/// Trim the start of the content after `i` (or the first statement).
fn omit_right(body: &mut [Statement], i: Option<usize>, multiple: bool) {
    let index = i.map_or(0, |i| i + 1);
    let Some(Statement::Content(current)) = body.get_mut(index) else {
        return;
    };
    if !multiple && current.right_stripped {
        return;
    }

    let original = std::mem::take(&mut current.value);
    current.value = if multiple {
        original.trim_start().to_string()
    } else {
        let rest = original.trim_start_matches([' ', '\t']);
        let rest = rest.strip_prefix('\r').unwrap_or(rest);
        rest.strip_prefix('\n').unwrap_or(rest).to_string()
    };
    current.right_stripped = current.value != original;
}

/// Trim the end of the content before `i` (or the last statement).
fn omit_left(body: &mut [Statement], i: Option<usize>, multiple: bool) -> bool {
    let index = match i {
        Some(i) => i.checked_sub(1),
        None => body.len().checked_sub(1),
    };
    let Some(Statement::Content(current)) = index.and_then(|index| body.get_mut(index)) else {
        return false;
    };
    if !multiple && current.left_stripped {
        return false;
    }

    let original = std::mem::take(&mut current.value);
    current.value = if multiple {
        original.trim_end().to_string()
    } else {
        original.trim_end_matches([' ', '\t']).to_string()
    };
    current.left_stripped = current.value != original;
    current.left_stripped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::{ContentStatement, Position, SourceLocation};
    use pretty_assertions::assert_eq;

    fn content(text: &str) -> Statement {
        let loc = SourceLocation::new(Position::new(1, 0), Position::new(1, 0));
        Statement::Content(ContentStatement {
            value: text.to_string(),
            original: text.to_string(),
            left_stripped: false,
            right_stripped: false,
            loc,
        })
    }

    fn value(statement: &Statement) -> &str {
        match statement {
            Statement::Content(content) => &content.value,
            other => panic!("expected content, got {other:?}"),
        }
    }

    // ====================================================================
    // Line detection
    // ====================================================================

    #[test]
    fn test_prev_whitespace() {
        let body = vec![content("a\n  ")];
        assert!(is_prev_whitespace(&body, None, false));
        let body = vec![content("a  ")];
        assert!(!is_prev_whitespace(&body, None, false));
        assert!(is_prev_whitespace(&[], None, true));
        assert!(!is_prev_whitespace(&[], None, false));
    }

    #[test]
    fn test_root_start_counts_as_line_start() {
        let body = vec![content("  ")];
        assert!(is_prev_whitespace(&body, None, true));
        assert!(!is_prev_whitespace(&body, None, false));
    }

    #[test]
    fn test_next_whitespace() {
        let body = vec![content("  \nb")];
        assert!(is_next_whitespace(&body, None, false));
        let body = vec![content("  b\n")];
        assert!(!is_next_whitespace(&body, None, false));
    }

    // ====================================================================
    // Trimming
    // ====================================================================

    #[test]
    fn test_omit_right_single_line() {
        let mut body = vec![content("  \n  next")];
        omit_right(&mut body, None, false);
        assert_eq!(value(&body[0]), "  next");
    }

    #[test]
    fn test_omit_right_multiple() {
        let mut body = vec![content(" \n\t next")];
        omit_right(&mut body, None, true);
        assert_eq!(value(&body[0]), "next");
    }

    #[test]
    fn test_omit_left() {
        let mut body = vec![content("text\n  ")];
        assert!(omit_left(&mut body, None, false));
        assert_eq!(value(&body[0]), "text\n");
        // Already stripped once: a second single-line pass is a no-op.
        assert!(!omit_left(&mut body, None, false));
        assert!(omit_left(&mut body, None, true));
        assert_eq!(value(&body[0]), "text");
    }

    #[test]
    fn test_trailing_indent() {
        assert_eq!(trailing_indent("a\n \t "), " \t ");
        assert_eq!(trailing_indent("a"), "");
    }
}
