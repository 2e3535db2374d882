//! Where stripped content text starts relative to the text as written.

/// Line and column distance from the start of a content statement's
/// original text to the start of its stripped value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StrippedOffsets {
    pub lines: usize,
    /// Characters from the start of the last line crossed. When `lines` is
    /// zero this is relative to the start of the original text instead.
    pub columns: usize,
}

/// Compute how far whitespace control moved the start of `value` within
/// `original`.
///
/// `value` is `original` with leading and trailing whitespace possibly
/// removed. An empty value has skipped every newline of the original.
pub fn right_stripped_offsets(original: &str, value: &str) -> StrippedOffsets {
    if value.is_empty() {
        return StrippedOffsets {
            lines: original.matches('\n').count(),
            columns: 0,
        };
    }

    let prefix = &original[..original.find(value).unwrap_or(0)];
    let lines = prefix.matches('\n').count();
    let last_line = prefix.rsplit('\n').next().unwrap_or(prefix);
    StrippedOffsets {
        lines,
        columns: last_line.chars().count(),
    }
}
