//! Byte-offset spans into the template source.

/// A half-open byte range `start..end` into the template text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} is past its end {end}");
        Self { start, end }
    }

    /// A zero-width span at `offset`.
    pub fn empty(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn collapse_to_start(self) -> Self {
        Self::empty(self.start)
    }

    pub fn collapse_to_end(self) -> Self {
        Self::empty(self.end)
    }

    /// The smallest span covering both `self` and `other`.
    pub fn merge(self, other: Span) -> Self {
        Self::new(self.start.min(other.start), self.end.max(other.end))
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `other` lies entirely inside `self`.
    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collapse() {
        let span = Span::new(3, 9);
        assert_eq!(span.collapse_to_start(), Span::new(3, 3));
        assert_eq!(span.collapse_to_end(), Span::new(9, 9));
        assert!(span.collapse_to_end().is_empty());
    }

    #[test]
    fn test_merge_is_order_independent() {
        let a = Span::new(2, 5);
        let b = Span::new(8, 12);
        assert_eq!(a.merge(b), Span::new(2, 12));
        assert_eq!(b.merge(a), Span::new(2, 12));
    }

    #[test]
    fn test_contains() {
        let outer = Span::new(0, 10);
        assert!(outer.contains(Span::new(0, 10)));
        assert!(outer.contains(Span::empty(10)));
        assert!(!outer.contains(Span::new(5, 11)));
        assert_eq!(outer.len(), 10);
    }
}
