use std::fmt;
use std::ops::Range;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)] // Default for convenience
pub struct Span {
    pub start: usize, // Byte offset
    pub end: usize,   // Byte offset (exclusive)
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    // Smallest span covering both (e.g. an operator and its operands)
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn offset(self, by: usize) -> Span {
        Span::new(self.start + by, self.end + by)
    }

    pub fn to_range(self) -> Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

/// Input text with every whitespace character removed.
///
/// Lexing runs on the stripped text, so token spans are offsets into it.
/// `original_span` maps such a span back onto the text the caller passed in,
/// which is what diagnostics need to point at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    text: String,
    // original byte offset of every byte kept in `text`
    offsets: Vec<usize>,
    original_len: usize,
}

impl Normalized {
    pub fn new(input: &str) -> Self {
        let mut text = String::with_capacity(input.len());
        let mut offsets = Vec::with_capacity(input.len());
        for (at, c) in input.char_indices().filter(|(_, c)| !c.is_whitespace()) {
            text.push(c);
            offsets.extend(at..at + c.len_utf8());
        }
        Normalized {
            text,
            offsets,
            original_len: input.len(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn original_offset(&self, at: usize) -> usize {
        self.offsets.get(at).copied().unwrap_or(self.original_len)
    }

    pub fn original_span(&self, span: Span) -> Span {
        let start = self.original_offset(span.start);
        let end = match span.end.checked_sub(1).and_then(|last| self.offsets.get(last)) {
            Some(&last) if span.end > span.start => last + 1,
            _ => start,
        };
        Span::new(start, end.max(start))
    }
}
