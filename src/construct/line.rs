use std::ops::RangeInclusive;

use crate::common::span::Span;

/// One normalized, comment-free line of Block source.
/// A logical line usually maps to one physical line,
/// but a multi-line string literal folds several physical
/// lines into one.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalLine {
    /// Line contents, leading whitespace preserved.
    pub text: String,
    /// First and last physical line, one-based.
    pub lines: RangeInclusive<usize>,
    /// Leading indentation width, in columns.
    pub indent: usize,
    /// The physical lines this line was folded from.
    pub span: Span,
}

impl LogicalLine {
    pub fn is_blank(&self) -> bool { self.text.trim().is_empty() }

    /// The line contents after the leading indentation.
    pub fn content(&self) -> &str { self.text.trim_start_matches([' ', '\t']) }

    /// The leading whitespace, verbatim.
    pub fn leading(&self) -> &str { &self.text[..self.text.len() - self.content().len()] }

    pub fn first_line(&self) -> usize { *self.lines.start() }

    pub fn is_folded(&self) -> bool { self.lines.start() != self.lines.end() }

    /// Points at `len` bytes starting at byte `col` of this
    /// line's text. Folded lines no longer match their
    /// source text byte-for-byte, so there the whole line
    /// is returned instead.
    pub fn locate(&self, col: usize, len: usize) -> Span {
        if self.is_folded() || col + len > self.span.len() {
            self.span.clone()
        } else {
            Span::new(self.span.source(), self.span.offset() + col, len)
        }
    }
}

/// Measures the width of leading whitespace in columns,
/// a tab counting `tab_width` columns.
pub fn indent_width(leading: &str, tab_width: usize) -> usize {
    leading
        .chars()
        .map(|c| if c == '\t' { tab_width } else { 1 })
        .sum()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::source::Source;

    fn line(text: &str) -> LogicalLine {
        let source = Source::source(text);
        LogicalLine {
            text: text.to_string(),
            lines: 1..=1,
            indent: indent_width(&text[..text.len() - text.trim_start().len()], 4),
            span: Span::whole(&source),
        }
    }

    #[test]
    fn leading_and_content() {
        let l = line("    x = 1");
        assert_eq!(l.leading(), "    ");
        assert_eq!(l.content(), "x = 1");
        assert_eq!(l.indent, 4);
        assert!(!l.is_blank());
    }

    #[test]
    fn tabs_count_as_tab_width() {
        assert_eq!(indent_width("\t\t", 4), 8);
        assert_eq!(indent_width("\t", 2), 2);
        assert_eq!(indent_width("", 4), 0);
    }

    #[test]
    fn locate_inside_line() {
        let l = line("x = [1, 2");
        let span = l.locate(4, 1);
        assert_eq!(span.contents(), "[");
        // out of range falls back to the whole line
        assert_eq!(l.locate(20, 1), l.span);
    }
}
